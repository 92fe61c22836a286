pub mod json_backend;

use std::path::Path;

use crate::{domain::AccountBook, errors::StorageError};

pub type Result<T> = std::result::Result<T, StorageError>;

/// Abstraction over persistence backends capable of storing account books.
pub trait StorageBackend: Send + Sync {
    fn save(&self, book: &AccountBook, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<AccountBook>;
    fn list(&self) -> Result<Vec<String>>;

    fn save_to_path(&self, book: &AccountBook, path: &Path) -> Result<()> {
        json_backend::save_book_to_path(book, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<AccountBook> {
        json_backend::load_book_from_path(path)
    }
}

pub use json_backend::{load_accounts_from_path, JsonAccountStorage};
