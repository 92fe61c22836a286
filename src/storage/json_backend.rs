use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

use crate::{
    config::manager::tmp_path,
    domain::{Account, AccountBook},
    errors::StorageError,
};

use super::{Result, StorageBackend};

const BOOK_EXTENSION: &str = "json";

/// Stores each account book as a pretty-printed JSON file under one directory.
#[derive(Debug, Clone)]
pub struct JsonAccountStorage {
    books_dir: PathBuf,
}

impl JsonAccountStorage {
    pub fn new(books_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&books_dir)?;
        Ok(Self { books_dir })
    }

    pub fn book_path(&self, name: &str) -> PathBuf {
        self.books_dir
            .join(format!("{}.{}", canonical_name(name), BOOK_EXTENSION))
    }
}

impl StorageBackend for JsonAccountStorage {
    fn save(&self, book: &AccountBook, name: &str) -> Result<()> {
        save_book_to_path(book, &self.book_path(name))
    }

    fn load(&self, name: &str) -> Result<AccountBook> {
        let path = self.book_path(name);
        if !path.exists() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        load_book_from_path(&path)
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.books_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BOOK_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

pub fn save_book_to_path(book: &AccountBook, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(book)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_book_from_path(path: &Path) -> Result<AccountBook> {
    let data = fs::read_to_string(path)?;
    let book: AccountBook = serde_json::from_str(&data)?;
    Ok(book)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AccountsFile {
    Book(AccountBook),
    Rows(Vec<Account>),
}

/// Reads accounts from either a saved book or a bare JSON array of rows.
pub fn load_accounts_from_path(path: &Path) -> Result<Vec<Account>> {
    let data = fs::read_to_string(path)?;
    let accounts = match serde_json::from_str(&data)? {
        AccountsFile::Book(book) => book.accounts,
        AccountsFile::Rows(rows) => rows,
    };
    debug!(path = %path.display(), accounts = accounts.len(), "accounts loaded");
    Ok(accounts)
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "accounts".into()
    } else {
        sanitized
    }
}
