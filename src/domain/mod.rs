pub mod account;
pub mod book;
pub mod common;

pub use account::{validate_account_type, Account, AccountKind};
pub use book::AccountBook;
pub use common::Displayable;
