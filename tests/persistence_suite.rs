use std::fs;

use budget_accounts::{
    config::{Config, ConfigManager},
    core::services::AccountService,
    storage::{load_accounts_from_path, JsonAccountStorage, StorageBackend},
    Account, AccountBook, AccountKind, Currency, StorageError,
};
use tempfile::tempdir;

fn sample_book() -> AccountBook {
    let mut book = AccountBook::new("Family");
    let banks = Account::new("Banks", AccountKind::Payment, Currency::Usd).with_balance(20.0);
    let banks_id = banks.id.clone();
    AccountService::add(&mut book, banks).expect("add root");
    AccountService::add(
        &mut book,
        Account::new("Vietcombank", AccountKind::Saving, Currency::Vnd)
            .with_parent(banks_id)
            .with_balance(1_500_000.0),
    )
    .expect("add child");
    book
}

#[test]
fn book_round_trips_through_storage() {
    let temp = tempdir().unwrap();
    let store = JsonAccountStorage::new(temp.path().join("books")).unwrap();
    let book = sample_book();

    store.save(&book, "Family").expect("save book");
    let loaded = store.load("Family").expect("load book");

    assert_eq!(loaded, book);
    assert_eq!(store.list().unwrap(), vec!["family".to_string()]);
    assert!(!store.book_path("Family").with_extension("json.tmp").exists());
}

#[test]
fn loading_unknown_book_is_not_found() {
    let temp = tempdir().unwrap();
    let store = JsonAccountStorage::new(temp.path().to_path_buf()).unwrap();
    assert!(matches!(store.load("nope"), Err(StorageError::NotFound(_))));
}

#[test]
fn accounts_load_from_book_or_bare_rows() {
    let temp = tempdir().unwrap();
    let book_path = temp.path().join("book.json");
    let store = JsonAccountStorage::new(temp.path().to_path_buf()).unwrap();
    store.save_to_path(&sample_book(), &book_path).unwrap();
    assert_eq!(load_accounts_from_path(&book_path).unwrap().len(), 2);

    let rows_path = temp.path().join("rows.json");
    fs::write(
        &rows_path,
        r#"[
            {"id": "a", "name": "Cash", "type": "Payment", "currency": "USD", "balance": 5},
            {"id": "b", "parentId": "a", "name": "Loan", "type": "Debt", "currency": "VND", "balance": -10}
        ]"#,
    )
    .unwrap();
    let rows = load_accounts_from_path(&rows_path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].parent_id.as_deref(), Some("a"));
    assert_eq!(rows[1].kind, AccountKind::Debt);
}

#[test]
fn malformed_rows_are_a_serde_error() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("bad.json");
    fs::write(&path, r#"[{"id": "a", "name": "Cash", "type": "Gold"}]"#).unwrap();
    assert!(matches!(load_accounts_from_path(&path), Err(StorageError::Serde(_))));
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();

    assert_eq!(manager.load().unwrap(), Config::default());

    let mut cfg = Config::default();
    cfg.display_currency = Currency::Vnd;
    cfg.derive_inverse_rates = true;
    manager.save(&cfg).expect("save config");

    let loaded = manager.load().expect("load config");
    assert_eq!(loaded.display_currency, Currency::Vnd);
    assert!(loaded.derive_inverse_rates);
    assert!(manager.config_path().ends_with("config/config.json"));
}

#[test]
fn config_with_invalid_rate_fails_to_load() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"rates": [{"from": "VND", "to": "USD", "rate": 0}]}"#,
    )
    .unwrap();
    assert!(ConfigManager::new(path).load().is_err());
}
