#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Storage-level guarantees of the SeaORM repository: one record per scope,
//! every value type surviving a write and read back, and the path type table.

mod support;

use scoped_settings::domain::error::DomainError;
use scoped_settings::domain::record::SettingRecord;
use scoped_settings::domain::repo::SettingRepository;
use scoped_settings::infra::storage::SeaOrmSettingRepository;
use scoped_settings_sdk::{ScopeKey, SettingScope, SettingValue, StorageType};
use serde_json::json;
use time::OffsetDateTime;
use time::macros::{date, datetime};

fn key(path: &str) -> ScopeKey {
    ScopeKey::new("acme", "storefront", path)
}

fn text_record(scope: SettingScope, text: &str) -> SettingRecord {
    SettingRecord::new(key("banner"), scope, text.into(), OffsetDateTime::now_utc()).unwrap()
}

#[tokio::test]
async fn test_insert_assigns_id_and_reads_back() {
    let repo = SeaOrmSettingRepository::new(support::inmem_db().await);

    let saved = repo
        .save(text_record(SettingScope::channel("web"), "Hello web"))
        .await
        .unwrap();
    assert!(saved.id().is_some());

    let found = repo
        .find_one(&key("banner"), &SettingScope::channel("web"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id(), saved.id());
    assert_eq!(found.value().unwrap(), SettingValue::from("Hello web"));

    assert!(
        repo.find_one(&key("banner"), &SettingScope::global())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_duplicate_global_scope_is_rejected() {
    let repo = SeaOrmSettingRepository::new(support::inmem_db().await);

    repo.save(text_record(SettingScope::global(), "first"))
        .await
        .unwrap();
    let err = repo
        .save(text_record(SettingScope::global(), "second"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateScope { .. }));

    let records = repo.find_by_scope_prefix(&key("banner")).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_duplicate_partial_scopes_are_rejected() {
    let repo = SeaOrmSettingRepository::new(support::inmem_db().await);

    for scope in [
        SettingScope::channel("web"),
        SettingScope::locale("fr_FR"),
        SettingScope::channel_locale("web", "fr_FR"),
    ] {
        repo.save(text_record(scope.clone(), "first")).await.unwrap();
        let err = repo.save(text_record(scope, "second")).await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateScope { .. }));
    }

    let records = repo.find_by_scope_prefix(&key("banner")).await.unwrap();
    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn test_concurrent_inserts_for_one_scope() {
    let repo = SeaOrmSettingRepository::new(support::inmem_db().await);
    let scope = SettingScope::channel_locale("web", "fr_FR");

    let (a, b) = tokio::join!(
        repo.save(text_record(scope.clone(), "a")),
        repo.save(text_record(scope.clone(), "b")),
    );

    let outcomes = [a, b];
    let ok = outcomes.iter().filter(|r| r.is_ok()).count();
    let duplicates = outcomes
        .iter()
        .filter(|r| matches!(r, Err(DomainError::DuplicateScope { .. })))
        .count();
    assert_eq!((ok, duplicates), (1, 1));

    let records = repo.find_by_scope_prefix(&key("banner")).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_first_save_establishes_path_type() {
    let repo = SeaOrmSettingRepository::new(support::inmem_db().await);
    let now = OffsetDateTime::now_utc();

    repo.save(text_record(SettingScope::channel("web"), "hello"))
        .await
        .unwrap();
    assert_eq!(
        repo.find_path_type(&key("banner")).await.unwrap(),
        Some(StorageType::Text)
    );

    let err = repo
        .save(SettingRecord::new(key("banner"), SettingScope::channel("mobile"), 5.into(), now).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::TypeMismatch { expected: StorageType::Text, .. }
    ));

    let records = repo.find_by_scope_prefix(&key("banner")).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].storage_type(), StorageType::Text);
}

#[tokio::test]
async fn test_same_scope_under_other_path_is_independent() {
    let repo = SeaOrmSettingRepository::new(support::inmem_db().await);
    let now = OffsetDateTime::now_utc();

    repo.save(text_record(SettingScope::global(), "Welcome"))
        .await
        .unwrap();
    repo.save(SettingRecord::new(key("page_size"), SettingScope::global(), 20.into(), now).unwrap())
        .await
        .unwrap();

    assert_eq!(repo.find_by_scope_prefix(&key("banner")).await.unwrap().len(), 1);
    assert_eq!(repo.find_by_scope_prefix(&key("page_size")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_replaces_value_and_clears_old_slot() {
    let repo = SeaOrmSettingRepository::new(support::inmem_db().await);

    let mut record = repo
        .save(text_record(SettingScope::global(), "Welcome"))
        .await
        .unwrap();
    repo.declare_path_type(&key("banner"), StorageType::Json)
        .await
        .unwrap();
    record
        .assign(
            StorageType::Json,
            json!({"title": "Welcome"}).into(),
            OffsetDateTime::now_utc(),
        )
        .unwrap();
    let updated = repo.save(record).await.unwrap();

    let found = repo
        .find_one(&key("banner"), &SettingScope::global())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id(), updated.id());
    assert_eq!(found.storage_type(), StorageType::Json);
    assert_eq!(found.slots().text, None);
    assert_eq!(found.value().unwrap(), SettingValue::Json(json!({"title": "Welcome"})));
}

#[tokio::test]
async fn test_every_storage_type_survives_persistence() {
    let repo = SeaOrmSettingRepository::new(support::inmem_db().await);
    let now = OffsetDateTime::now_utc();

    let values = [
        ("banner", SettingValue::from("Welcome")),
        ("enabled", SettingValue::Boolean(true)),
        ("page_size", SettingValue::Integer(-20)),
        ("ratio", SettingValue::Float(0.75)),
        ("opens_at", SettingValue::DateTime(datetime!(2024-03-01 12:30:45 UTC))),
        ("launch", SettingValue::Date(date!(2024 - 06 - 01))),
        ("menu", SettingValue::Json(json!({"items": ["home", {"sale": true}]}))),
    ];

    for (path, value) in &values {
        repo.save(SettingRecord::new(key(path), SettingScope::global(), value.clone(), now).unwrap())
            .await
            .unwrap();
    }

    for (path, value) in values {
        let found = repo
            .find_one(&key(path), &SettingScope::global())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.value().unwrap(), value, "path {path}");
        assert_eq!(found.slots().occupied().len(), 1, "path {path}");
    }
}

#[tokio::test]
async fn test_delete_removes_only_that_scope() {
    let repo = SeaOrmSettingRepository::new(support::inmem_db().await);

    repo.save(text_record(SettingScope::global(), "Welcome"))
        .await
        .unwrap();
    let web = repo
        .save(text_record(SettingScope::channel("web"), "Hello web"))
        .await
        .unwrap();

    assert!(repo.delete(&web).await.unwrap());
    assert!(!repo.delete(&web).await.unwrap());

    let records = repo.find_by_scope_prefix(&key("banner")).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].scope().is_global());
}

#[tokio::test]
async fn test_path_type_declaration_is_upserted() {
    let repo = SeaOrmSettingRepository::new(support::inmem_db().await);

    assert_eq!(repo.find_path_type(&key("ratio")).await.unwrap(), None);

    repo.declare_path_type(&key("ratio"), StorageType::Integer)
        .await
        .unwrap();
    repo.declare_path_type(&key("ratio"), StorageType::Float)
        .await
        .unwrap();

    assert_eq!(
        repo.find_path_type(&key("ratio")).await.unwrap(),
        Some(StorageType::Float)
    );
    assert_eq!(repo.find_path_type(&key("banner")).await.unwrap(), None);
}
