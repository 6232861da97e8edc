#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Test support utilities for `scoped-settings` integration tests.
//!
//! Provides an in-memory SQLite database with migrations applied and a service
//! wired over it.

#![allow(dead_code)] // Support module provides utilities that may not all be used

use std::sync::Arc;

use scoped_settings::domain::registry::AliasRegistry;
use scoped_settings::domain::repo::SettingRepository;
use scoped_settings::domain::service::{ScopedSettingsService, ServiceConfig};
use scoped_settings::infra::storage::SeaOrmSettingRepository;
use scoped_settings::infra::storage::migrations::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

pub const ALIAS: &str = "storefront";

/// Fresh in-memory database with the module schema.
pub async fn inmem_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

#[must_use]
pub fn registry() -> Arc<AliasRegistry> {
    Arc::new(
        AliasRegistry::builder()
            .register(
                ALIAS,
                "acme",
                "storefront",
                ["banner", "page_size", "ratio", "opens_at", "launch", "menu", "enabled"],
            )
            .unwrap()
            .build(),
    )
}

/// Service over a SeaORM repository on `db`, with the default config.
#[must_use]
pub fn service(db: DatabaseConnection) -> ScopedSettingsService {
    let repo: Arc<dyn SettingRepository> = Arc::new(SeaOrmSettingRepository::new(db));
    ScopedSettingsService::new(registry(), repo, ServiceConfig::default())
}
