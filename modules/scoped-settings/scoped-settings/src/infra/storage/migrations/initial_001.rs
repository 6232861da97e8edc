use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let conn = manager.get_connection();

        // Unique scope: a missing channel/locale must collide with another missing one,
        // which a plain unique index over nullable columns does not do.
        let sql = match backend {
            sea_orm::DatabaseBackend::Postgres => {
                r#"
CREATE TABLE IF NOT EXISTS scoped_settings_setting (
    id BIGSERIAL PRIMARY KEY NOT NULL,
    vendor VARCHAR(255) NOT NULL,
    plugin VARCHAR(255) NOT NULL,
    path VARCHAR(255) NOT NULL,
    channel_code VARCHAR(255) NULL,
    locale_code VARCHAR(5) NULL,
    storage_type VARCHAR(10) NOT NULL,
    text_value TEXT NULL,
    boolean_value BOOLEAN NULL,
    integer_value BIGINT NULL,
    float_value DOUBLE PRECISION NULL,
    datetime_value TIMESTAMPTZ NULL,
    date_value DATE NULL,
    json_value JSONB NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS uniq_scoped_settings_scope ON scoped_settings_setting (
    vendor, plugin, path, COALESCE(channel_code, ''), COALESCE(locale_code, '')
);
                "#
            }
            sea_orm::DatabaseBackend::MySql => {
                r#"
CREATE TABLE IF NOT EXISTS scoped_settings_setting (
    id BIGINT AUTO_INCREMENT PRIMARY KEY NOT NULL,
    vendor VARCHAR(64) NOT NULL,
    plugin VARCHAR(64) NOT NULL,
    path VARCHAR(191) NOT NULL,
    channel_code VARCHAR(64) NULL,
    locale_code VARCHAR(5) NULL,
    storage_type VARCHAR(10) NOT NULL,
    text_value TEXT NULL,
    boolean_value BOOLEAN NULL,
    integer_value BIGINT NULL,
    float_value DOUBLE NULL,
    datetime_value TIMESTAMP NULL,
    date_value DATE NULL,
    json_value JSON NULL,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL,
    channel_key VARCHAR(64) AS (COALESCE(channel_code, '')) STORED,
    locale_key VARCHAR(5) AS (COALESCE(locale_code, '')) STORED,
    UNIQUE KEY uniq_scoped_settings_scope (vendor, plugin, path, channel_key, locale_key)
);
                "#
            }
            sea_orm::DatabaseBackend::Sqlite => {
                r#"
CREATE TABLE IF NOT EXISTS scoped_settings_setting (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    vendor TEXT NOT NULL,
    plugin TEXT NOT NULL,
    path TEXT NOT NULL,
    channel_code TEXT NULL,
    locale_code VARCHAR(5) NULL,
    storage_type VARCHAR(10) NOT NULL,
    text_value TEXT NULL,
    boolean_value BOOLEAN NULL,
    integer_value BIGINT NULL,
    float_value REAL NULL,
    datetime_value TEXT NULL,
    date_value TEXT NULL,
    json_value TEXT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS uniq_scoped_settings_scope ON scoped_settings_setting (
    vendor, plugin, path, COALESCE(channel_code, ''), COALESCE(locale_code, '')
);
                "#
            }
        };

        conn.execute_unprepared(sql).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared("DROP TABLE IF EXISTS scoped_settings_setting;")
            .await?;
        Ok(())
    }
}
