use async_trait::async_trait;
use scoped_settings_sdk::{ScopeKey, SettingScope, StorageType};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use time::OffsetDateTime;

use super::entity::{path_type, setting};
use super::mapper;
use crate::domain::error::DomainError;
use crate::domain::record::SettingRecord;
use crate::domain::repo::SettingRepository;

/// ORM-based implementation of the `SettingRepository` trait.
#[derive(Clone)]
pub struct SeaOrmSettingRepository {
    db: DatabaseConnection,
}

impl SeaOrmSettingRepository {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[must_use]
    pub const fn conn(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn db_err(e: DbErr) -> DomainError {
    DomainError::Storage(e.into())
}

fn key_condition(key: &ScopeKey) -> Condition {
    Condition::all()
        .add(setting::Column::Vendor.eq(key.vendor.as_str()))
        .add(setting::Column::Plugin.eq(key.plugin.as_str()))
        .add(setting::Column::Path.eq(key.path.as_str()))
}

fn scope_condition(scope: &SettingScope) -> Condition {
    let channel = match scope.channel.as_deref() {
        Some(code) => setting::Column::ChannelCode.eq(code),
        None => setting::Column::ChannelCode.is_null(),
    };
    let locale = match scope.locale.as_deref() {
        Some(code) => setting::Column::LocaleCode.eq(code),
        None => setting::Column::LocaleCode.is_null(),
    };
    Condition::all().add(channel).add(locale)
}

fn path_type_model(key: &ScopeKey, storage_type: StorageType) -> path_type::ActiveModel {
    path_type::ActiveModel {
        vendor: Set(key.vendor.clone()),
        plugin: Set(key.plugin.clone()),
        path: Set(key.path.clone()),
        storage_type: Set(storage_type.as_str().to_owned()),
        updated_at: Set(OffsetDateTime::now_utc()),
    }
}

fn path_type_conflict() -> OnConflict {
    OnConflict::columns([
        path_type::Column::Vendor,
        path_type::Column::Plugin,
        path_type::Column::Path,
    ])
}

async fn read_path_type<C: ConnectionTrait>(
    conn: &C,
    key: &ScopeKey,
) -> Result<Option<StorageType>, DomainError> {
    let row = path_type::Entity::find_by_id((
        key.vendor.clone(),
        key.plugin.clone(),
        key.path.clone(),
    ))
    .one(conn)
    .await
    .map_err(db_err)?;

    match row {
        Some(m) => mapper::parse_storage_type(None, &m.storage_type),
        None => Ok(None),
    }
}

/// Claim `storage_type` for the path unless another writer already did, then return
/// whatever type is stored now.
async fn establish_path_type<C: ConnectionTrait>(
    conn: &C,
    key: &ScopeKey,
    storage_type: StorageType,
) -> Result<Option<StorageType>, DomainError> {
    path_type::Entity::insert(path_type_model(key, storage_type))
        .on_conflict(path_type_conflict().do_nothing().to_owned())
        .exec_without_returning(conn)
        .await
        .map_err(db_err)?;

    read_path_type(conn, key).await
}

#[async_trait]
impl SettingRepository for SeaOrmSettingRepository {
    async fn find_by_scope_prefix(
        &self,
        key: &ScopeKey,
    ) -> Result<Vec<SettingRecord>, DomainError> {
        let rows = setting::Entity::find()
            .filter(key_condition(key))
            .order_by_asc(setting::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(SettingRecord::try_from).collect()
    }

    async fn find_one(
        &self,
        key: &ScopeKey,
        scope: &SettingScope,
    ) -> Result<Option<SettingRecord>, DomainError> {
        let row = setting::Entity::find()
            .filter(key_condition(key))
            .filter(scope_condition(scope))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        row.map(SettingRecord::try_from).transpose()
    }

    async fn save(&self, record: SettingRecord) -> Result<SettingRecord, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let established = establish_path_type(&txn, record.key(), record.storage_type()).await?;
        if let Some(expected) = established
            && expected != record.storage_type()
        {
            // dropping `txn` rolls it back
            return Err(DomainError::type_mismatch(
                &record.key().path,
                expected,
                record.storage_type().as_str(),
            ));
        }

        let am = mapper::to_active_model(&record);
        let result = if record.id().is_some() {
            am.update(&txn).await
        } else {
            am.insert(&txn).await
        };

        let model = result.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                DomainError::duplicate_scope(record.key(), record.scope())
            }
            _ => db_err(e),
        })?;
        txn.commit().await.map_err(db_err)?;

        SettingRecord::try_from(model)
    }

    async fn delete(&self, record: &SettingRecord) -> Result<bool, DomainError> {
        let Some(id) = record.id() else {
            return Ok(false);
        };

        let result = setting::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected > 0)
    }

    async fn find_path_type(&self, key: &ScopeKey) -> Result<Option<StorageType>, DomainError> {
        read_path_type(&self.db, key).await
    }

    async fn declare_path_type(
        &self,
        key: &ScopeKey,
        storage_type: StorageType,
    ) -> Result<(), DomainError> {
        path_type::Entity::insert(path_type_model(key, storage_type))
            .on_conflict(
                path_type_conflict()
                    .update_columns([path_type::Column::StorageType, path_type::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}
