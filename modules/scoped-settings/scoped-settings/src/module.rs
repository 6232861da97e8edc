use std::sync::Arc;

use scoped_settings_sdk::ScopedSettingsApi;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::ScopedSettingsConfig;
use crate::domain::registry::AliasRegistry;
use crate::domain::repo::SettingRepository;
use crate::domain::seed::SeedLoader;
use crate::domain::service::{ScopedSettingsService, ServiceConfig};
use crate::infra::storage::SeaOrmSettingRepository;
use crate::infra::storage::migrations::Migrator;
use crate::local_client::LocalClient;

/// Wires configuration, storage, the alias registry and seeds into a ready service.
pub struct ScopedSettingsModule {
    service: ScopedSettingsService,
    client: Arc<dyn ScopedSettingsApi>,
}

impl ScopedSettingsModule {
    /// Run migrations, build the alias registry, and apply configured seeds.
    ///
    /// # Errors
    /// Fails on migration errors, invalid alias configuration, or the first seed
    /// that cannot be stored.
    pub async fn init(config: &ScopedSettingsConfig, db: DatabaseConnection) -> anyhow::Result<Self> {
        info!("Initializing scoped settings module");

        Self::migrate(&db).await?;

        let registry = Arc::new(AliasRegistry::from_config(&config.aliases)?);
        info!(aliases = registry.len(), "Settings aliases registered");

        let repo: Arc<dyn SettingRepository> = Arc::new(SeaOrmSettingRepository::new(db));
        let service = ScopedSettingsService::new(registry, repo, ServiceConfig::from(config));

        if !config.seeds.is_empty() {
            SeedLoader::new(service.clone())
                .load_all(&config.seeds)
                .await?;
        }

        let client: Arc<dyn ScopedSettingsApi> = Arc::new(LocalClient::new(service.clone()));

        info!("Scoped settings module initialized");
        Ok(Self { service, client })
    }

    /// # Errors
    /// Propagates migration failures.
    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running scoped settings database migrations");
        Migrator::up(db, None).await?;
        info!("Scoped settings database migrations completed successfully");
        Ok(())
    }

    #[must_use]
    pub const fn service(&self) -> &ScopedSettingsService {
        &self.service
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn ScopedSettingsApi> {
        self.client.clone()
    }
}
