#[cfg(test)]
mod tests {
    use super::super::error::DomainError;
    use super::super::record::SettingRecord;
    use super::super::registry::AliasRegistry;
    use super::super::repo::SettingRepository;
    use super::super::seed::{SeedLoader, SeedSetting};
    use super::super::service::{ScopedSettingsService, ServiceConfig, Settings};
    use crate::config::UndefinedPolicy;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use scoped_settings_sdk::{
        PrecedenceTier, ScopeKey, SettingScope, SettingValue, StorageType,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use time::OffsetDateTime;
    use time::macros::date;
    use tracing_test::traced_test;

    // In-memory repository enforcing one record per (key, channel, locale)
    #[derive(Default)]
    struct MockRepository {
        records: Mutex<Vec<SettingRecord>>,
        path_types: Mutex<HashMap<ScopeKey, StorageType>>,
        next_id: Mutex<i64>,
    }

    impl MockRepository {
        /// Insert without the uniqueness check, as a broken store would.
        fn insert_unchecked(&self, record: SettingRecord) {
            let id = self.allocate_id();
            self.records.lock().push(record.with_id(id));
        }

        fn allocate_id(&self) -> i64 {
            let mut next = self.next_id.lock();
            *next += 1;
            *next
        }

        fn count(&self, key: &ScopeKey) -> usize {
            self.records.lock().iter().filter(|r| r.key() == key).count()
        }
    }

    #[async_trait]
    impl SettingRepository for MockRepository {
        async fn find_by_scope_prefix(
            &self,
            key: &ScopeKey,
        ) -> Result<Vec<SettingRecord>, DomainError> {
            Ok(self
                .records
                .lock()
                .iter()
                .filter(|r| r.key() == key)
                .cloned()
                .collect())
        }

        async fn find_one(
            &self,
            key: &ScopeKey,
            scope: &SettingScope,
        ) -> Result<Option<SettingRecord>, DomainError> {
            Ok(self
                .records
                .lock()
                .iter()
                .find(|r| r.key() == key && r.scope() == scope)
                .cloned())
        }

        async fn save(&self, record: SettingRecord) -> Result<SettingRecord, DomainError> {
            let taken = self.records.lock().iter().any(|r| {
                r.key() == record.key() && r.scope() == record.scope() && r.id() != record.id()
            });
            if taken {
                return Err(DomainError::duplicate_scope(record.key(), record.scope()));
            }

            let established = *self
                .path_types
                .lock()
                .entry(record.key().clone())
                .or_insert(record.storage_type());
            if established != record.storage_type() {
                return Err(DomainError::type_mismatch(
                    &record.key().path,
                    established,
                    record.storage_type().as_str(),
                ));
            }

            let saved = match record.id() {
                Some(_) => record,
                None => record.with_id(self.allocate_id()),
            };
            let mut records = self.records.lock();
            records.retain(|r| r.id() != saved.id());
            records.push(saved.clone());
            Ok(saved)
        }

        async fn delete(&self, record: &SettingRecord) -> Result<bool, DomainError> {
            let mut records = self.records.lock();
            let before = records.len();
            records.retain(|r| r.id() != record.id());
            Ok(records.len() < before)
        }

        async fn find_path_type(
            &self,
            key: &ScopeKey,
        ) -> Result<Option<StorageType>, DomainError> {
            Ok(self.path_types.lock().get(key).copied())
        }

        async fn declare_path_type(
            &self,
            key: &ScopeKey,
            storage_type: StorageType,
        ) -> Result<(), DomainError> {
            self.path_types.lock().insert(key.clone(), storage_type);
            Ok(())
        }
    }

    fn registry() -> Arc<AliasRegistry> {
        Arc::new(
            AliasRegistry::builder()
                .register(
                    "storefront",
                    "acme",
                    "storefront",
                    ["banner", "page_size", "ratio", "launch", "menu"],
                )
                .unwrap()
                .build(),
        )
    }

    fn service_with(
        repo: Arc<MockRepository>,
        policy: UndefinedPolicy,
    ) -> ScopedSettingsService {
        let config = ServiceConfig {
            undefined_policy: policy,
            ..ServiceConfig::default()
        };
        ScopedSettingsService::new(registry(), repo, config)
    }

    fn storefront(repo: &Arc<MockRepository>) -> Settings {
        service_with(repo.clone(), UndefinedPolicy::ZeroValue)
            .settings("storefront")
            .unwrap()
    }

    fn web_fr() -> SettingScope {
        SettingScope::channel_locale("web", "fr_FR")
    }

    #[tokio::test]
    async fn test_default_applies_to_every_scope() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);

        settings
            .set("banner", "Welcome".into(), &SettingScope::global())
            .await
            .unwrap();

        let value = settings.get_text("banner", &web_fr()).await.unwrap();
        assert_eq!(value, "Welcome");

        let resolved = settings.resolve("banner", &web_fr()).await.unwrap().unwrap();
        assert_eq!(resolved.tier, PrecedenceTier::Default);
    }

    #[tokio::test]
    async fn test_overrides_follow_precedence() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);

        settings
            .set("banner", "Welcome".into(), &SettingScope::global())
            .await
            .unwrap();
        settings
            .set("banner", "Bienvenue".into(), &SettingScope::locale("fr_FR"))
            .await
            .unwrap();
        settings
            .set("banner", "Hello web".into(), &SettingScope::channel("web"))
            .await
            .unwrap();

        // channel outranks locale
        assert_eq!(
            settings.get_text("banner", &web_fr()).await.unwrap(),
            "Hello web"
        );
        assert_eq!(
            settings
                .get_text("banner", &SettingScope::channel_locale("app", "fr_FR"))
                .await
                .unwrap(),
            "Bienvenue"
        );

        settings
            .set("banner", "Salut web".into(), &web_fr())
            .await
            .unwrap();
        assert_eq!(
            settings.get_text("banner", &web_fr()).await.unwrap(),
            "Salut web"
        );
        assert_eq!(
            settings
                .get_text("banner", &SettingScope::channel_locale("web", "en_US"))
                .await
                .unwrap(),
            "Hello web"
        );
    }

    #[tokio::test]
    async fn test_write_updates_record_in_place() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);
        let scope = SettingScope::channel("web");

        let first = settings.set("page_size", 20.into(), &scope).await.unwrap();
        let second = settings.set("page_size", 40.into(), &scope).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.value, SettingValue::Integer(40));
        assert_eq!(repo.count(&settings.key("page_size")), 1);
    }

    #[tokio::test]
    async fn test_first_write_establishes_type() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);

        settings
            .set("page_size", 20.into(), &SettingScope::global())
            .await
            .unwrap();
        assert_eq!(
            settings.storage_type("page_size").await.unwrap(),
            Some(StorageType::Integer)
        );

        let err = settings
            .set("page_size", "twenty".into(), &SettingScope::channel("web"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::TypeMismatch { expected: StorageType::Integer, .. }
        ));

        // a float is not an integer either
        let err = settings
            .set("page_size", 20.0.into(), &SettingScope::global())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::TypeMismatch { .. }));

        assert_eq!(repo.count(&settings.key("page_size")), 1);
        assert_eq!(
            settings
                .get_integer("page_size", &SettingScope::global())
                .await
                .unwrap(),
            20
        );
    }

    #[tokio::test]
    async fn test_type_survives_override_removal() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);
        let scope = SettingScope::locale("fr_FR");

        settings.set("ratio", 0.5.into(), &scope).await.unwrap();
        assert!(settings.remove_override("ratio", &scope).await.unwrap());
        assert_eq!(repo.count(&settings.key("ratio")), 0);

        let err = settings
            .set("ratio", "half".into(), &SettingScope::global())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::TypeMismatch { .. }));
    }

    #[tokio::test]
    async fn test_unset_path_yields_zero_value_of_established_type() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);

        settings
            .set("banner", "Hello web".into(), &SettingScope::channel("web"))
            .await
            .unwrap();

        let value = settings.get("banner", &SettingScope::channel("app")).await.unwrap();
        assert_eq!(value, SettingValue::Text(String::new()));
    }

    #[tokio::test]
    async fn test_never_written_path_is_undefined() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);

        let err = settings.get("banner", &web_fr()).await.unwrap_err();
        assert!(matches!(err, DomainError::SettingUndefined { .. }));
        assert!(settings.resolve("banner", &web_fr()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_require_policy_never_invents_values() {
        let repo = Arc::new(MockRepository::default());
        let settings = service_with(repo.clone(), UndefinedPolicy::Require)
            .settings("storefront")
            .unwrap();

        settings
            .set("banner", "Hello web".into(), &SettingScope::channel("web"))
            .await
            .unwrap();

        let err = settings
            .get("banner", &SettingScope::channel("app"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::SettingUndefined { .. }));
    }

    #[tokio::test]
    async fn test_get_or_returns_caller_default() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);

        let value = settings
            .get_or("page_size", &web_fr(), SettingValue::Integer(25))
            .await
            .unwrap();
        assert_eq!(value, SettingValue::Integer(25));

        settings
            .set("page_size", 10.into(), &SettingScope::global())
            .await
            .unwrap();
        let value = settings
            .get_or("page_size", &web_fr(), SettingValue::Integer(25))
            .await
            .unwrap();
        assert_eq!(value, SettingValue::Integer(10));
    }

    #[tokio::test]
    async fn test_typed_getter_rejects_other_type() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);

        settings
            .set("page_size", 10.into(), &SettingScope::global())
            .await
            .unwrap();

        let err = settings
            .get_bool("page_size", &SettingScope::global())
            .await
            .unwrap_err();
        match err {
            DomainError::TypeMismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, StorageType::Boolean);
                assert_eq!(actual, "integer");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_date_and_json_values() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);

        settings
            .set("launch", date!(2024 - 06 - 01).into(), &SettingScope::global())
            .await
            .unwrap();
        settings
            .set("menu", json!({"items": ["home", "sale"]}).into(), &SettingScope::global())
            .await
            .unwrap();

        assert_eq!(
            settings.get_date("launch", &web_fr()).await.unwrap(),
            date!(2024 - 06 - 01)
        );
        assert_eq!(
            settings.get_json("menu", &web_fr()).await.unwrap(),
            json!({"items": ["home", "sale"]})
        );
    }

    #[tokio::test]
    async fn test_json_null_is_rejected() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);

        let err = settings
            .set("menu", json!(null).into(), &SettingScope::global())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedValueType { .. }));
        assert_eq!(settings.storage_type("menu").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_lists_resolved_paths() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);

        settings
            .set("banner", "Welcome".into(), &SettingScope::global())
            .await
            .unwrap();
        settings
            .set("page_size", 50.into(), &SettingScope::channel("web"))
            .await
            .unwrap();

        let values = settings.values(&web_fr()).await.unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["banner"], SettingValue::from("Welcome"));
        assert_eq!(values["page_size"], SettingValue::Integer(50));

        let values = settings.values(&SettingScope::global()).await.unwrap();
        assert_eq!(values.len(), 1);
    }

    #[tokio::test]
    async fn test_declare_storage_type_fixes_type_before_writes() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);

        settings
            .declare_storage_type("ratio", StorageType::Float)
            .await
            .unwrap();
        assert_eq!(
            settings.storage_type("ratio").await.unwrap(),
            Some(StorageType::Float)
        );

        let err = settings
            .set("ratio", 1.into(), &SettingScope::global())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::TypeMismatch { .. }));
        settings
            .set("ratio", 1.5.into(), &SettingScope::global())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_declare_storage_type_cannot_retype_stored_path() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);

        settings
            .set("banner", "Welcome".into(), &SettingScope::global())
            .await
            .unwrap();
        let err = settings
            .declare_storage_type("banner", StorageType::Json)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::TypeMismatch { .. }));

        settings
            .declare_storage_type("banner", StorageType::Text)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remove_override_rules() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);

        settings
            .set("banner", "Welcome".into(), &SettingScope::global())
            .await
            .unwrap();
        settings
            .set("banner", "Hello web".into(), &SettingScope::channel("web"))
            .await
            .unwrap();

        let err = settings
            .remove_override("banner", &SettingScope::global())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        assert!(
            !settings
                .remove_override("banner", &SettingScope::locale("fr_FR"))
                .await
                .unwrap()
        );
        assert!(
            settings
                .remove_override("banner", &SettingScope::channel("web"))
                .await
                .unwrap()
        );

        let resolved = settings.resolve("banner", &web_fr()).await.unwrap().unwrap();
        assert_eq!(resolved.tier, PrecedenceTier::Default);
        assert_eq!(resolved.value, SettingValue::from("Welcome"));
    }

    #[tokio::test]
    async fn test_move_override() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);
        let from = SettingScope::channel("web");
        let to = web_fr();

        settings.set("banner", "Hello".into(), &from).await.unwrap();
        let moved = settings.move_override("banner", &from, &to).await.unwrap();
        assert_eq!(moved.scope, to);

        let resolved = settings.resolve("banner", &to).await.unwrap().unwrap();
        assert_eq!(resolved.tier, PrecedenceTier::ChannelLocale);
        assert!(
            settings
                .resolve("banner", &SettingScope::channel_locale("web", "en_US"))
                .await
                .unwrap()
                .is_none()
        );

        let err = settings
            .move_override("banner", &from, &to)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::SettingUndefined { .. }));

        settings.set("banner", "Other".into(), &from).await.unwrap();
        let err = settings
            .move_override("banner", &from, &to)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateScope { .. }));
    }

    #[tokio::test]
    async fn test_default_cannot_be_moved() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);

        settings
            .set("page_size", 20.into(), &SettingScope::global())
            .await
            .unwrap();
        let err = settings
            .move_override("page_size", &SettingScope::global(), &SettingScope::channel("web"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let resolved = settings
            .resolve("page_size", &SettingScope::global())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.tier, PrecedenceTier::Default);
        assert_eq!(resolved.value, SettingValue::Integer(20));
        let web = settings
            .resolve("page_size", &SettingScope::channel("web"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(web.tier, PrecedenceTier::Default);
    }

    #[tokio::test]
    async fn test_locale_length_is_capped_at_column_width() {
        let repo = Arc::new(MockRepository::default());
        let config = ServiceConfig {
            max_locale_length: 8,
            ..ServiceConfig::default()
        };
        let settings = ScopedSettingsService::new(registry(), repo.clone(), config)
            .settings("storefront")
            .unwrap();

        let err = settings
            .set("banner", "x".into(), &SettingScope::locale("fr_FR_x"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(repo.count(&settings.key("banner")), 0);

        settings
            .set("banner", "x".into(), &SettingScope::locale("fr_FR"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_scope_validation() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);

        let err = settings
            .set("banner", "x".into(), &SettingScope::locale("fr_FR_x"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let err = settings
            .set("banner", "x".into(), &SettingScope::channel(""))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let err = settings
            .get("", &SettingScope::global())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_unknown_alias() {
        let repo = Arc::new(MockRepository::default());
        let service = service_with(repo, UndefinedPolicy::ZeroValue);

        let err = service.settings("backoffice").err().unwrap();
        assert!(matches!(err, DomainError::UnknownAlias { .. }));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_duplicate_scope_in_store_is_an_integrity_error() {
        let repo = Arc::new(MockRepository::default());
        let settings = storefront(&repo);
        let key = settings.key("banner");
        let now = OffsetDateTime::now_utc();

        for text in ["first", "second"] {
            let record = SettingRecord::new(
                key.clone(),
                SettingScope::channel("web"),
                text.into(),
                now,
            )
            .unwrap();
            repo.insert_unchecked(record);
        }

        let err = settings.get("banner", &web_fr()).await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateScope { .. }));
        assert!(err.is_integrity());
        assert!(logs_contain("duplicate scope among stored settings"));
    }

    #[tokio::test]
    async fn test_seed_loader_coerces_values() {
        let repo = Arc::new(MockRepository::default());
        let service = service_with(repo.clone(), UndefinedPolicy::ZeroValue);
        let loader = SeedLoader::new(service.clone());

        let seeds: Vec<SeedSetting> = serde_json::from_value(json!([
            {"alias": "storefront", "path": "banner", "value": "Welcome"},
            {"alias": "storefront", "path": "page_size", "type": "integer", "value": "20"},
            {"alias": "storefront", "path": "page_size", "type": "integer",
             "channel": "web", "locale": "fr_FR", "value": 30.0},
            {"alias": "storefront", "path": "launch", "type": "date", "value": "2024-06-01"},
        ]))
        .unwrap();

        let stored = loader.load_all(&seeds).await.unwrap();
        assert_eq!(stored.len(), 4);

        let settings = service.settings("storefront").unwrap();
        assert_eq!(
            settings.get_text("banner", &web_fr()).await.unwrap(),
            "Welcome"
        );
        assert_eq!(settings.get_integer("page_size", &web_fr()).await.unwrap(), 30);
        assert_eq!(
            settings
                .get_integer("page_size", &SettingScope::channel("web"))
                .await
                .unwrap(),
            20
        );
        assert_eq!(
            settings
                .get_date("launch", &SettingScope::global())
                .await
                .unwrap(),
            date!(2024 - 06 - 01)
        );
    }

    #[tokio::test]
    async fn test_seed_loader_rejects_unknown_type_before_touching_store() {
        let repo = Arc::new(MockRepository::default());
        let loader = SeedLoader::new(service_with(repo.clone(), UndefinedPolicy::ZeroValue));

        let seed: SeedSetting = serde_json::from_value(json!({
            "alias": "unknown", "path": "banner", "type": "blob", "value": "x"
        }))
        .unwrap();

        let err = loader.load(&seed).await.unwrap_err();
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, "type"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(repo.records.lock().is_empty());
    }

    #[tokio::test]
    async fn test_seed_loader_reports_uncoercible_value() {
        let repo = Arc::new(MockRepository::default());
        let loader = SeedLoader::new(service_with(repo.clone(), UndefinedPolicy::ZeroValue));

        let seed: SeedSetting = serde_json::from_value(json!({
            "alias": "storefront", "path": "page_size", "type": "integer", "value": "many"
        }))
        .unwrap();

        let err = loader.load(&seed).await.unwrap_err();
        assert!(matches!(err, DomainError::TypeMismatch { .. }));
    }
}
