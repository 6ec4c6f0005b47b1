//! Integration tests for the SQLite-backed registry and audit log.
//!
//! Run with: cargo test --package wiegate-storage --test integration_store

use std::sync::Arc;
use wiegate_core::constants::{KEY_COUNT, MAX_LOGS, NS_USERS};
use wiegate_storage::{
    AnyStore, AuditLog, DatabaseConfig, MemoryStore, MeshSettings, NetworkSettings,
    PersistenceAdapter, SqliteStore, StorageError, UserRegistry, WifiCredentials,
};

#[tokio::test]
async fn test_in_memory_database() {
    let store = SqliteStore::in_memory().await.unwrap();
    store.health_check().await.unwrap();
    store.close().await;
}

#[tokio::test]
async fn test_migration_idempotency() {
    let store = SqliteStore::in_memory().await.unwrap();

    store.migrate().await.unwrap();
    store.migrate().await.unwrap();

    let result: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='kv_store'")
            .fetch_one(store.pool())
            .await
            .unwrap();

    assert_eq!(result.0, 1);
}

#[tokio::test]
async fn test_registry_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("wiegate.db");
    let config = DatabaseConfig::new(path.to_string_lossy().to_string());

    {
        let store = Arc::new(AnyStore::from(SqliteStore::new(config.clone()).await.unwrap()));
        let mut registry = UserRegistry::load(Arc::clone(&store)).await.unwrap();
        registry.add("B4", "Alice").await.unwrap();
        registry.add("808000C0", "Bob").await.unwrap();
        registry.add("0A", "Carol").await.unwrap();
        registry.remove("B4").await.unwrap();

        let mut log = AuditLog::load(Arc::clone(&store)).await.unwrap();
        log.append("808000C0", "2025-08-25 12:00:00").await.unwrap();

        if let AnyStore::Sqlite(sqlite) = store.as_ref() {
            sqlite.close().await;
        }
    }

    let store = Arc::new(AnyStore::from(SqliteStore::new(config).await.unwrap()));
    let registry = UserRegistry::load(Arc::clone(&store)).await.unwrap();
    let uids: Vec<_> = registry.list().into_iter().map(|u| u.uid).collect();
    assert_eq!(uids, ["0A", "808000C0"]);
    assert_eq!(store.get_u32(NS_USERS, KEY_COUNT).await.unwrap(), Some(2));

    let log = AuditLog::load(store).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log.list()[0].timestamp, "2025-08-25 12:00:00");
}

#[tokio::test]
async fn test_log_eviction_survives_reload() {
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());
    let mut log = AuditLog::new(Arc::clone(&store));

    for i in 0..MAX_LOGS + 1 {
        log.append(&format!("{i:02X}"), &format!("t{i:03}"))
            .await
            .unwrap();
    }

    let reloaded = AuditLog::load(store).await.unwrap();
    let entries = reloaded.list();
    assert_eq!(entries.len(), MAX_LOGS);
    assert_eq!(entries[0].timestamp, "t001");
    assert_eq!(entries[MAX_LOGS - 1].timestamp, format!("t{MAX_LOGS:03}"));
}

#[tokio::test]
async fn test_memory_and_sqlite_agree() {
    async fn exercise<S: PersistenceAdapter>(store: Arc<S>) -> Vec<String> {
        let mut registry = UserRegistry::new(Arc::clone(&store));
        registry.add("A1", "a").await.unwrap();
        registry.add("B2", "b").await.unwrap();
        registry.add("C3", "c").await.unwrap();
        registry.remove("A1").await.unwrap();
        assert!(matches!(
            registry.add("B2", "again").await,
            Err(StorageError::DuplicateUid { .. })
        ));

        UserRegistry::load(store)
            .await
            .unwrap()
            .list()
            .into_iter()
            .map(|u| u.uid)
            .collect()
    }

    let memory = exercise(Arc::new(MemoryStore::new())).await;
    let sqlite = exercise(Arc::new(SqliteStore::in_memory().await.unwrap())).await;
    assert_eq!(memory, sqlite);
    assert_eq!(memory, ["C3", "B2"]);
}

#[tokio::test]
async fn test_network_settings_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.db");
    let config = DatabaseConfig::new(path.to_string_lossy().to_string());

    {
        let store = SqliteStore::new(config.clone()).await.unwrap();
        assert_eq!(
            NetworkSettings::load(&store).await.unwrap(),
            NetworkSettings::default()
        );

        let wifi = WifiCredentials::new("gatehouse", "s3cret").unwrap();
        NetworkSettings::save_wifi(&store, &wifi).await.unwrap();
        NetworkSettings::save_mesh(&store, &MeshSettings::new(25, 0xBEEF).unwrap())
            .await
            .unwrap();
        store.close().await;
    }

    let store = SqliteStore::new(config).await.unwrap();
    let loaded = NetworkSettings::load(&store).await.unwrap();
    assert_eq!(loaded.wifi.unwrap().ssid, "gatehouse");
    assert_eq!(loaded.mesh, MeshSettings::new(25, 0xBEEF).unwrap());
}
