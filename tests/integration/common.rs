//! Shared fixtures for integration tests.

use scout_query::config::ClientConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates an analytics store with two stores and a month of transactions.
///
/// Trailing-month data: store `s1` has 100.0 (yesterday) and 50.0 (two days
/// ago); store `s2` has 30.0 (yesterday). One 999.0 transaction is 90 days
/// old and falls outside every trailing window.
pub async fn seeded_store() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analytics.db");

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    for statement in [
        "CREATE TABLE stores (id TEXT PRIMARY KEY, name TEXT, location TEXT, region TEXT)",
        "CREATE TABLE transactions (id TEXT PRIMARY KEY, storeId TEXT, amount REAL, timestamp TEXT)",
        "INSERT INTO stores VALUES
            ('s1', 'Sample Store', 'Makati', 'NCR'),
            ('s2', 'Another Store', 'Cebu City', 'Visayas')",
        "INSERT INTO transactions VALUES
            ('t1', 's1', 100.0, datetime('now', '-1 day')),
            ('t2', 's1', 50.0, datetime('now', '-2 days')),
            ('t3', 's2', 30.0, datetime('now', '-1 day')),
            ('t4', 's2', 999.0, datetime('now', '-90 days'))",
    ] {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }

    pool.close().await;
    (dir, path)
}

/// Config pointing at a local store and a remote endpoint, with fast retries.
pub fn test_config(local_store_path: &Path, remote_endpoint: &str) -> ClientConfig {
    ClientConfig {
        local_store_path: local_store_path.to_path_buf(),
        remote_endpoint: remote_endpoint.to_string(),
        timeout_ms: 2_000,
        max_retries: 3,
        retry_base_delay_ms: 1,
        api_key: Some("test-token".to_string()),
    }
}
