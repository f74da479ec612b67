//! Tests for database initialization
//!
//! - Database file and parent directory are created on first run
//! - Re-opening an existing database keeps its data
//! - Schema creation is idempotent

use lsync_common::db::{create_schema, get_song_by_id, init_database, save_song};
use lsync_common::Song;
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("lsync.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_reopen_keeps_songs() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("lsync.db");

    let song = Song::new("Persisted", "one\ntwo");
    {
        let pool = init_database(&db_path).await.unwrap();
        save_song(&pool, &song).await.unwrap();
        pool.close().await;
    }

    let pool = init_database(&db_path).await.unwrap();
    let loaded = get_song_by_id(&pool, &song.id).await.unwrap();
    assert_eq!(loaded.map(|s| s.title), Some("Persisted".to_string()));
}

#[tokio::test]
async fn test_schema_creation_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("lsync.db");

    let pool = init_database(&db_path).await.unwrap();
    assert!(create_schema(&pool).await.is_ok());
    assert!(create_schema(&pool).await.is_ok());

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(tables, vec!["songs".to_string()]);
}
