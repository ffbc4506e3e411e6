use crate::error::PersistenceError;
use crate::persistence::SlotStore;
use async_trait::async_trait;
use chrono::Utc;
use log::info;
use sqlx::{migrate::MigrateDatabase, sqlite::{SqlitePool, SqlitePoolOptions}, Row, Sqlite};

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self, PersistenceError> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating database at {}", db_url);
            Sqlite::create_database(db_url).await?;
        }

        // Connect to the database
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await?;

        // Initialize schema
        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    // One row per slot, the value is the serialized collection
    async fn init_schema(pool: &SqlitePool) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SlotStore for Database {
    async fn read_slot(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let row = sqlx::query(
            r#"
            SELECT value
            FROM slots
            WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    async fn write_slot(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO slots (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;
    use crate::models::{seed_groups, Group, Record};
    use crate::persistence::{load_groups, save_groups};

    async fn temp_database(dir: &tempfile::TempDir) -> Database {
        let url = format!("sqlite://{}", dir.path().join("slots.db").display());
        Database::new(&url).await.unwrap()
    }

    #[tokio::test]
    async fn empty_database_has_no_slot() {
        let dir = tempfile::tempdir().unwrap();
        let db = temp_database(&dir).await;
        assert_eq!(db.read_slot("progress-analytics-data").await.unwrap(), None);
        assert_eq!(
            load_groups(&db, "progress-analytics-data", Locale::Chinese).await,
            seed_groups(Locale::Chinese)
        );
    }

    #[tokio::test]
    async fn last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let db = temp_database(&dir).await;
        db.write_slot("k", "[]").await.unwrap();
        db.write_slot("k", "[1]").await.unwrap();
        assert_eq!(db.read_slot("k").await.unwrap().as_deref(), Some("[1]"));
    }

    #[tokio::test]
    async fn collection_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let groups = vec![Group::new("kept", vec![Record::ranked("a", 5.0, 4.0)])];
        {
            let db = temp_database(&dir).await;
            save_groups(&db, "scope", &groups).await.unwrap();
        }

        let db = temp_database(&dir).await;
        let loaded = load_groups(&db, "scope", Locale::English).await;
        assert_eq!(loaded[0].name, "kept");
        assert_eq!(loaded[0].records[0].old_rank, Some(5.0));
    }
}
