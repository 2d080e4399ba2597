//! Group table operations
//!
//! Groups are never managed directly: a row exists exactly as long as at
//! least one song references it.

use sqlx::SqliteConnection;
use tracing::debug;

use super::fold_case;

/// Group table operations
pub struct GroupTable;

impl GroupTable {
    /// Return the id of the group called `name`, inserting it when absent.
    ///
    /// A single upsert statement, so two concurrent creators of the same name
    /// both get the one row the unique constraint allows.
    pub async fn ensure(conn: &mut SqliteConnection, name: &str) -> Result<i64, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO groups (name, name_fold) VALUES (?, ?)
            ON CONFLICT (name) DO UPDATE SET name = excluded.name
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(fold_case(name))
        .fetch_one(&mut *conn)
        .await?;

        debug!(group = name, group_id = id, "Resolved group");
        Ok(id)
    }

    /// Delete the group when no song references it any more.
    /// Returns whether the row was removed.
    pub async fn release_if_orphaned(
        conn: &mut SqliteConnection,
        group_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM groups WHERE id = ? AND NOT EXISTS (SELECT 1 FROM songs WHERE group_id = ?)",
        )
        .bind(group_id)
        .bind(group_id)
        .execute(&mut *conn)
        .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            debug!(group_id, "Removed orphaned group");
        }
        Ok(removed)
    }

    /// Check whether a group with this exact name exists
    #[cfg(test)]
    pub async fn exists(conn: &mut SqliteConnection, name: &str) -> Result<bool, sqlx::Error> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM groups WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{run_migrations, DbEngine};

    async fn setup() -> DbEngine {
        let engine = DbEngine::in_memory().await.unwrap();
        run_migrations(engine.pool()).await.unwrap();
        engine
    }

    #[tokio::test]
    async fn test_ensure_is_stable() {
        let engine = setup().await;
        let mut conn = engine.pool().acquire().await.unwrap();

        let first = GroupTable::ensure(&mut conn, "Muse").await.unwrap();
        let second = GroupTable::ensure(&mut conn, "Muse").await.unwrap();
        let other = GroupTable::ensure(&mut conn, "Queen").await.unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert!(GroupTable::exists(&mut conn, "Muse").await.unwrap());
        assert!(!GroupTable::exists(&mut conn, "muse").await.unwrap());
    }

    #[tokio::test]
    async fn test_release_only_when_orphaned() {
        let engine = setup().await;
        let mut conn = engine.pool().acquire().await.unwrap();

        let group_id = GroupTable::ensure(&mut conn, "Muse").await.unwrap();
        sqlx::query("INSERT INTO songs (name, group_id) VALUES ('Uprising', ?)")
            .bind(group_id)
            .execute(&mut *conn)
            .await
            .unwrap();

        assert!(!GroupTable::release_if_orphaned(&mut conn, group_id).await.unwrap());
        assert!(GroupTable::exists(&mut conn, "Muse").await.unwrap());

        sqlx::query("DELETE FROM songs")
            .execute(&mut *conn)
            .await
            .unwrap();

        assert!(GroupTable::release_if_orphaned(&mut conn, group_id).await.unwrap());
        assert!(!GroupTable::exists(&mut conn, "Muse").await.unwrap());
    }
}
