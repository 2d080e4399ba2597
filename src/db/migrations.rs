//! Database migrations

use anyhow::{Context, Result};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::tables::fold_case;

/// Current migration version
const CURRENT_VERSION: i64 = 3;

/// Bring the schema up to `CURRENT_VERSION`
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    migrate_to(pool, CURRENT_VERSION).await
}

async fn migrate_to(pool: &SqlitePool, target: i64) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dbmigration (
            id INTEGER PRIMARY KEY,
            version INTEGER NOT NULL DEFAULT 0
        );
        INSERT OR IGNORE INTO dbmigration (id, version) VALUES (1, 0);
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create migration table")?;

    let current_version: i64 =
        sqlx::query_scalar("SELECT version FROM dbmigration WHERE id = 1")
            .fetch_one(pool)
            .await?;

    if current_version >= target {
        info!("Database is up to date (version {})", current_version);
        return Ok(());
    }

    info!(
        "Running migrations from version {} to {}",
        current_version, target
    );

    for version in (current_version + 1)..=target {
        let mut tx = pool.begin().await?;

        run_migration(&mut *tx, version)
            .await
            .with_context(|| format!("Migration {} failed", version))?;

        sqlx::query("UPDATE dbmigration SET version = ? WHERE id = 1")
            .bind(version)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Applied migration {}", version);
    }

    debug!("Schema at version {}", target);
    Ok(())
}

async fn execute_all(conn: &mut SqliteConnection, statements: &[&str]) -> Result<()> {
    for statement in statements {
        sqlx::query(*statement).execute(&mut *conn).await?;
    }
    Ok(())
}

async fn run_migration(conn: &mut SqliteConnection, version: i64) -> Result<()> {
    match version {
        1 => {
            execute_all(
                conn,
                &[
                    r#"
                    CREATE TABLE IF NOT EXISTS groups (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        name TEXT NOT NULL UNIQUE
                    )
                    "#,
                    r#"
                    CREATE TABLE IF NOT EXISTS songs (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        name TEXT NOT NULL,
                        group_id INTEGER NOT NULL REFERENCES groups(id),
                        release_date TEXT NOT NULL DEFAULT '',
                        text TEXT NOT NULL DEFAULT '',
                        link TEXT NOT NULL DEFAULT ''
                    )
                    "#,
                ],
            )
            .await
        }
        2 => {
            execute_all(
                conn,
                &["CREATE INDEX IF NOT EXISTS idx_songs_group_id ON songs(group_id)"],
            )
            .await
        }
        3 => {
            // lowercase shadow columns for case-insensitive filtering
            execute_all(
                conn,
                &[
                    "ALTER TABLE groups ADD COLUMN name_fold TEXT NOT NULL DEFAULT ''",
                    "ALTER TABLE songs ADD COLUMN name_fold TEXT NOT NULL DEFAULT ''",
                    "ALTER TABLE songs ADD COLUMN release_date_fold TEXT NOT NULL DEFAULT ''",
                    "ALTER TABLE songs ADD COLUMN text_fold TEXT NOT NULL DEFAULT ''",
                    "ALTER TABLE songs ADD COLUMN link_fold TEXT NOT NULL DEFAULT ''",
                ],
            )
            .await?;
            backfill_folds(conn).await
        }
        _ => Ok(()),
    }
}

async fn backfill_folds(conn: &mut SqliteConnection) -> Result<()> {
    let groups: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM groups")
        .fetch_all(&mut *conn)
        .await?;
    for (id, name) in &groups {
        sqlx::query("UPDATE groups SET name_fold = ? WHERE id = ?")
            .bind(fold_case(name))
            .bind(*id)
            .execute(&mut *conn)
            .await?;
    }

    let songs: Vec<(i64, String, String, String, String)> =
        sqlx::query_as("SELECT id, name, release_date, text, link FROM songs")
            .fetch_all(&mut *conn)
            .await?;
    for (id, name, release_date, text, link) in &songs {
        sqlx::query(
            r#"
            UPDATE songs
            SET name_fold = ?, release_date_fold = ?, text_fold = ?, link_fold = ?
            WHERE id = ?
            "#,
        )
        .bind(fold_case(name))
        .bind(fold_case(release_date))
        .bind(fold_case(text))
        .bind(fold_case(link))
        .bind(*id)
        .execute(&mut *conn)
        .await?;
    }

    debug!(
        groups = groups.len(),
        songs = songs.len(),
        "Backfilled case-folded columns"
    );
    Ok(())
}
