//! Song table operations

use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use super::fold_case;
use crate::models::{Pagination, Song, SongFilter};

/// Database row for the songs/groups join
#[derive(Debug, FromRow)]
struct SongRow {
    id: i64,
    name: String,
    group_name: String,
    release_date: String,
    text: String,
    link: String,
}

impl SongRow {
    fn into_song(self) -> Song {
        Song {
            id: self.id,
            group: self.group_name,
            song: self.name,
            release_date: self.release_date,
            text: self.text,
            link: self.link,
        }
    }
}

/// Wrap a filter into a LIKE pattern matching it literally as a
/// case-folded substring
fn like_pattern(filter: &str) -> String {
    let folded = fold_case(filter);
    let mut pattern = String::with_capacity(folded.len() + 2);
    pattern.push('%');
    for c in folded.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Song table operations
pub struct SongTable;

impl SongTable {
    /// One page of songs matching every filter, ordered by id
    pub async fn list(
        conn: &mut SqliteConnection,
        filter: &SongFilter,
        page: Pagination,
    ) -> Result<Vec<Song>, sqlx::Error> {
        let rows: Vec<SongRow> = sqlx::query_as(
            r#"
            SELECT s.id, s.name, g.name AS group_name, s.release_date, s.text, s.link
            FROM songs s
            INNER JOIN groups g ON s.group_id = g.id
            WHERE s.name_fold LIKE ? ESCAPE '\'
              AND g.name_fold LIKE ? ESCAPE '\'
              AND s.release_date_fold LIKE ? ESCAPE '\'
              AND s.text_fold LIKE ? ESCAPE '\'
              AND s.link_fold LIKE ? ESCAPE '\'
            ORDER BY s.id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(like_pattern(&filter.song))
        .bind(like_pattern(&filter.group))
        .bind(like_pattern(&filter.release_date))
        .bind(like_pattern(&filter.text))
        .bind(like_pattern(&filter.link))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_song()).collect())
    }

    /// Get a song by id
    pub async fn get_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<Song>, sqlx::Error> {
        let row: Option<SongRow> = sqlx::query_as(
            r#"
            SELECT s.id, s.name, g.name AS group_name, s.release_date, s.text, s.link
            FROM songs s
            INNER JOIN groups g ON s.group_id = g.id
            WHERE s.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(|r| r.into_song()))
    }

    /// Lyric text of a song
    pub async fn lyrics(conn: &mut SqliteConnection, id: i64) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT text FROM songs WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Group currently referenced by a song, read through a no-op write.
    ///
    /// Opening a transaction with a write takes the database write lock up
    /// front, so concurrent updaters wait on the busy timeout instead of
    /// failing to upgrade a stale read snapshot.
    pub async fn claim_group_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("UPDATE songs SET group_id = group_id WHERE id = ? RETURNING group_id")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Insert a song row and return its id
    pub async fn insert(
        conn: &mut SqliteConnection,
        song: &Song,
        group_id: i64,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO songs (
                name, group_id, release_date, text, link,
                name_fold, release_date_fold, text_fold, link_fold
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&song.song)
        .bind(group_id)
        .bind(&song.release_date)
        .bind(&song.text)
        .bind(&song.link)
        .bind(fold_case(&song.song))
        .bind(fold_case(&song.release_date))
        .bind(fold_case(&song.text))
        .bind(fold_case(&song.link))
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Write the non-empty fields of `patch` (and the new group, if any) to song `id`.
    /// Returns the number of rows touched; nothing is issued when there is nothing to set.
    pub async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        patch: &Song,
        group_id: Option<i64>,
    ) -> Result<u64, sqlx::Error> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE songs SET ");
        let mut fields = 0;

        {
            let mut set = builder.separated(", ");

            if !patch.song.is_empty() {
                set.push("name = ").push_bind_unseparated(patch.song.clone());
                set.push("name_fold = ")
                    .push_bind_unseparated(fold_case(&patch.song));
                fields += 1;
            }
            if let Some(group_id) = group_id {
                set.push("group_id = ").push_bind_unseparated(group_id);
                fields += 1;
            }
            if !patch.release_date.is_empty() {
                set.push("release_date = ")
                    .push_bind_unseparated(patch.release_date.clone());
                set.push("release_date_fold = ")
                    .push_bind_unseparated(fold_case(&patch.release_date));
                fields += 1;
            }
            if !patch.text.is_empty() {
                set.push("text = ").push_bind_unseparated(patch.text.clone());
                set.push("text_fold = ")
                    .push_bind_unseparated(fold_case(&patch.text));
                fields += 1;
            }
            if !patch.link.is_empty() {
                set.push("link = ").push_bind_unseparated(patch.link.clone());
                set.push("link_fold = ")
                    .push_bind_unseparated(fold_case(&patch.link));
                fields += 1;
            }
        }

        if fields == 0 {
            return Ok(0);
        }

        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    /// Delete a song, returning the group it referenced
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("DELETE FROM songs WHERE id = ? RETURNING group_id")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }
}
