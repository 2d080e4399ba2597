//! Song store: the persistence operations the service is built on
//!
//! Every mutation runs in one transaction together with the group bookkeeping
//! it implies, so a failed orphan cleanup also rolls back the song change.

use async_trait::async_trait;
use tracing::{debug, error};

use super::tables::{GroupTable, SongTable};
use super::DbEngine;
use crate::error::{SongError, SongResult};
use crate::models::{Pagination, Song, SongFilter};

/// Persistence operations over songs and their groups
#[async_trait]
pub trait SongStore: Send + Sync {
    /// One page of songs matching every filter
    async fn list(&self, filter: &SongFilter, page: Pagination) -> SongResult<Vec<Song>>;

    /// Full lyric text of a song
    async fn lyrics(&self, id: i64) -> SongResult<String>;

    /// Delete a song and release its group if nothing references it any more
    async fn delete(&self, id: i64) -> SongResult<()>;

    /// Apply the non-empty fields of `patch` to song `id`, returning the stored song
    async fn update(&self, id: i64, patch: &Song) -> SongResult<Song>;

    /// Insert a song, creating its group when needed; returns the song with its new id
    async fn create(&self, song: &Song) -> SongResult<Song>;
}

/// sqlx-backed song store
#[derive(Clone)]
pub struct SqliteSongStore {
    engine: DbEngine,
}

impl SqliteSongStore {
    pub fn new(engine: DbEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl SongStore for SqliteSongStore {
    async fn list(&self, filter: &SongFilter, page: Pagination) -> SongResult<Vec<Song>> {
        debug!(?filter, page = page.page(), page_size = page.limit(), "Fetching songs");

        let mut conn = self.engine.pool().acquire().await?;
        let songs = SongTable::list(&mut conn, filter, page)
            .await
            .map_err(|e| {
                error!("Failed to query songs: {}", e);
                e
            })?;

        debug!(count = songs.len(), "Fetched songs");
        Ok(songs)
    }

    async fn lyrics(&self, id: i64) -> SongResult<String> {
        let mut conn = self.engine.pool().acquire().await?;
        SongTable::lyrics(&mut conn, id)
            .await?
            .ok_or(SongError::NotFound(id))
    }

    async fn delete(&self, id: i64) -> SongResult<()> {
        let mut tx = self.engine.pool().begin().await?;

        let group_id = SongTable::delete(&mut *tx, id)
            .await?
            .ok_or(SongError::NotFound(id))?;
        GroupTable::release_if_orphaned(&mut *tx, group_id).await?;

        tx.commit().await?;
        debug!(id, group_id, "Song deleted");
        Ok(())
    }

    async fn update(&self, id: i64, patch: &Song) -> SongResult<Song> {
        let mut tx = self.engine.pool().begin().await?;

        // first statement writes, see `SongTable::claim_group_id`
        let previous_group = SongTable::claim_group_id(&mut *tx, id)
            .await?
            .ok_or(SongError::NotFound(id))?;

        let new_group = if patch.group.is_empty() {
            None
        } else {
            Some(GroupTable::ensure(&mut *tx, &patch.group).await?)
        };

        let touched = SongTable::update(&mut *tx, id, patch, new_group).await?;

        if matches!(new_group, Some(group_id) if group_id != previous_group) {
            GroupTable::release_if_orphaned(&mut *tx, previous_group).await?;
        }

        let song = SongTable::get_by_id(&mut *tx, id)
            .await?
            .ok_or(SongError::NotFound(id))?;

        tx.commit().await?;
        debug!(id, touched, "Song updated");
        Ok(song)
    }

    async fn create(&self, song: &Song) -> SongResult<Song> {
        let mut tx = self.engine.pool().begin().await?;

        let group_id = GroupTable::ensure(&mut *tx, &song.group).await?;
        let id = SongTable::insert(&mut *tx, song, group_id).await?;

        tx.commit().await?;
        debug!(id, group_id, "Song created");

        Ok(Song {
            id,
            ..song.clone()
        })
    }
}
