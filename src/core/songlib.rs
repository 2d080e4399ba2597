//! Song library service
//!
//! Sits between the HTTP layer and the store: validates the payloads the
//! store relies on, runs enrichment before creation and paginates lyrics.

use std::sync::Arc;
use tracing::{debug, info};

use super::LyricsLib;
use crate::db::SongStore;
use crate::error::{SongError, SongResult};
use crate::models::{Pagination, Song, SongFilter};
use crate::plugins::SongInfoSource;

/// Song library functions
#[derive(Clone)]
pub struct SongLib {
    store: Arc<dyn SongStore>,
    info: Arc<dyn SongInfoSource>,
}

impl SongLib {
    pub fn new(store: Arc<dyn SongStore>, info: Arc<dyn SongInfoSource>) -> Self {
        Self { store, info }
    }

    /// Filtered, paginated songs
    pub async fn list(&self, filter: &SongFilter, page: Pagination) -> SongResult<Vec<Song>> {
        self.store.list(filter, page).await
    }

    /// Whole lyrics, or the verse at 1-based `verse` when it exists
    pub async fn lyrics(&self, id: i64, verse: i64) -> SongResult<String> {
        let lyrics = self.store.lyrics(id).await?;
        Ok(LyricsLib::verse(&lyrics, verse).to_string())
    }

    pub async fn delete(&self, id: i64) -> SongResult<()> {
        self.store.delete(id).await?;
        info!(id, "Deleted song");
        Ok(())
    }

    /// Partial update; the id always comes from the caller, never the payload
    pub async fn update(&self, id: i64, mut patch: Song) -> SongResult<Song> {
        patch.id = id;
        patch.group = patch.group.trim().to_string();
        patch.song = patch.song.trim().to_string();
        if !patch.has_changes() {
            debug!(id, "Update without fields");
        }

        let song = self.store.update(id, &patch).await?;
        info!(id, "Updated song");
        Ok(song)
    }

    /// Enrich a new song from its group and title, then store it.
    /// Nothing is written when the lookup fails.
    pub async fn create(&self, mut song: Song) -> SongResult<Song> {
        song.group = song.group.trim().to_string();
        song.song = song.song.trim().to_string();

        if song.group.is_empty() || song.song.is_empty() {
            return Err(SongError::invalid_input("both group and song are required"));
        }

        let detail = self.info.fetch(&song.group, &song.song).await?;
        song.apply_detail(detail);

        let created = self.store.create(&song).await?;
        info!(id = created.id, group = %created.group, song = %created.song, "Created song");
        Ok(created)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::{run_migrations, DbEngine, SqliteSongStore};
    use crate::models::SongDetail;
    use async_trait::async_trait;

    /// Enrichment stub answering every lookup with fixed data, or failing
    pub(crate) struct StubInfo {
        pub fail: bool,
    }

    #[async_trait]
    impl SongInfoSource for StubInfo {
        async fn fetch(&self, group: &str, song: &str) -> SongResult<SongDetail> {
            if self.fail {
                return Err(SongError::enrichment("song info API returned 503"));
            }
            Ok(SongDetail {
                release_date: Some("16.07.2006".into()),
                text: Some(format!("{} by {}\n\nchorus\n\noutro", song, group)),
                link: Some("https://songs.example/watch".into()),
            })
        }
    }

    pub(crate) async fn songlib(fail: bool) -> SongLib {
        let engine = DbEngine::in_memory().await.unwrap();
        run_migrations(engine.pool()).await.unwrap();
        SongLib::new(
            Arc::new(SqliteSongStore::new(engine)),
            Arc::new(StubInfo { fail }),
        )
    }

    #[tokio::test]
    async fn test_create_is_enriched() {
        let lib = songlib(false).await;
        let mut song = Song::new("Muse", "Uprising");
        song.text = "ignored".into();

        let created = lib.create(song).await.unwrap();
        assert_eq!(created.release_date, "16.07.2006");
        assert_eq!(created.text, "Uprising by Muse\n\nchorus\n\noutro");
        assert_eq!(created.link, "https://songs.example/watch");
    }

    #[tokio::test]
    async fn test_create_requires_group_and_song() {
        let lib = songlib(false).await;
        assert!(matches!(
            lib.create(Song::new("  ", "Uprising")).await,
            Err(SongError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_enrichment_writes_nothing() {
        let lib = songlib(true).await;
        assert!(matches!(
            lib.create(Song::new("Muse", "Uprising")).await,
            Err(SongError::Enrichment(_))
        ));

        let all = lib
            .list(&SongFilter::default(), Pagination::default())
            .await
            .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_lyrics_verse() {
        let lib = songlib(false).await;
        let created = lib.create(Song::new("Muse", "Uprising")).await.unwrap();

        assert_eq!(lib.lyrics(created.id, 2).await.unwrap(), "chorus");
        assert_eq!(lib.lyrics(created.id, 0).await.unwrap(), created.text);
        assert_eq!(lib.lyrics(created.id, 9).await.unwrap(), created.text);
    }

    #[tokio::test]
    async fn test_update_ignores_payload_id() {
        let lib = songlib(false).await;
        let created = lib.create(Song::new("Muse", "Uprising")).await.unwrap();

        let patch = Song {
            id: created.id + 50,
            link: "https://other.example".into(),
            ..Song::default()
        };
        let updated = lib.update(created.id, patch).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.link, "https://other.example");
    }

    #[tokio::test]
    async fn test_update_trims_group_and_song() {
        let lib = songlib(false).await;
        let created = lib.create(Song::new("Muse", "Uprising")).await.unwrap();

        let patch = Song {
            group: " Muse ".into(),
            song: "  Uprising (Live) ".into(),
            ..Song::default()
        };
        let updated = lib.update(created.id, patch).await.unwrap();
        assert_eq!(updated.group, "Muse");
        assert_eq!(updated.song, "Uprising (Live)");

        // whitespace-only values leave the fields unchanged
        let patch = Song {
            group: "   ".into(),
            song: " ".into(),
            ..Song::default()
        };
        let unchanged = lib.update(created.id, patch).await.unwrap();
        assert_eq!(unchanged.group, "Muse");
        assert_eq!(unchanged.song, "Uprising (Live)");
    }
}
