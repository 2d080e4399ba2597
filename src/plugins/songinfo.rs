//! Song info lookup used to enrich newly created songs

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::EnrichmentConfig;
use crate::error::{SongError, SongResult};
use crate::models::SongDetail;

/// Source of canonical release date, lyrics and link for a group/title pair
#[async_trait]
pub trait SongInfoSource: Send + Sync {
    async fn fetch(&self, group: &str, song: &str) -> SongResult<SongDetail>;
}

/// Song info API reached over HTTP: `GET {url}?group=..&song=..`
pub struct HttpSongInfo {
    client: Client,
    url: String,
}

impl HttpSongInfo {
    pub fn new(config: &EnrichmentConfig) -> SongResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl SongInfoSource for HttpSongInfo {
    async fn fetch(&self, group: &str, song: &str) -> SongResult<SongDetail> {
        info!(url = %self.url, group, song, "Requesting song info");

        let resp = self
            .client
            .get(&self.url)
            .query(&[("group", group), ("song", song)])
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach song info API: {}", e);
                SongError::from(e)
            })?;

        let status = resp.status();
        if status != StatusCode::OK {
            error!(%status, "Song info API returned non-OK status");
            return Err(SongError::enrichment(format!(
                "song info API returned {}",
                status
            )));
        }

        let detail: SongDetail = resp.json().await?;
        debug!(?detail, "Received song info");
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_parsing() {
        let detail: SongDetail = serde_json::from_str(
            r#"{
                "releaseDate": "16.07.2006",
                "text": "Ooh baby, don't you know I suffer?\n\nOoh baby, can you hear me moan?",
                "link": "https://www.youtube.com/watch?v=Xsp3_a-PMTw"
            }"#,
        )
        .unwrap();

        assert_eq!(detail.release_date.as_deref(), Some("16.07.2006"));
        assert!(detail.text.unwrap().contains("\n\n"));
    }

    #[test]
    fn test_detail_partial() {
        let detail: SongDetail = serde_json::from_str(r#"{"link": "x"}"#).unwrap();
        assert_eq!(detail.link.as_deref(), Some("x"));
        assert!(detail.release_date.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_enrichment_failure() {
        let info = HttpSongInfo::new(&EnrichmentConfig {
            // nothing listens on the discard port
            url: "http://127.0.0.1:9/info".into(),
            timeout_secs: 2,
        })
        .unwrap();

        assert!(matches!(
            info.fetch("Muse", "Uprising").await,
            Err(SongError::Enrichment(_))
        ));
    }
}
