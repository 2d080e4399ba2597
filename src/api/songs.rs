//! Song routes: listing, lyrics, create, partial update and delete

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::core::{LyricsLib, SongLib};
use crate::error::{SongError, SongResult};
use crate::models::{Pagination, Song, SongFilter};

/// Query string of `GET /songs`; everything optional and parsed leniently
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    group: Option<String>,
    song: Option<String>,
    release_date: Option<String>,
    text: Option<String>,
    link: Option<String>,
    page: Option<String>,
    page_size: Option<String>,
}

impl ListQuery {
    fn filter(&self) -> SongFilter {
        SongFilter {
            group: self.group.clone().unwrap_or_default(),
            song: self.song.clone().unwrap_or_default(),
            release_date: self.release_date.clone().unwrap_or_default(),
            text: self.text.clone().unwrap_or_default(),
            link: self.link.clone().unwrap_or_default(),
        }
    }

    fn pagination(&self) -> Pagination {
        Pagination::parse(self.page.as_deref(), self.page_size.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct LyricsQuery {
    verse: Option<String>,
}

fn parse_id(raw: &str) -> SongResult<i64> {
    raw.trim().parse().map_err(|_| {
        warn!(id = raw, "Invalid song ID");
        SongError::invalid_input(format!("invalid song id: {}", raw))
    })
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> SongResult<HttpResponse> {
    let body = serde_json::to_string(value).map_err(|e| {
        error!("Failed to encode response: {}", e);
        SongError::from(e)
    })?;

    Ok(HttpResponse::build(status)
        .content_type(ContentType::json())
        .body(body))
}

fn log_failure(action: &str, err: SongError) -> SongError {
    match err {
        SongError::InvalidInput(_) | SongError::NotFound(_) => {
            warn!("Failed to {}: {}", action, err)
        }
        _ => error!("Failed to {}: {}", action, err),
    }
    err
}

/// List songs with filters and pagination
#[get("")]
pub async fn list_songs(
    lib: web::Data<SongLib>,
    query: web::Query<ListQuery>,
) -> SongResult<HttpResponse> {
    let filter = query.filter();
    let page = query.pagination();
    info!(?filter, page = page.page(), page_size = page.limit(), "Fetching songs");

    let songs = lib
        .list(&filter, page)
        .await
        .map_err(|e| log_failure("fetch songs", e))?;

    json_response(StatusCode::OK, &songs)
}

/// Lyrics of a song, optionally a single verse
#[get("/{id}")]
pub async fn get_lyrics(
    lib: web::Data<SongLib>,
    path: web::Path<String>,
    query: web::Query<LyricsQuery>,
) -> SongResult<HttpResponse> {
    let id = parse_id(&path)?;
    let verse = LyricsLib::parse_index(query.verse.as_deref());
    info!(id, verse, "Fetching lyrics");

    let lyrics = lib
        .lyrics(id, verse)
        .await
        .map_err(|e| log_failure("fetch lyrics", e))?;

    json_response(StatusCode::OK, &lyrics)
}

/// Delete a song
#[delete("/{id}")]
pub async fn delete_song(
    lib: web::Data<SongLib>,
    path: web::Path<String>,
) -> SongResult<HttpResponse> {
    let id = parse_id(&path)?;
    info!(id, "Deleting song");

    lib.delete(id)
        .await
        .map_err(|e| log_failure("delete song", e))?;

    Ok(HttpResponse::NoContent().finish())
}

/// Partially update a song; empty fields are left unchanged
#[patch("/{id}")]
pub async fn update_song(
    lib: web::Data<SongLib>,
    path: web::Path<String>,
    body: web::Json<Song>,
) -> SongResult<HttpResponse> {
    let id = parse_id(&path)?;
    let patch = body.into_inner();
    info!(id, ?patch, "Updating song");

    let song = lib
        .update(id, patch)
        .await
        .map_err(|e| log_failure("update song", e))?;

    json_response(StatusCode::OK, &song)
}

/// Create a song from its group and title; the rest comes from the song info API
#[post("")]
pub async fn create_song(
    lib: web::Data<SongLib>,
    body: web::Json<Song>,
) -> SongResult<HttpResponse> {
    let song = body.into_inner();
    info!(group = %song.group, song = %song.song, "Creating song");

    let created = lib
        .create(song)
        .await
        .map_err(|e| log_failure("create song", e))?;

    json_response(StatusCode::CREATED, &created)
}

/// Configure song routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_songs)
        .service(create_song)
        .service(get_lyrics)
        .service(delete_song)
        .service(update_song);
}
