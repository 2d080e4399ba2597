//! REST API routes for the songs library

pub mod songs;

use actix_web::{error, web, HttpRequest};

use crate::error::SongError;

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // malformed JSON bodies and query strings answer with the same error shape as everything else
        .app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        // Song routes
        .service(web::scope("/songs").configure(songs::configure));
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    SongError::invalid_input(err.to_string()).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    SongError::invalid_input(err.to_string()).into()
}
