//! Data models for the songs library

mod song;

pub use song::{Pagination, Song, SongDetail, SongFilter};
