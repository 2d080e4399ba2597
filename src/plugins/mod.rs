//! External integrations

mod songinfo;

pub use songinfo::{HttpSongInfo, SongInfoSource};
