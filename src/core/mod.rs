//! Core library functions for the songs library

pub mod lyrics;
pub mod songlib;

pub use lyrics::LyricsLib;
pub use songlib::SongLib;
