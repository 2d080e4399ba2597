//! Database module for the songs library
//!
//! This module handles all database operations using SQLx with SQLite.

mod engine;
mod migrations;
mod store;
pub mod tables;

pub use engine::DbEngine;
pub use migrations::run_migrations;
pub use store::{SongStore, SqliteSongStore};
