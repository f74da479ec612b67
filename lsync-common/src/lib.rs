//! # lsync Common Library
//!
//! Shared code for lsync services including:
//! - Song catalog model and SQLite queries
//! - Configuration loading
//! - Admin token authentication and API error types
//! - SSE streaming helpers

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod sse;

pub use db::models::{Song, SongUpdate};
pub use error::{Error, Result};
