//! # Video Library State
//!
//! Client-side model of a remote video catalog.
//!
//! ## Overview
//!
//! This crate provides:
//! - Domain models for videos and subdirectories
//! - An ordered video collection with an id → position index
//! - The reducer: the single pure state transition function
//! - The `CatalogService` contract implemented by catalog connectors

pub mod catalog;
pub mod collection;
pub mod error;
pub mod models;
pub mod reducer;

pub use catalog::CatalogService;
pub use collection::VideoCollection;
pub use error::{LibraryError, Result};
pub use models::{SubdirectoryInfo, VideoId, VideoMeta, VideoRecord, PLACEHOLDER_THUMBNAIL};
pub use reducer::{reduce, Action, AppState, TaggedEvent, DEFAULT_SUBDIR};
