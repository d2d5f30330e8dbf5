//! # Catalog Provider
//!
//! Implements `CatalogService` over the video catalog's HTTP API.
//!
//! ## Overview
//!
//! This module provides:
//! - Subdirectory and video listing
//! - Per-video detail, preview, rename/move and delete requests
//! - Download requests for new videos and ffprobe passthrough
//! - Retries with backoff for read-only requests only

pub mod connector;
pub mod error;
pub mod types;

pub use connector::CatalogConnector;
pub use error::{CatalogError, Result};
