//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the video library core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus for presentation-layer notifications
//!
//! ## Overview
//!
//! Every other workspace crate depends on this one for its ambient concerns.
//! Nothing here knows about videos beyond the event payloads.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
