//! # Library Synchronization
//!
//! Keeps the client-side library state in step with the catalog service.
//!
//! ## Components
//!
//! - **Store** (`store`): Owns the `AppState`; the single dispatch entry point
//! - **Subdirectory Loader** (`loader`): List loads and the ordered detail chain
//! - **Video Controller** (`controller`): Rename/move preview and commit, delete
//!
//! Loader and controller never touch the state directly; they dispatch
//! actions through the store.

pub mod controller;
pub mod error;
pub mod loader;
pub mod store;

pub use controller::{FormatPreset, RenamePhase, VideoController};
pub use error::{Result, SyncError};
pub use loader::{LoadReport, SubdirectoryLoader};
pub use store::Store;
