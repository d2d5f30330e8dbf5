//! Catalog service contract
//!
//! The catalog is the remote service that owns the video files. Everything
//! the client knows about the library arrives through this trait.

use crate::error::Result;
use crate::models::{SubdirectoryInfo, VideoId, VideoRecord};
use async_trait::async_trait;
use serde_json::Value;

/// Remote video catalog
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// List the subdirectories of the library root.
    async fn list_subdirectories(&self) -> Result<Vec<SubdirectoryInfo>>;

    /// List the videos in `subdir`, in server order.
    ///
    /// Records are lightweight: `meta` is absent.
    async fn list_videos(&self, subdir: &str) -> Result<Vec<VideoRecord>>;

    /// Fetch the full record of one video.
    async fn get_video(&self, id: &VideoId) -> Result<VideoRecord>;

    /// Resolve the relative path `template` would produce for a video.
    ///
    /// The server expands `%(field)s` placeholders from the video's info
    /// document. A template starting with `/` is relative to the library
    /// root rather than to the video's subdirectory.
    async fn preview_relpath(&self, id: &VideoId, template: &str) -> Result<String>;

    /// Move the video file to `relpath`; returns the path the server settled on.
    async fn update_relpath(&self, id: &VideoId, relpath: &str) -> Result<String>;

    /// Delete the video and its sidecar files.
    async fn delete_video(&self, id: &VideoId) -> Result<()>;

    /// Ask the server to download `url` into `subdir`.
    ///
    /// # Returns
    /// The downloader's info document for the new video
    async fn create_video(&self, url: &str, subdir: &str) -> Result<Value>;

    /// Stream and format information for a video file.
    async fn probe_video(&self, id: &VideoId) -> Result<Value>;
}
