//! Domain models for the video library
//!
//! Records mirror what the catalog service returns. Optional fields degrade to
//! `None`/defaults so that a partially populated response still renders.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Shown while a record's metadata has not been loaded yet.
pub const PLACEHOLDER_THUMBNAIL: &str = "https://via.placeholder.com/200x133";

// =============================================================================
// ID Types
// =============================================================================

/// Server-assigned, stable identifier for a video
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VideoId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for VideoId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// Downloader metadata attached to a detailed record.
///
/// Only the fields the client reads are typed; the rest of the info document
/// is kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    /// `YYYYMMDD` as reported by the downloader
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One video file in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: VideoId,

    /// Path relative to the library root
    pub relpath: String,

    /// Owning subdirectory
    #[serde(default)]
    pub subdir: String,

    /// Original file name
    #[serde(default)]
    pub filename: String,

    /// `None` until the detail record has been loaded
    #[serde(default)]
    pub meta: Option<VideoMeta>,

    /// Displayed `relpath` is an uncommitted preview
    #[serde(default, alias = "dirtyFlag")]
    pub dirty: bool,
}

impl VideoRecord {
    /// Lightweight record as returned by the list endpoint.
    pub fn new(
        id: impl Into<VideoId>,
        relpath: impl Into<String>,
        subdir: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            relpath: relpath.into(),
            subdir: subdir.into(),
            filename: filename.into(),
            meta: None,
            dirty: false,
        }
    }

    pub fn with_meta(mut self, meta: VideoMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn is_detailed(&self) -> bool {
        self.meta.is_some()
    }

    pub fn title(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.title.as_deref())
    }

    /// Thumbnail to display, falling back to a placeholder image.
    pub fn thumbnail_url(&self) -> &str {
        self.meta
            .as_ref()
            .and_then(|m| m.thumbnail.as_deref())
            .unwrap_or(PLACEHOLDER_THUMBNAIL)
    }

    /// Last component of the displayed relative path.
    pub fn basename(&self) -> &str {
        self.relpath
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.filename)
    }
}

/// A subdirectory known to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdirectoryInfo {
    pub name: String,

    /// Folder artwork, if the catalog provides one
    #[serde(default)]
    pub folder_jpg: Option<String>,
}

impl SubdirectoryInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            folder_jpg: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_record_deserializes_without_meta() {
        let json = r#"{"id":"dQw4w9WgXcQ","relpath":"unsorted/a.mp4","subdir":"/lib/unsorted","filename":"a.mp4"}"#;
        let record: VideoRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, VideoId::new("dQw4w9WgXcQ"));
        assert!(record.meta.is_none());
        assert!(!record.dirty);
        assert_eq!(record.thumbnail_url(), PLACEHOLDER_THUMBNAIL);
    }

    #[test]
    fn test_detail_record_keeps_unknown_meta_fields() {
        let json = r#"{
            "id": "abc",
            "relpath": "unsorted/a.mp4",
            "subdir": "unsorted",
            "filename": "a.mp4",
            "meta": {
                "title": "A talk",
                "thumbnail": "https://i.ytimg.com/vi/abc/hq.jpg",
                "upload_date": "20200131",
                "duration": 312
            }
        }"#;
        let record: VideoRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.title(), Some("A talk"));
        assert_eq!(record.thumbnail_url(), "https://i.ytimg.com/vi/abc/hq.jpg");
        let meta = record.meta.unwrap();
        assert_eq!(meta.upload_date.as_deref(), Some("20200131"));
        assert_eq!(meta.extra.get("duration"), Some(&Value::from(312)));
    }

    #[test]
    fn test_dirty_flag_alias() {
        let json = r#"{"id":"abc","relpath":"x.mp4","dirtyFlag":true}"#;
        let record: VideoRecord = serde_json::from_str(json).unwrap();
        assert!(record.dirty);
        assert_eq!(record.subdir, "");
    }

    #[test]
    fn test_missing_relpath_is_rejected() {
        let json = r#"{"id":"abc","subdir":"unsorted"}"#;
        assert!(serde_json::from_str::<VideoRecord>(json).is_err());
    }

    #[test]
    fn test_basename() {
        let record = VideoRecord::new("a", "unsorted/2020/clip.mp4", "unsorted", "orig.mp4");
        assert_eq!(record.basename(), "clip.mp4");

        let record = VideoRecord::new("a", "unsorted/", "unsorted", "orig.mp4");
        assert_eq!(record.basename(), "orig.mp4");
    }

    #[test]
    fn test_subdirectory_info_tolerates_missing_artwork() {
        let subdirs: Vec<SubdirectoryInfo> =
            serde_json::from_str(r#"[{"name":"music"},{"name":"talks","folder_jpg":null}]"#)
                .unwrap();
        assert_eq!(subdirs, vec![SubdirectoryInfo::new("music"), SubdirectoryInfo::new("talks")]);
    }
}
