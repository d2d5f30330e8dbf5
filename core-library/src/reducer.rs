//! State transitions for the video library.
//!
//! [`reduce`] is the only function that produces a new [`AppState`]. It is
//! synchronous and performs no I/O; the store serializes calls to it.

use crate::collection::VideoCollection;
use crate::error::LibraryError;
use crate::models::{SubdirectoryInfo, VideoId, VideoRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Subdirectory selected before the user picks one.
pub const DEFAULT_SUBDIR: &str = "unsorted";

/// Complete client-side state.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub current_subdir: String,
    pub videos: VideoCollection,
    pub all_subdirs: Vec<SubdirectoryInfo>,
}

impl AppState {
    pub fn new(current_subdir: impl Into<String>) -> Self {
        Self {
            current_subdir: current_subdir.into(),
            videos: VideoCollection::new(),
            all_subdirs: Vec::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_SUBDIR)
    }
}

/// Input to [`reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SubdirSelected(String),
    VideoListLoaded(Vec<VideoRecord>),
    VideoDetailLoaded(VideoRecord),
    PathUpdated {
        video_id: VideoId,
        relpath: String,
        dirty: bool,
    },
    VideoDeleted(VideoId),
    SubdirsLoaded(Vec<SubdirectoryInfo>),
}

impl Action {
    /// Wire tag of this action.
    pub fn tag(&self) -> &'static str {
        match self {
            Action::SubdirSelected(_) => "SUBDIR_SELECTED",
            Action::VideoListLoaded(_) => "VIDEOLIST_LOADED",
            Action::VideoDetailLoaded(_) => "VIDEO_LOADED",
            Action::PathUpdated { .. } => "PATH_UPDATED",
            Action::VideoDeleted(_) => "VIDEO_DELETED",
            Action::SubdirsLoaded(_) => "SUBDIRS_LOADED",
        }
    }
}

/// Apply `action` to `state` and return the next state.
///
/// Actions that name a video missing from the collection leave the state
/// untouched. A late detail response for a list that has since been replaced
/// lands here.
pub fn reduce(mut state: AppState, action: Action) -> AppState {
    debug!(action = action.tag(), "reduce");

    match action {
        Action::SubdirSelected(name) => {
            state.current_subdir = name;
        }
        Action::VideoListLoaded(records) => {
            let records = records
                .into_iter()
                .map(|mut record| {
                    record.meta = None;
                    record.dirty = false;
                    record
                })
                .collect();
            state.videos = VideoCollection::from_records(records);
        }
        Action::VideoDetailLoaded(record) => {
            let id = record.id.clone();
            if !state.videos.replace(record) {
                debug!(video_id = %id, "detail for unknown video ignored");
            }
        }
        Action::PathUpdated {
            video_id,
            relpath,
            dirty,
        } => {
            if !state.videos.update_path(&video_id, relpath, dirty) {
                debug!(video_id = %video_id, "path update for unknown video ignored");
            }
        }
        Action::VideoDeleted(video_id) => {
            if state.videos.remove(&video_id).is_none() {
                debug!(video_id = %video_id, "delete for unknown video ignored");
            }
        }
        Action::SubdirsLoaded(subdirs) => {
            state.all_subdirs = subdirs;
        }
    }

    state
}

// =============================================================================
// Tagged events
// =============================================================================

/// Externally tagged form of an [`Action`]: `{"type": "...", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedEvent {
    #[serde(rename = "type")]
    pub tag: String,

    #[serde(default)]
    pub payload: Value,
}

impl TaggedEvent {
    pub fn new(tag: impl Into<String>, payload: Value) -> Self {
        Self {
            tag: tag.into(),
            payload,
        }
    }
}

#[derive(Deserialize)]
struct PathUpdatedPayload {
    #[serde(alias = "videoid")]
    video_id: VideoId,
    #[serde(alias = "path")]
    relpath: String,
    #[serde(default)]
    dirty: bool,
}

fn payload<T: serde::de::DeserializeOwned>(
    tag: &str,
    payload: Value,
) -> Result<T, LibraryError> {
    serde_json::from_value(payload).map_err(|e| LibraryError::MalformedEvent {
        tag: tag.to_string(),
        message: e.to_string(),
    })
}

impl TryFrom<TaggedEvent> for Action {
    type Error = LibraryError;

    fn try_from(event: TaggedEvent) -> Result<Self, Self::Error> {
        let TaggedEvent { tag, payload: body } = event;
        let action = match tag.as_str() {
            "SUBDIR_SELECTED" | "CURRENT_SUBDIR_UPDATED" => {
                Action::SubdirSelected(payload(&tag, body)?)
            }
            "VIDEOLIST_LOADED" => Action::VideoListLoaded(payload(&tag, body)?),
            "VIDEO_LOADED" => Action::VideoDetailLoaded(payload(&tag, body)?),
            "PATH_UPDATED" => {
                let p: PathUpdatedPayload = payload(&tag, body)?;
                Action::PathUpdated {
                    video_id: p.video_id,
                    relpath: p.relpath,
                    dirty: p.dirty,
                }
            }
            "VIDEO_DELETED" => Action::VideoDeleted(payload(&tag, body)?),
            "SUBDIRS_LOADED" => Action::SubdirsLoaded(payload(&tag, body)?),
            _ => return Err(LibraryError::UnknownEvent(tag)),
        };
        Ok(action)
    }
}
