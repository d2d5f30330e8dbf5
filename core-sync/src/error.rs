use core_library::LibraryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Video {video_id} is not in the current list")]
    VideoNotFound { video_id: String },

    #[error("Video {video_id} is already in subdirectory '{subdir}'")]
    MoveDisabled { video_id: String, subdir: String },

    #[error("A path update for video {video_id} is already in flight")]
    CommitInFlight { video_id: String },

    #[error(transparent)]
    Library(#[from] LibraryError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
