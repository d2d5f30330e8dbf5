//! # Rename/Move Controller
//!
//! Drives preview and commit of a new path for one video.
//!
//! ## State Machine
//!
//! ```text
//! Clean ──preview──→ Previewing ──commit──→ Committing ──ok──→ Clean
//!   │                    │  ↑                   │
//!   └──────commit────────┼──┘ preview           └──error──→ (previous phase)
//!                        └────────────commit───────────────→ Committing
//! ```
//!
//! At most one commit is in flight per video; a second one is rejected with
//! [`SyncError::CommitInFlight`].
//!
//! A preview only ever marks the path dirty. The path becomes clean again
//! only when the server confirms a commit. Preview responses that resolve
//! while a commit is in flight, or after a commit started, are dropped.

use crate::error::{Result, SyncError};
use crate::store::Store;
use core_library::catalog::CatalogService;
use core_library::models::{VideoId, VideoRecord};
use core_library::reducer::Action;
use core_library::LibraryError;
use core_runtime::events::{CoreEvent, EventBus, RequestEvent, RequestOperation};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Phase of the rename workflow for one video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenamePhase {
    /// Displayed path is the confirmed one
    #[default]
    Clean,
    /// Displayed path is an unconfirmed preview
    Previewing,
    /// Update request in flight
    Committing,
}

/// Built-in format templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatPreset {
    /// The file's original name, unexpanded
    OriginalFilename,
    /// `<title>-<id>.<ext>`
    Title,
    /// `<upload date>-<title>-<id>.<ext>`
    UploadDate,
}

impl FormatPreset {
    pub const TITLE_TEMPLATE: &'static str = "%(title)s-%(id)s.%(ext)s";
    pub const UPLOAD_DATE_TEMPLATE: &'static str = "%(upload_date)s-%(title)s-%(id)s.%(ext)s";

    pub fn template(&self, record: &VideoRecord) -> String {
        match self {
            FormatPreset::OriginalFilename => record.filename.clone(),
            FormatPreset::Title => Self::TITLE_TEMPLATE.to_string(),
            FormatPreset::UploadDate => Self::UPLOAD_DATE_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct PhaseState {
    phase: RenamePhase,
    /// Bumped whenever a commit starts; previews issued earlier are stale.
    commits: u64,
}

/// Rename, move and delete for a single video.
///
/// Controllers for different videos are independent.
pub struct VideoController {
    video_id: VideoId,
    catalog: Arc<dyn CatalogService>,
    store: Arc<Store>,
    event_bus: Arc<EventBus>,
    state: Mutex<PhaseState>,
}

impl VideoController {
    pub fn new(video_id: VideoId, catalog: Arc<dyn CatalogService>, store: Arc<Store>) -> Self {
        let event_bus = Arc::clone(store.event_bus());
        Self {
            video_id,
            catalog,
            store,
            event_bus,
            state: Mutex::new(PhaseState::default()),
        }
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    pub async fn phase(&self) -> RenamePhase {
        self.state.lock().await.phase
    }

    async fn record(&self) -> Result<VideoRecord> {
        self.store
            .video(&self.video_id)
            .await
            .ok_or_else(|| SyncError::VideoNotFound {
                video_id: self.video_id.to_string(),
            })
    }

    fn report_success(&self, operation: RequestOperation) {
        self.event_bus
            .emit(CoreEvent::Request(RequestEvent::Succeeded {
                operation,
                video_id: Some(self.video_id.to_string()),
            }))
            .ok();
    }

    fn report_failure(&self, operation: RequestOperation, error: &LibraryError) {
        warn!("{} failed for {}: {}", operation, self.video_id, error);
        self.event_bus
            .emit(CoreEvent::Request(RequestEvent::Failed {
                operation,
                video_id: Some(self.video_id.to_string()),
                message: error.to_string(),
            }))
            .ok();
    }

    /// Ask the server what path `template` produces and display it as dirty.
    ///
    /// Returns `None` when the response was dropped because a commit started
    /// in the meantime.
    #[instrument(skip(self), fields(video_id = %self.video_id))]
    pub async fn preview(&self, template: &str) -> Result<Option<String>> {
        self.record().await?;
        let issued_after = self.state.lock().await.commits;

        let relpath = match self.catalog.preview_relpath(&self.video_id, template).await {
            Ok(relpath) => relpath,
            Err(e) => {
                self.report_failure(RequestOperation::Preview, &e);
                return Err(e.into());
            }
        };

        let mut state = self.state.lock().await;
        if state.phase == RenamePhase::Committing || state.commits != issued_after {
            debug!("Dropping preview that resolved after a commit started");
            return Ok(None);
        }

        self.store
            .dispatch(Action::PathUpdated {
                video_id: self.video_id.clone(),
                relpath: relpath.clone(),
                dirty: true,
            })
            .await;
        state.phase = RenamePhase::Previewing;

        Ok(Some(relpath))
    }

    /// Preview one of the built-in templates.
    pub async fn preview_preset(&self, preset: FormatPreset) -> Result<Option<String>> {
        let record = self.record().await?;
        self.preview(&preset.template(&record)).await
    }

    /// Submit the displayed path to the server.
    ///
    /// Returns the path the server confirmed. Fails with
    /// [`SyncError::CommitInFlight`] while another commit is pending.
    pub async fn commit_rename(&self) -> Result<String> {
        let record = self.record().await?;
        self.commit(RequestOperation::Rename, record.relpath).await
    }

    /// Whether the video can be moved to `target`.
    ///
    /// False when `target` is the video's own subdirectory or the video is
    /// no longer listed.
    pub async fn can_move(&self, target: &str) -> bool {
        self.store
            .video(&self.video_id)
            .await
            .is_some_and(|record| record.subdir != target)
    }

    /// Move the video into `target`, keeping its displayed file name.
    pub async fn commit_move(&self, target: &str) -> Result<String> {
        let record = self.record().await?;
        if record.subdir == target {
            return Err(SyncError::MoveDisabled {
                video_id: self.video_id.to_string(),
                subdir: record.subdir,
            });
        }

        let relpath = move_target(target, record.basename());
        self.commit(RequestOperation::Move, relpath).await
    }

    #[instrument(skip(self), fields(video_id = %self.video_id))]
    async fn commit(&self, operation: RequestOperation, relpath: String) -> Result<String> {
        let previous = {
            let mut state = self.state.lock().await;
            let previous = state.phase;
            if previous == RenamePhase::Committing {
                debug!("Rejecting {} while another commit is in flight", operation);
                return Err(SyncError::CommitInFlight {
                    video_id: self.video_id.to_string(),
                });
            }
            state.phase = RenamePhase::Committing;
            state.commits += 1;
            previous
        };

        match self.catalog.update_relpath(&self.video_id, &relpath).await {
            Ok(confirmed) => {
                let mut state = self.state.lock().await;
                self.store
                    .dispatch(Action::PathUpdated {
                        video_id: self.video_id.clone(),
                        relpath: confirmed.clone(),
                        dirty: false,
                    })
                    .await;
                state.phase = RenamePhase::Clean;
                drop(state);

                info!("{} confirmed: {}", operation, confirmed);
                self.report_success(operation);
                Ok(confirmed)
            }
            Err(e) => {
                self.state.lock().await.phase = previous;
                self.report_failure(operation, &e);
                Err(e.into())
            }
        }
    }

    /// Delete the video. The record is removed once the server confirms.
    #[instrument(skip(self), fields(video_id = %self.video_id))]
    pub async fn delete(&self) -> Result<()> {
        self.record().await?;

        match self.catalog.delete_video(&self.video_id).await {
            Ok(()) => {
                self.store
                    .dispatch(Action::VideoDeleted(self.video_id.clone()))
                    .await;
                info!("Video deleted");
                self.report_success(RequestOperation::Delete);
                Ok(())
            }
            Err(e) => {
                self.report_failure(RequestOperation::Delete, &e);
                Err(e.into())
            }
        }
    }
}

impl std::fmt::Debug for VideoController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoController")
            .field("video_id", &self.video_id)
            .finish()
    }
}

fn move_target(target: &str, basename: &str) -> String {
    let target = target.trim_end_matches('/');
    if target.is_empty() {
        basename.to_string()
    } else {
        format!("{}/{}", target, basename)
    }
}
