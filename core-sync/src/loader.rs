//! # Subdirectory Loader
//!
//! Fetches the subdirectory list and the video list of one subdirectory, then
//! walks the list fetching detail records one at a time.
//!
//! ## Workflow
//!
//! 1. Request the subdirectory list and the video list concurrently
//! 2. Each response is dispatched as soon as it resolves
//! 3. For each listed video, in list order: fetch its detail record and
//!    dispatch it before the next fetch is issued
//!
//! A failed detail fetch is reported and skipped. Loads are never cancelled;
//! a chain left running after a newer list arrived keeps fetching, and its
//! late detail records no-op in the reducer because their ids are gone.

use crate::error::Result;
use crate::store::Store;
use core_library::catalog::CatalogService;
use core_library::models::VideoId;
use core_library::reducer::Action;
use core_runtime::events::{CoreEvent, EventBus, LoadEvent};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

/// Outcome of one subdirectory load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub subdir: String,
    /// Records in the video list response
    pub videos: usize,
    pub details_loaded: usize,
    pub details_failed: usize,
}

#[derive(Clone)]
pub struct SubdirectoryLoader {
    catalog: Arc<dyn CatalogService>,
    store: Arc<Store>,
    event_bus: Arc<EventBus>,
}

impl SubdirectoryLoader {
    pub fn new(catalog: Arc<dyn CatalogService>, store: Arc<Store>) -> Self {
        let event_bus = Arc::clone(store.event_bus());
        Self {
            catalog,
            store,
            event_bus,
        }
    }

    fn emit(&self, event: LoadEvent) {
        self.event_bus.emit(CoreEvent::Load(event)).ok();
    }

    /// Fetch the subdirectory list and dispatch `SubdirsLoaded`.
    ///
    /// Returns the number of subdirectories.
    #[instrument(skip(self))]
    pub async fn load_subdirectories(&self) -> Result<usize> {
        match self.catalog.list_subdirectories().await {
            Ok(subdirs) => {
                let count = subdirs.len();
                self.store.dispatch(Action::SubdirsLoaded(subdirs)).await;
                Ok(count)
            }
            Err(e) => {
                warn!("Failed to list subdirectories: {}", e);
                self.emit(LoadEvent::Failed {
                    subdir: self.store.current_subdir().await,
                    stage: "subdirectories".to_string(),
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Fetch the video list of `subdir`, dispatch it, then run the detail
    /// chain over it.
    #[instrument(skip(self))]
    pub async fn load_videos(&self, subdir: &str) -> Result<LoadReport> {
        self.emit(LoadEvent::Started {
            subdir: subdir.to_string(),
        });

        let records = match self.catalog.list_videos(subdir).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to list videos in '{}': {}", subdir, e);
                self.emit(LoadEvent::Failed {
                    subdir: subdir.to_string(),
                    stage: "videos".to_string(),
                    message: e.to_string(),
                });
                return Err(e.into());
            }
        };

        let ids: Vec<VideoId> = records.iter().map(|r| r.id.clone()).collect();
        self.store.dispatch(Action::VideoListLoaded(records)).await;

        let report = self.load_details(subdir, ids).await;

        info!(
            "Loaded '{}': {} videos, {} details failed",
            subdir, report.videos, report.details_failed
        );
        self.emit(LoadEvent::Completed {
            subdir: subdir.to_string(),
            videos: report.videos,
            details_failed: report.details_failed,
        });

        Ok(report)
    }

    /// Fetch detail records strictly one after another.
    ///
    /// Fetch `i + 1` is issued only after record `i` has been dispatched, so
    /// at most one detail request is outstanding per chain.
    async fn load_details(&self, subdir: &str, ids: Vec<VideoId>) -> LoadReport {
        let total = ids.len();
        let mut report = LoadReport {
            subdir: subdir.to_string(),
            videos: total,
            details_loaded: 0,
            details_failed: 0,
        };

        for (position, id) in ids.into_iter().enumerate() {
            match self.catalog.get_video(&id).await {
                Ok(record) => {
                    self.store.dispatch(Action::VideoDetailLoaded(record)).await;
                    report.details_loaded += 1;
                    self.emit(LoadEvent::DetailLoaded {
                        subdir: subdir.to_string(),
                        video_id: id.to_string(),
                        position,
                        total,
                    });
                }
                Err(e) => {
                    warn!("Failed to load details for {}: {}", id, e);
                    report.details_failed += 1;
                    self.emit(LoadEvent::DetailFailed {
                        subdir: subdir.to_string(),
                        video_id: id.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Load the subdirectory list and the videos of `subdir` concurrently.
    ///
    /// A failing subdirectory list does not stop the video load; it has
    /// already been reported on the event bus. The result reflects the video
    /// load.
    pub async fn load(&self, subdir: &str) -> Result<LoadReport> {
        let (subdirs, videos) =
            futures::join!(self.load_subdirectories(), self.load_videos(subdir));

        if let Err(e) = subdirs {
            warn!("Continuing without subdirectory list: {}", e);
        }
        videos
    }

    /// Select `name` and load it.
    pub async fn select_and_load(&self, name: &str) -> Result<LoadReport> {
        self.store
            .dispatch(Action::SubdirSelected(name.to_string()))
            .await;
        self.load(name).await
    }

    /// Run [`load`](Self::load) on a background task.
    ///
    /// Earlier loads keep running; see the module docs.
    pub fn spawn_load(&self, subdir: impl Into<String>) -> JoinHandle<Result<LoadReport>> {
        let loader = self.clone();
        let subdir = subdir.into();
        tokio::spawn(async move { loader.load(&subdir).await })
    }
}

impl std::fmt::Debug for SubdirectoryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubdirectoryLoader")
            .field("store", &self.store)
            .finish()
    }
}
