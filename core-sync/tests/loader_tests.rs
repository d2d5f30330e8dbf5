//! Integration tests for subdirectory loading
//!
//! These tests verify:
//! - Detail fetches are issued one at a time, in list order
//! - Each detail record is applied before the next fetch starts
//! - A failed detail fetch is reported and skipped
//! - List loads are independent of each other
//! - Late detail records from a superseded list are ignored

use async_trait::async_trait;
use core_library::{
    Action, AppState, CatalogService, LibraryError, SubdirectoryInfo, VideoId, VideoMeta,
    VideoRecord,
};
use core_runtime::events::{CoreEvent, EventBus, LoadEvent};
use core_sync::{LoadReport, Store, SubdirectoryLoader};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

// ============================================================================
// Fake catalog
// ============================================================================

#[derive(Default)]
struct FakeCatalog {
    subdirs: Vec<SubdirectoryInfo>,
    fail_subdirs: bool,
    lists: HashMap<String, Vec<VideoRecord>>,
    failing_details: HashSet<String>,
    /// Dispatch this list from inside the detail fetch of `(id, list)`
    replace_list_during: Option<(String, Vec<VideoRecord>)>,

    store: OnceLock<Arc<Store>>,
    detail_calls: Mutex<Vec<String>>,
    /// Detailed records visible in the store when each fetch was issued
    detailed_at_call: Mutex<Vec<usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeCatalog {
    fn with_list(mut self, subdir: &str, ids: &[&str]) -> Self {
        self.lists.insert(
            subdir.to_string(),
            ids.iter().map(|id| listed(subdir, id)).collect(),
        );
        self
    }

    fn calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }
}

fn listed(subdir: &str, id: &str) -> VideoRecord {
    VideoRecord::new(id, format!("{subdir}/{id}.mp4"), subdir, format!("{id}.mp4"))
}

fn server_error(message: &str) -> LibraryError {
    LibraryError::CatalogStatus {
        status_code: 500,
        message: message.to_string(),
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn list_subdirectories(&self) -> core_library::Result<Vec<SubdirectoryInfo>> {
        if self.fail_subdirs {
            return Err(server_error("subdirs unavailable"));
        }
        Ok(self.subdirs.clone())
    }

    async fn list_videos(&self, subdir: &str) -> core_library::Result<Vec<VideoRecord>> {
        self.lists
            .get(subdir)
            .cloned()
            .ok_or_else(|| server_error("no such subdirectory"))
    }

    async fn get_video(&self, id: &VideoId) -> core_library::Result<VideoRecord> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.detail_calls.lock().unwrap().push(id.to_string());

        if let Some(store) = self.store.get() {
            let detailed = store
                .read(|state| state.videos.iter().filter(|r| r.is_detailed()).count())
                .await;
            self.detailed_at_call.lock().unwrap().push(detailed);

            if let Some((trigger, list)) = &self.replace_list_during {
                if trigger == id.as_str() {
                    store.dispatch(Action::VideoListLoaded(list.clone())).await;
                }
            }
        }

        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_details.contains(id.as_str()) {
            return Err(server_error("ffprobe crashed"));
        }

        let subdir = self
            .lists
            .iter()
            .find(|(_, records)| records.iter().any(|r| &r.id == id))
            .map(|(subdir, _)| subdir.clone())
            .unwrap_or_default();
        Ok(listed(&subdir, id.as_str()).with_meta(VideoMeta {
            title: Some(format!("Title of {id}")),
            ..VideoMeta::default()
        }))
    }

    async fn preview_relpath(&self, _id: &VideoId, _template: &str) -> core_library::Result<String> {
        unimplemented!("not used by the loader")
    }

    async fn update_relpath(&self, _id: &VideoId, _relpath: &str) -> core_library::Result<String> {
        unimplemented!("not used by the loader")
    }

    async fn delete_video(&self, _id: &VideoId) -> core_library::Result<()> {
        unimplemented!("not used by the loader")
    }

    async fn create_video(&self, _url: &str, _subdir: &str) -> core_library::Result<Value> {
        unimplemented!("not used by the loader")
    }

    async fn probe_video(&self, _id: &VideoId) -> core_library::Result<Value> {
        unimplemented!("not used by the loader")
    }
}

fn setup(catalog: FakeCatalog) -> (SubdirectoryLoader, Arc<Store>, Arc<FakeCatalog>) {
    let store = Arc::new(Store::new(AppState::default(), Arc::new(EventBus::new(256))));
    let catalog = Arc::new(catalog);
    catalog.store.set(Arc::clone(&store)).ok();
    let loader = SubdirectoryLoader::new(catalog.clone(), Arc::clone(&store));
    (loader, store, catalog)
}

fn drain(events: &mut tokio::sync::broadcast::Receiver<CoreEvent>) -> Vec<LoadEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CoreEvent::Load(e) = event {
            out.push(e);
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_detail_chain_is_sequential_and_ordered() {
    let (loader, store, catalog) =
        setup(FakeCatalog::default().with_list("unsorted", &["a", "b", "c", "d"]));

    let report = loader.load_videos("unsorted").await.unwrap();

    assert_eq!(
        report,
        LoadReport {
            subdir: "unsorted".to_string(),
            videos: 4,
            details_loaded: 4,
            details_failed: 0,
        }
    );
    assert_eq!(catalog.calls(), vec!["a", "b", "c", "d"]);
    assert_eq!(*catalog.detailed_at_call.lock().unwrap(), vec![0, 1, 2, 3]);
    assert_eq!(catalog.max_in_flight.load(Ordering::SeqCst), 1);

    let state = store.snapshot().await;
    assert!(state.videos.iter().all(VideoRecord::is_detailed));
    assert_eq!(state.videos.records()[2].title(), Some("Title of c"));
}

#[tokio::test]
async fn test_empty_list_issues_no_detail_fetch() {
    let (loader, store, catalog) = setup(FakeCatalog::default().with_list("empty", &[]));

    let report = loader.load_videos("empty").await.unwrap();

    assert_eq!(report.videos, 0);
    assert!(catalog.calls().is_empty());
    assert!(store.snapshot().await.videos.is_empty());
}

#[tokio::test]
async fn test_failed_detail_is_skipped() {
    let mut catalog = FakeCatalog::default().with_list("unsorted", &["a", "b", "c"]);
    catalog.failing_details.insert("b".to_string());
    let (loader, store, catalog) = setup(catalog);
    let mut events = store.event_bus().subscribe();

    let report = loader.load_videos("unsorted").await.unwrap();

    assert_eq!(report.details_loaded, 2);
    assert_eq!(report.details_failed, 1);
    assert_eq!(catalog.calls(), vec!["a", "b", "c"]);

    let state = store.snapshot().await;
    assert!(state.videos.get(&"a".into()).unwrap().is_detailed());
    assert!(state.videos.get(&"b".into()).unwrap().meta.is_none());
    assert!(state.videos.get(&"c".into()).unwrap().is_detailed());

    let load_events = drain(&mut events);
    assert!(load_events.iter().any(|e| matches!(
        e,
        LoadEvent::DetailFailed { video_id, .. } if video_id == "b"
    )));
    assert!(matches!(
        load_events.last(),
        Some(LoadEvent::Completed {
            videos: 3,
            details_failed: 1,
            ..
        })
    ));
}

#[tokio::test]
async fn test_load_applies_subdirs_and_videos() {
    let mut catalog = FakeCatalog::default().with_list("talks", &["x", "y"]);
    catalog.subdirs = vec![SubdirectoryInfo::new("talks"), SubdirectoryInfo::new("unsorted")];
    let (loader, store, _catalog) = setup(catalog);

    let report = loader.select_and_load("talks").await.unwrap();

    assert_eq!(report.videos, 2);
    let state = store.snapshot().await;
    assert_eq!(state.current_subdir, "talks");
    assert_eq!(state.all_subdirs.len(), 2);
    assert_eq!(state.videos.len(), 2);
}

#[tokio::test]
async fn test_subdir_failure_does_not_block_videos() {
    let mut catalog = FakeCatalog::default().with_list("unsorted", &["a"]);
    catalog.fail_subdirs = true;
    let (loader, store, _catalog) = setup(catalog);
    let mut events = store.event_bus().subscribe();

    let report = loader.load("unsorted").await.unwrap();

    assert_eq!(report.details_loaded, 1);
    let state = store.snapshot().await;
    assert!(state.all_subdirs.is_empty());
    assert_eq!(state.videos.len(), 1);
    assert!(drain(&mut events).iter().any(|e| matches!(
        e,
        LoadEvent::Failed { stage, .. } if stage == "subdirectories"
    )));
}

#[tokio::test]
async fn test_video_list_failure_keeps_previous_state() {
    let mut catalog = FakeCatalog::default().with_list("unsorted", &["a"]);
    catalog.subdirs = vec![SubdirectoryInfo::new("unsorted")];
    let (loader, store, _catalog) = setup(catalog);
    loader.load_videos("unsorted").await.unwrap();

    assert!(loader.load("missing").await.is_err());

    let state = store.snapshot().await;
    assert_eq!(state.videos.len(), 1);
    assert_eq!(state.all_subdirs.len(), 1);
}

#[tokio::test]
async fn test_stale_chain_details_are_ignored() {
    let mut catalog = FakeCatalog::default().with_list("old", &["a", "b", "c"]);
    catalog.replace_list_during = Some((
        "a".to_string(),
        vec![listed("new", "x"), listed("new", "y")],
    ));
    let (loader, store, catalog) = setup(catalog);

    let report = loader.load_videos("old").await.unwrap();

    // The old chain ran to completion without cancellation
    assert_eq!(catalog.calls(), vec!["a", "b", "c"]);
    assert_eq!(report.details_loaded, 3);

    let state = store.snapshot().await;
    let ids: Vec<_> = state.videos.ids().map(VideoId::as_str).collect();
    assert_eq!(ids, vec!["x", "y"]);
    assert!(state.videos.iter().all(|r| r.meta.is_none()));
    assert!(state.videos.is_index_consistent());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_spawn_load_runs_in_background() {
    let (loader, store, _catalog) =
        setup(FakeCatalog::default().with_list("unsorted", &["a", "b"]));

    let handle = loader.spawn_load("unsorted");
    let report = handle.await.unwrap().unwrap();

    assert_eq!(report.details_loaded, 2);
    assert_eq!(store.snapshot().await.videos.len(), 2);
}
