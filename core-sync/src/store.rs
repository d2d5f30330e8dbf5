//! # State Store
//!
//! Owns the [`AppState`] and is its only writer.
//!
//! Every transition goes through [`Store::dispatch`], which runs the reducer
//! under the write lock, bumps the revision and publishes
//! `LibraryEvent::StateChanged`. Readers take cloned snapshots.

use core_library::models::{VideoId, VideoRecord};
use core_library::reducer::{reduce, Action, AppState, TaggedEvent};
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

pub struct Store {
    state: RwLock<AppState>,
    revision: AtomicU64,
    event_bus: Arc<EventBus>,
}

impl Store {
    pub fn new(initial: AppState, event_bus: Arc<EventBus>) -> Self {
        Self {
            state: RwLock::new(initial),
            revision: AtomicU64::new(0),
            event_bus,
        }
    }

    /// Apply `action` and return the resulting revision.
    pub async fn dispatch(&self, action: Action) -> u64 {
        let tag = action.tag();

        let revision = {
            let mut state = self.state.write().await;
            let current = std::mem::take(&mut *state);
            *state = reduce(current, action);
            self.revision.fetch_add(1, Ordering::SeqCst) + 1
        };

        debug!(action = tag, revision, "state updated");
        self.event_bus
            .emit(CoreEvent::Library(LibraryEvent::StateChanged {
                revision,
                action: tag.to_string(),
            }))
            .ok();

        revision
    }

    /// Apply an externally tagged event.
    ///
    /// # Panics
    ///
    /// Panics when the tag names no known transition or its payload does not
    /// match the transition. Both mean the caller is out of sync with this
    /// crate, and carrying on would render a state nobody asked for.
    pub async fn dispatch_tagged(&self, event: TaggedEvent) -> u64 {
        match Action::try_from(event) {
            Ok(action) => self.dispatch(action).await,
            Err(e) => {
                error!("Rejected tagged event: {}", e);
                panic!("{}", e);
            }
        }
    }

    /// Cloned copy of the current state.
    pub async fn snapshot(&self) -> AppState {
        self.state.read().await.clone()
    }

    /// Run `f` against the current state without cloning it.
    pub async fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let state = self.state.read().await;
        f(&state)
    }

    pub async fn video(&self, id: &VideoId) -> Option<VideoRecord> {
        self.read(|state| state.videos.get(id).cloned()).await
    }

    pub async fn current_subdir(&self) -> String {
        self.read(|state| state.current_subdir.clone()).await
    }

    /// Number of transitions applied so far.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("revision", &self.revision())
            .finish()
    }
}
