//! # Event Bus System
//!
//! Notifies the presentation layer about state changes and request outcomes
//! using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The store publishes a [`LibraryEvent::StateChanged`] after every reducer
//! transition; the presentation layer re-reads the snapshot when it sees one.
//! Loaders and controllers publish [`LoadEvent`]s and [`RequestEvent`]s so a
//! UI can show progress and ephemeral failure indicators without the state
//! itself carrying any error fields.
//!
//! ```text
//! ┌─────────────┐     emit      ┌───────────┐
//! │    Store    ├──────────────>│           │
//! └─────────────┘               │           │     subscribe    ┌──────────────┐
//! ┌─────────────┐     emit      │ EventBus  ├─────────────────>│ Presentation │
//! │   Loader    ├──────────────>│ (broadcast│                  └──────────────┘
//! └─────────────┘               │  channel) │
//! ┌─────────────┐     emit      │           │
//! │ Controllers ├──────────────>│           │
//! └─────────────┘               └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Library(LibraryEvent::StateChanged {
//!         revision: 1,
//!         action: "SUBDIR_SELECTED".to_string(),
//!     }))
//!     .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Library state changed");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Non-fatal;
//!   a UI should simply re-read the latest snapshot.
//! - **`RecvError::Closed`**: all senders have been dropped (shutdown).
//!
//! Emitting with no subscribers returns an error; publishers ignore it.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Local state transitions
    Library(LibraryEvent),
    /// Subdirectory load progress
    Load(LoadEvent),
    /// Outcome of a user-initiated request
    Request(RequestEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Library(e) => e.description(),
            CoreEvent::Load(e) => e.description(),
            CoreEvent::Request(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Request(RequestEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Load(LoadEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Load(LoadEvent::DetailFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Load(LoadEvent::Completed { .. }) => EventSeverity::Info,
            CoreEvent::Request(RequestEvent::Succeeded { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Library Events
// ============================================================================

/// Emitted by the store after each reducer transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LibraryEvent {
    /// A transition was applied.
    StateChanged {
        /// Monotonic revision of the state after the transition.
        revision: u64,
        /// Tag of the action that produced it.
        action: String,
    },
}

impl LibraryEvent {
    fn description(&self) -> &str {
        match self {
            LibraryEvent::StateChanged { .. } => "Library state changed",
        }
    }
}

// ============================================================================
// Load Events
// ============================================================================

/// Progress of a subdirectory load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LoadEvent {
    /// Video list requested for a subdirectory.
    Started { subdir: String },
    /// One detail record was applied.
    DetailLoaded {
        subdir: String,
        video_id: String,
        position: usize,
        total: usize,
    },
    /// One detail fetch failed; the chain continues.
    DetailFailed {
        subdir: String,
        video_id: String,
        message: String,
    },
    /// Detail chain finished.
    Completed {
        subdir: String,
        videos: usize,
        details_failed: usize,
    },
    /// A list request failed.
    Failed {
        subdir: String,
        /// `"subdirectories"` or `"videos"`.
        stage: String,
        message: String,
    },
}

impl LoadEvent {
    fn description(&self) -> &str {
        match self {
            LoadEvent::Started { .. } => "Subdirectory load started",
            LoadEvent::DetailLoaded { .. } => "Video details loaded",
            LoadEvent::DetailFailed { .. } => "Video details failed to load",
            LoadEvent::Completed { .. } => "Subdirectory load completed",
            LoadEvent::Failed { .. } => "Subdirectory load failed",
        }
    }
}

// ============================================================================
// Request Events
// ============================================================================

/// User-initiated catalog operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequestOperation {
    Preview,
    Rename,
    Move,
    Delete,
    Create,
    Probe,
}

impl fmt::Display for RequestOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestOperation::Preview => "preview",
            RequestOperation::Rename => "rename",
            RequestOperation::Move => "move",
            RequestOperation::Delete => "delete",
            RequestOperation::Create => "create",
            RequestOperation::Probe => "probe",
        };
        f.write_str(name)
    }
}

/// Outcome of a request; failures drive transient UI feedback only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum RequestEvent {
    Succeeded {
        operation: RequestOperation,
        video_id: Option<String>,
    },
    Failed {
        operation: RequestOperation,
        video_id: Option<String>,
        message: String,
    },
}

impl RequestEvent {
    fn description(&self) -> &str {
        match self {
            RequestEvent::Succeeded { .. } => "Request succeeded",
            RequestEvent::Failed { .. } => "Request failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus yields another handle to the same channel. Slow
/// subscribers get `RecvError::Lagged` instead of blocking publishers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; `CoreConfig` validation rejects that.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let failures = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Request(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without waiting.
    ///
    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
