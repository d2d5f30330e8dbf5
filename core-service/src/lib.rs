//! Core service façade and bootstrap helpers.
//!
//! This crate wires the host-provided HTTP bridge, the catalog connector, the
//! state store and the loader into one handle. Desktop apps typically enable
//! the `desktop-shims` feature, which lets `CoreConfig` fall back to the
//! reqwest-based client from `bridge-desktop`.
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_service::CoreService;
//!
//! let config = CoreConfig::builder().base_url("http://localhost:8088").build()?;
//! let core = CoreService::new(config)?;
//! core.mount().await?;
//! let state = core.store().snapshot().await;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use core_library::catalog::CatalogService;
use core_library::models::VideoId;
use core_library::reducer::AppState;
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, EventStream, RequestEvent, RequestOperation};
use core_runtime::logging::redact_url;
use core_sync::{LoadReport, Store, SubdirectoryLoader, VideoController};
use provider_catalog::CatalogConnector;
use serde_json::Value;
use tracing::{info, instrument, warn};

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<CoreConfig>,
    catalog: Arc<dyn CatalogService>,
    store: Arc<Store>,
    event_bus: Arc<EventBus>,
    loader: SubdirectoryLoader,
}

impl CoreService {
    /// Create a service talking to the catalog at `config.base_url`.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;
        let catalog: Arc<dyn CatalogService> = Arc::new(CatalogConnector::from_config(&config));
        Ok(Self::with_catalog(config, catalog))
    }

    /// Create a service over an existing catalog implementation.
    pub fn with_catalog(config: CoreConfig, catalog: Arc<dyn CatalogService>) -> Self {
        let event_bus = Arc::new(EventBus::new(config.event_buffer_size));
        let store = Arc::new(Store::new(
            AppState::new(config.default_subdir.clone()),
            Arc::clone(&event_bus),
        ));
        let loader = SubdirectoryLoader::new(Arc::clone(&catalog), Arc::clone(&store));

        Self {
            config: Arc::new(config),
            catalog,
            store,
            event_bus,
            loader,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn loader(&self) -> &SubdirectoryLoader {
        &self.loader
    }

    /// Subscribe to state, load and request notifications.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    /// Controller for rename/move/delete of one video.
    pub fn controller(&self, video_id: impl Into<VideoId>) -> VideoController {
        VideoController::new(
            video_id.into(),
            Arc::clone(&self.catalog),
            Arc::clone(&self.store),
        )
    }

    /// Load the configured default subdirectory.
    pub async fn mount(&self) -> Result<LoadReport> {
        info!("Mounting '{}'", self.config.default_subdir);
        Ok(self
            .loader
            .select_and_load(&self.config.default_subdir)
            .await?)
    }

    /// Ask the server to download `url` into `subdir`.
    ///
    /// The new video shows up on the next load of `subdir`.
    #[instrument(skip(self, url), fields(source = %redact_url(url)))]
    pub async fn add_video(&self, url: &str, subdir: &str) -> Result<Value> {
        match self.catalog.create_video(url, subdir).await {
            Ok(info) => {
                self.report(RequestEvent::Succeeded {
                    operation: RequestOperation::Create,
                    video_id: info.get("id").and_then(Value::as_str).map(str::to_string),
                });
                Ok(info)
            }
            Err(e) => {
                warn!("Download request failed: {}", e);
                self.report(RequestEvent::Failed {
                    operation: RequestOperation::Create,
                    video_id: None,
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Stream and format information for a video file.
    pub async fn probe_video(&self, video_id: impl Into<VideoId>) -> Result<Value> {
        let video_id = video_id.into();
        self.catalog.probe_video(&video_id).await.map_err(|e| {
            warn!("Probe failed for {}: {}", video_id, e);
            self.report(RequestEvent::Failed {
                operation: RequestOperation::Probe,
                video_id: Some(video_id.to_string()),
                message: e.to_string(),
            });
            e.into()
        })
    }

    fn report(&self, event: RequestEvent) {
        self.event_bus.emit(CoreEvent::Request(event)).ok();
    }
}
