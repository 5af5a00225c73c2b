//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::RelayConfig;
use crate::domain::{ConnectionRegistry, StateMirror};
use crate::sequence::CommandSink;
use crate::service::{Dispatcher, Sequencer};

/// Renderer settings editable from the admin endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminConfig {
    /// Remote `.riv` file URL; `None` means the renderer's bundled asset.
    pub rive_url: Option<String>,
    /// UI theme name.
    pub theme: String,
    /// Whether the renderer reconnects automatically.
    pub auto_connect: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            rive_url: None,
            theme: "dark".to_string(),
            auto_connect: true,
        }
    }
}

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Immutable startup configuration.
    pub config: Arc<RelayConfig>,
    /// Every accepted connection and its role.
    pub registry: Arc<ConnectionRegistry>,
    /// Command delivery and state mirroring.
    pub dispatcher: Arc<Dispatcher>,
    /// Named sequence runner.
    pub sequencer: Arc<Sequencer>,
    /// Admin-editable renderer settings.
    pub admin: Arc<RwLock<AdminConfig>>,
}

impl AppState {
    /// Wires the registry, mirror, dispatcher and sequencer together.
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        let mirror = Arc::new(StateMirror::new());
        let registry = Arc::new(ConnectionRegistry::new(Arc::clone(&mirror)));
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry), mirror));
        let sink: Arc<dyn CommandSink> = Arc::clone(&dispatcher) as Arc<dyn CommandSink>;
        let sequencer = Arc::new(Sequencer::new(sink, config.shutdown_timeout));
        Self {
            config: Arc::new(config),
            registry,
            dispatcher,
            sequencer,
            admin: Arc::new(RwLock::new(AdminConfig::default())),
        }
    }
}
