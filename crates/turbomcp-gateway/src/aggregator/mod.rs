//! Multi-tenant aggregating proxy core.
//!
//! Nine components (C1-C9) composed into one [`Aggregator`] facade:
//! template variable extraction and rendering (`template`), tag query
//! evaluation and filtering (`tags`), the outbound instance pool (`pool`),
//! the template server manager (`template_manager`), the inbound connection
//! manager (`connection`), the config view (`config_view`), and the
//! capability aggregator/router (`router`). `context`, `presets`, `urls`,
//! and `error` are supporting modules shared across the above.

pub mod config_view;
pub mod connection;
pub mod context;
pub mod error;
pub mod pool;
pub mod presets;
pub mod router;
pub mod server_config;
pub mod tags;
pub mod template;
pub mod template_manager;
pub mod urls;

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::AggregatorConfig;

pub use connection::{ConnectOptions, ConnectResult, ConnectionManager, ServerViews};
pub use error::{AggregatorError, AggregatorResult};
pub use presets::{Preset, PresetStore};
pub use router::SessionCapabilities;
pub use server_config::{ServerConfigEntry, TemplatePolicy, TransportConfig};

/// Top-level facade gluing C1-C9 together.
///
/// Constructed once per embedder process with an explicit [`AggregatorConfig`]
/// and [`PresetStore`] handle (§9 "Singletons"); holds no process-wide statics.
pub struct Aggregator {
    pool: Arc<pool::InstancePool>,
    templates: Arc<template_manager::TemplateManager>,
    router: Arc<router::Router>,
    presets: Arc<PresetStore>,
    connections: ConnectionManager,
    config: AggregatorConfig,
    sweep_handles: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl Aggregator {
    /// Build a new aggregator. Does not spawn any background tasks; call
    /// [`Aggregator::spawn_background_tasks`] once the returned `Arc` is in
    /// place for embedders that want the periodic idle sweeps running.
    #[must_use]
    pub fn new(config: AggregatorConfig, presets: Arc<PresetStore>) -> Arc<Self> {
        let pool = Arc::new(pool::InstancePool::new(config.pool_config()));
        let templates = Arc::new(template_manager::TemplateManager::new(Arc::clone(&pool)));
        let router = Arc::new(router::Router::new());
        let connections = ConnectionManager::new(
            Arc::clone(&pool),
            Arc::clone(&templates),
            Arc::clone(&router),
            Arc::clone(&presets),
            config.connect_deadline,
        );

        Arc::new(Self {
            pool,
            templates,
            router,
            presets,
            connections,
            config,
            sweep_handles: parking_lot::Mutex::new(Vec::new()),
        })
    }

    /// Spawn the pool's idle sweep and the template manager's belt-and-braces
    /// sweep at their configured cadences. Idempotent only in the sense that
    /// calling it twice spawns a second pair of tasks; embedders should call
    /// it exactly once after construction.
    pub fn spawn_background_tasks(self: &Arc<Self>) {
        let pool_handle = self.pool.spawn_periodic_sweep(self.config.cleanup_interval);
        let template_handle = self.templates.spawn_periodic_sweep(self.config.idle_sweep_interval);
        let mut handles = self.sweep_handles.lock();
        handles.push(pool_handle);
        handles.push(template_handle);
    }

    /// The connection manager (C7), for driving `connectTransport` /
    /// `disconnectTransport` from an embedder's transport layer.
    #[must_use]
    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    /// The capability router (C9), for forwarding tool/resource/prompt
    /// calls and subscribing to `list_changed` notifications.
    #[must_use]
    pub fn router(&self) -> &router::Router {
        &self.router
    }

    /// The outbound instance pool (C5), for observability (`stats()`).
    #[must_use]
    pub fn pool(&self) -> &pool::InstancePool {
        &self.pool
    }

    /// The preset store (C4 dependency), for the embedder's preset
    /// management surface.
    #[must_use]
    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    /// Stop background tasks, tear down every inbound session, and close
    /// every pooled outbound instance. No signal handling happens inside
    /// this crate (§1); an embedder's own signal handler calls this.
    pub async fn shutdown(&self) {
        let handles = {
            let mut guard = self.sweep_handles.lock();
            std::mem::take(&mut *guard)
        };
        for handle in handles {
            handle.abort();
        }
        self.connections.cleanup();
        self.pool.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn facade_constructs_and_shuts_down_cleanly() {
        let aggregator = Aggregator::new(AggregatorConfig::default(), Arc::new(PresetStore::new()));
        aggregator.spawn_background_tasks();
        let opts = ConnectOptions::default();
        let result = aggregator
            .connections()
            .connect_transport("s1", ServerViews::default(), &opts)
            .await
            .unwrap();
        assert!(result.capabilities.tools.is_empty());
        aggregator.shutdown().await;
    }
}
