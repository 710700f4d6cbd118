//! Connection Manager (C7)
//!
//! Owns the inbound session lifecycle: `connectTransport` orchestrates C4
//! (filter resolution) through C8 (config view) through C6 (template
//! materialization) and static-server connects, finishing with C9 (capability
//! setup). `disconnectTransport` reverses it. Concurrent connects for the
//! same session id are single-flighted so only one of them does the work.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Notify;
use tracing::{instrument, warn};

use crate::aggregator::config_view::{self, ConfigView};
use crate::aggregator::context::Context;
use crate::aggregator::error::{AggregatorError, AggregatorResult};
use crate::aggregator::pool::{GetOrCreateOptions, InstancePool};
use crate::aggregator::presets::PresetStore;
use crate::aggregator::router::{BackendHandle, Router, SessionCapabilities};
use crate::aggregator::server_config::ServerConfigEntry;
use crate::aggregator::tags::filter::{self, FilterCriteria};
use crate::aggregator::template_manager::{self, TemplateManager};
use crate::proxy::backend::{BackendConfig, BackendConnector};

/// Lifecycle state of one inbound session (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// `connectTransport` is in flight.
    Connecting,
    /// Session is fully set up and routable.
    Connected,
    /// `disconnectTransport` has run (or is running); the session id is
    /// retained only long enough to make repeat disconnects idempotent.
    Disconnected,
}

/// Bookkeeping kept per inbound session once connected.
#[derive(Debug, Clone)]
pub struct InboundSession {
    /// Current lifecycle state.
    pub status: SessionStatus,
}

/// Caller-supplied inputs to `connectTransport` (§4.7).
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Raw filter criteria from the inbound request.
    pub filter: FilterCriteria,
    /// Rendering/namespace context for this session.
    pub context: Context,
    /// Client name/version advertised to every outbound backend.
    pub client_name: String,
    /// Client version advertised to every outbound backend.
    pub client_version: String,
}

/// The full declared server set, split into static and template entries,
/// handed in by the embedder (this crate holds no config-file I/O of its own).
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerViews<'a> {
    /// Statically declared servers.
    pub static_entries: &'a [(String, ServerConfigEntry)],
    /// Template-backed servers.
    pub template_entries: &'a [(String, ServerConfigEntry)],
}

/// Successful `connectTransport` outcome.
#[derive(Debug, Clone)]
pub struct ConnectResult {
    /// The aggregated, namespaced capability set for this session.
    pub capabilities: SessionCapabilities,
    /// Non-fatal warnings accumulated along the way (config-view collisions,
    /// skipped templates, unreachable static servers).
    pub warnings: Vec<String>,
}

struct InFlight {
    notify: Arc<Notify>,
    result: parking_lot::Mutex<Option<Result<ConnectResult, AggregatorError>>>,
}

/// Orchestrates connect/disconnect for inbound sessions (C7).
pub struct ConnectionManager {
    sessions: DashMap<String, InboundSession>,
    in_flight: DashMap<String, Arc<InFlight>>,
    pool: Arc<InstancePool>,
    templates: Arc<TemplateManager>,
    router: Arc<Router>,
    presets: Arc<PresetStore>,
    connect_deadline: Duration,
}

impl ConnectionManager {
    /// A connection manager wired to the shared C5/C6/C9 components and the
    /// preset store used by C4.
    #[must_use]
    pub fn new(
        pool: Arc<InstancePool>,
        templates: Arc<TemplateManager>,
        router: Arc<Router>,
        presets: Arc<PresetStore>,
        connect_deadline: Duration,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            in_flight: DashMap::new(),
            pool,
            templates,
            router,
            presets,
            connect_deadline,
        }
    }

    /// §4.7 `connectTransport`. Single-flighted per `session_id` and bounded
    /// by `connect_deadline`; a second caller racing the same session id
    /// waits for the first's result instead of repeating the work.
    ///
    /// # Errors
    /// Returns [`AggregatorError::InputInvalid`] for unresolvable filter
    /// criteria, [`AggregatorError::BackendUnavailable`] if every backend is
    /// unreachable, and [`AggregatorError::Transient`] if the deadline elapses.
    #[instrument(skip(self, views, opts), fields(session = %session_id))]
    pub async fn connect_transport(
        &self,
        session_id: &str,
        views: ServerViews<'_>,
        opts: &ConnectOptions,
    ) -> AggregatorResult<ConnectResult> {
        if let Some(existing) = self.sessions.get(session_id) {
            if existing.status == SessionStatus::Connected {
                // Idempotent: a repeat connect on an already-connected session
                // just confirms capabilities already in place.
                drop(existing);
                return self.recompute_capabilities_noop(session_id).await;
            }
        }

        // Single-flight: the first caller for a session id does the work and
        // stashes the result; everyone else waits on the same `Notify`.
        let (owner, inflight) = match self.in_flight.entry(session_id.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(e) => (false, Arc::clone(e.get())),
            dashmap::mapref::entry::Entry::Vacant(v) => {
                let inflight = Arc::new(InFlight {
                    notify: Arc::new(Notify::new()),
                    result: parking_lot::Mutex::new(None),
                });
                v.insert(Arc::clone(&inflight));
                (true, inflight)
            }
        };

        if !owner {
            // Check-register-check: the owner may finish (set `result` and
            // call `notify_waiters`) between our clone of `inflight` and our
            // first poll of `notified()`, in which case a plain `.await`
            // would register after the notification fires and hang forever.
            if let Some(result) = inflight.result.lock().clone() {
                return result;
            }
            let notified = inflight.notify.notified();
            if let Some(result) = inflight.result.lock().clone() {
                return result;
            }
            notified.await;
            let result = inflight.result.lock().clone();
            return result.unwrap_or_else(|| Err(AggregatorError::Transient("in-flight connect produced no result".to_string())));
        }

        self.sessions.insert(session_id.to_string(), InboundSession { status: SessionStatus::Connecting });

        let outcome = match tokio::time::timeout(self.connect_deadline, self.do_connect(session_id, views, opts)).await {
            Ok(result) => result,
            Err(_) => Err(AggregatorError::Transient(format!(
                "connect for session '{session_id}' exceeded {:?}",
                self.connect_deadline
            ))),
        };

        match &outcome {
            Ok(_) => {
                if let Some(mut entry) = self.sessions.get_mut(session_id) {
                    entry.status = SessionStatus::Connected;
                }
            }
            Err(_) => {
                self.sessions.remove(session_id);
            }
        }

        *inflight.result.lock() = Some(outcome.clone());
        inflight.notify.notify_waiters();
        self.in_flight.remove(session_id);

        outcome
    }

    async fn recompute_capabilities_noop(&self, session_id: &str) -> AggregatorResult<ConnectResult> {
        if self.router.has_session(session_id) {
            Ok(ConnectResult {
                capabilities: SessionCapabilities::default(),
                warnings: vec!["session already connected".to_string()],
            })
        } else {
            Err(AggregatorError::NotFound(format!("session '{session_id}'")))
        }
    }

    async fn do_connect(
        &self,
        session_id: &str,
        views: ServerViews<'_>,
        opts: &ConnectOptions,
    ) -> AggregatorResult<ConnectResult> {
        // C4: resolve the session's raw filter criteria into a tag query.
        let filter_query = filter::resolve_filter(&opts.filter, &self.presets)?;

        // C8: split static vs. template, drop colliding statics.
        let view_result = config_view::materialize(views.static_entries, views.template_entries, &filter_query);
        let ConfigView {
            static_servers,
            template_servers,
        } = view_result.view;
        let mut warnings = view_result.warnings;

        let pool_opts = GetOrCreateOptions {
            client_name: opts.client_name.clone(),
            client_version: opts.client_version.clone(),
        };

        // C6: materialize template-backed instances and fetch their connectors.
        let create_result = self
            .templates
            .create_template_based_servers(session_id, &opts.context, &filter_query, &template_servers, &pool_opts)
            .await;
        for (name, err) in &create_result.skipped {
            warnings.push(format!("template '{name}' skipped: {err}"));
        }

        let mut backends = Vec::new();
        for entry in &create_result.entries {
            match self.pool.client(&entry.outbound_key) {
                Some(connector) => backends.push(BackendHandle {
                    name: entry.template_name.clone(),
                    connector,
                }),
                None => warnings.push(format!(
                    "template '{}' pooled instance '{}' vanished before capability setup",
                    entry.template_name, entry.outbound_key
                )),
            }
        }

        // Static servers connect directly; they are not pool-managed.
        for (name, cfg) in &static_servers {
            match Self::connect_static(name, cfg, opts).await {
                Ok(connector) => backends.push(BackendHandle {
                    name: name.clone(),
                    connector: Arc::new(connector),
                }),
                Err(err) => {
                    warn!(server = %name, error = %err, "static server unreachable, skipping");
                    warnings.push(format!("static server '{name}' unavailable: {err}"));
                }
            }
        }

        // C9: aggregate namespaced capabilities and register the session view.
        let capabilities = self.router.setup_capabilities(session_id, backends).await?;

        Ok(ConnectResult { capabilities, warnings })
    }

    async fn connect_static(
        name: &str,
        cfg: &ServerConfigEntry,
        opts: &ConnectOptions,
    ) -> AggregatorResult<BackendConnector> {
        let backend_config = BackendConfig {
            transport: template_manager::to_backend_transport(&cfg.transport),
            client_name: opts.client_name.clone(),
            client_version: opts.client_version.clone(),
        };
        BackendConnector::new(backend_config).await.map_err(|e| AggregatorError::BackendUnavailable {
            backend: name.to_string(),
            message: e.to_string(),
        })
    }

    /// §4.7 `disconnectTransport`. Idempotent: disconnecting an unknown or
    /// already-disconnected session is a no-op.
    #[instrument(skip(self), fields(session = %session_id))]
    pub fn disconnect_transport(&self, session_id: &str) {
        if self.sessions.remove(session_id).is_none() {
            return;
        }
        self.templates.cleanup_template_servers(session_id);
        // Static connections held no pool entry; dropping the `BackendHandle`
        // inside the router's session view is their only cleanup.
        self.router.teardown_session(session_id);
    }

    /// Tear down every tracked session (shutdown path); does not touch the
    /// pool or template manager's own shutdown, which the facade drives.
    pub fn cleanup(&self) {
        let ids: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            self.disconnect_transport(&id);
        }
    }

    /// Whether `session_id` is currently connected.
    #[must_use]
    pub fn is_connected(&self, session_id: &str) -> bool {
        self.sessions.get(session_id).is_some_and(|s| s.status == SessionStatus::Connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::pool::PoolConfig;

    fn manager() -> ConnectionManager {
        let pool = Arc::new(InstancePool::new(PoolConfig::default()));
        let templates = Arc::new(TemplateManager::new(Arc::clone(&pool)));
        let router = Arc::new(Router::new());
        let presets = Arc::new(PresetStore::new());
        ConnectionManager::new(pool, templates, router, presets, Duration::from_secs(30))
    }

    #[tokio::test]
    async fn connect_with_empty_views_produces_connected_session() {
        let manager = manager();
        let views = ServerViews::default();
        let opts = ConnectOptions {
            client_name: "gateway".to_string(),
            client_version: "0.0.0".to_string(),
            ..Default::default()
        };
        let result = manager.connect_transport("s1", views, &opts).await.unwrap();
        assert!(result.capabilities.tools.is_empty());
        assert!(manager.is_connected("s1"));
    }

    #[tokio::test]
    async fn duplicate_connect_is_idempotent() {
        let manager = manager();
        let opts = ConnectOptions::default();
        manager.connect_transport("s1", ServerViews::default(), &opts).await.unwrap();
        let second = manager.connect_transport("s1", ServerViews::default(), &opts).await.unwrap();
        assert!(second.warnings.iter().any(|w| w.contains("already connected")));
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let manager = manager();
        manager.connect_transport("s1", ServerViews::default(), &ConnectOptions::default()).await.unwrap();
        manager.disconnect_transport("s1");
        manager.disconnect_transport("s1");
        assert!(!manager.is_connected("s1"));
    }

    #[tokio::test]
    async fn concurrent_connects_single_flight_to_one_result() {
        let manager = Arc::new(manager());
        let opts = Arc::new(ConnectOptions::default());

        let m1 = Arc::clone(&manager);
        let o1 = Arc::clone(&opts);
        let h1 = tokio::spawn(async move { m1.connect_transport("s1", ServerViews::default(), &o1).await });
        let m2 = Arc::clone(&manager);
        let o2 = Arc::clone(&opts);
        let h2 = tokio::spawn(async move { m2.connect_transport("s1", ServerViews::default(), &o2).await });

        let (r1, r2) = tokio::join!(h1, h2);
        assert!(r1.unwrap().is_ok());
        assert!(r2.unwrap().is_ok());
    }

    #[tokio::test]
    async fn unresolvable_preset_filter_fails_connect() {
        let manager = manager();
        let opts = ConnectOptions {
            filter: FilterCriteria {
                tag_filter_mode: Some(crate::aggregator::tags::filter::TagFilterMode::Preset),
                preset_name: Some("missing".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = manager.connect_transport("s1", ServerViews::default(), &opts).await.unwrap_err();
        assert!(matches!(err, AggregatorError::NotFound(_)));
        assert!(!manager.is_connected("s1"));
    }
}
