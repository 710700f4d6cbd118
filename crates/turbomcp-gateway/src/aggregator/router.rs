//! Capability Aggregator & Router (C9)
//!
//! Builds each session's namespaced view over every backend it can reach
//! (template-backed or static), routes inbound tool/resource/prompt calls
//! back to the owning backend, and fans out `list_changed` notifications.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{instrument, warn};

use crate::aggregator::error::{AggregatorError, AggregatorResult};
use crate::proxy::backend::BackendConnector;
use turbomcp_protocol::types::{Prompt, Resource, Tool};

/// Depth of the per-session fan-out channel (§9 "Channels"). Excess
/// notifications are dropped oldest-first, which is exactly
/// `tokio::sync::broadcast`'s ring-buffer behavior.
const NOTIFICATION_CAPACITY: usize = 64;

/// A backend reachable by one session, already connected.
#[derive(Clone)]
pub struct BackendHandle {
    /// Namespace for this backend's capabilities in the aggregated view
    /// (the template name, or the static server name).
    pub name: String,
    /// The connected backend client.
    pub connector: Arc<BackendConnector>,
}

/// A `list_changed`-style fan-out event.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Which capability kind changed.
    pub kind: CapabilityKind,
    /// Namespace (backend name) the change originated from.
    pub backend: String,
}

/// The three capability kinds the router aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    /// Tools.
    Tools,
    /// Resources.
    Resources,
    /// Prompts.
    Prompts,
}

/// Namespaced capability names advertised for one session, for informing
/// the inbound handler server's capability advertisement.
#[derive(Debug, Clone, Default)]
pub struct SessionCapabilities {
    /// Namespaced tools, in backend-declaration order.
    pub tools: Vec<Tool>,
    /// Namespaced resources.
    pub resources: Vec<Resource>,
    /// Namespaced prompts.
    pub prompts: Vec<Prompt>,
}

struct SessionView {
    backends: HashMap<String, Arc<BackendConnector>>,
    tools: HashMap<String, (String, String)>,
    resources: HashMap<String, (String, String)>,
    prompts: HashMap<String, (String, String)>,
}

/// Join a backend namespace and a capability name into its aggregated
/// name. Kept as a single function so every caller agrees on the
/// separator.
fn namespaced(backend: &str, name: &str) -> String {
    format!("{backend}__{name}")
}

/// Aggregates backend capabilities into per-session namespaced views and
/// routes calls back to their owning backend.
pub struct Router {
    sessions: DashMap<String, SessionView>,
    notifiers: DashMap<String, broadcast::Sender<Notification>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// An empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            notifiers: DashMap::new(),
        }
    }

    /// §4.9 `setupCapabilities`. Backends are visited in `backends`' order;
    /// a name collision (two backends exposing the same tool/resource/
    /// prompt name) is resolved by keeping the first backend seen, which
    /// is the declaration order C4/C6 already established.
    ///
    /// # Errors
    /// Returns [`AggregatorError::BackendUnavailable`] if every backend's
    /// `list_*` calls fail; a single failing backend is skipped with a
    /// warning and does not fail the session.
    #[instrument(skip(self, backends), fields(session = %session_id))]
    pub async fn setup_capabilities(
        &self,
        session_id: &str,
        backends: Vec<BackendHandle>,
    ) -> AggregatorResult<SessionCapabilities> {
        let mut view = SessionView {
            backends: HashMap::new(),
            tools: HashMap::new(),
            resources: HashMap::new(),
            prompts: HashMap::new(),
        };
        let mut caps = SessionCapabilities::default();
        let requested = backends.len();

        for handle in backends {
            let tools = handle.connector.list_tools().await;
            let resources = handle.connector.list_resources().await;
            let prompts = handle.connector.list_prompts().await;

            if tools.is_err() && resources.is_err() && prompts.is_err() {
                warn!(backend = %handle.name, "backend unreachable during capability setup, skipping");
                continue;
            }
            view.backends.insert(handle.name.clone(), Arc::clone(&handle.connector));

            if let Ok(tools) = tools {
                for t in tools {
                    let full = namespaced(&handle.name, &t.name);
                    if view.tools.contains_key(&full) {
                        warn!(name = %full, "tool name collision across backends, keeping first");
                        continue;
                    }
                    view.tools.insert(full.clone(), (handle.name.clone(), t.name.clone()));
                    caps.tools.push(Tool { name: full, ..t });
                }
            }
            if let Ok(resources) = resources {
                for r in resources {
                    let full = namespaced(&handle.name, &r.name);
                    if view.resources.contains_key(&full) {
                        warn!(name = %full, "resource name collision across backends, keeping first");
                        continue;
                    }
                    view.resources.insert(full.clone(), (handle.name.clone(), r.name.clone()));
                    caps.resources.push(Resource { name: full, ..r });
                }
            }
            if let Ok(prompts) = prompts {
                for p in prompts {
                    let full = namespaced(&handle.name, &p.name);
                    if view.prompts.contains_key(&full) {
                        warn!(name = %full, "prompt name collision across backends, keeping first");
                        continue;
                    }
                    view.prompts.insert(full.clone(), (handle.name.clone(), p.name.clone()));
                    caps.prompts.push(Prompt { name: full, ..p });
                }
            }
        }

        if requested > 0 && view.backends.is_empty() {
            return Err(AggregatorError::BackendUnavailable {
                backend: session_id.to_string(),
                message: "every backend failed capability setup".to_string(),
            });
        }

        self.sessions.insert(session_id.to_string(), view);
        Ok(caps)
    }

    /// Remove a session's aggregated view and notification channel
    /// (called from `disconnectTransport`'s cleanup path).
    pub fn teardown_session(&self, session_id: &str) {
        self.sessions.remove(session_id);
        self.notifiers.remove(session_id);
    }

    /// Whether `session_id` currently has an aggregated view.
    #[must_use]
    pub fn has_session(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// §4.9 "Routing". Strips the namespace, resolves the owning backend,
    /// and forwards the call.
    ///
    /// # Errors
    /// Returns [`AggregatorError::NotFound`] if `session_id` has no view or
    /// `namespaced_name` isn't a known tool, and
    /// [`AggregatorError::BackendUnavailable`] if the forwarded call fails.
    #[instrument(skip(self, arguments), fields(session = %session_id, tool = %namespaced_name))]
    pub async fn call_tool(
        &self,
        session_id: &str,
        namespaced_name: &str,
        arguments: Option<HashMap<String, Value>>,
    ) -> AggregatorResult<Value> {
        let view = self
            .sessions
            .get(session_id)
            .ok_or_else(|| AggregatorError::NotFound(format!("session '{session_id}'")))?;
        let (backend_name, tool_name) = view
            .tools
            .get(namespaced_name)
            .ok_or_else(|| AggregatorError::NotFound(format!("tool '{namespaced_name}'")))?;
        let connector = view
            .backends
            .get(backend_name)
            .ok_or_else(|| AggregatorError::NotFound(format!("backend '{backend_name}'")))?
            .clone();
        let tool_name = tool_name.clone();
        drop(view);

        connector
            .call_tool(&tool_name, arguments)
            .await
            .map_err(|e| AggregatorError::BackendUnavailable {
                backend: backend_name.clone(),
                message: e.to_string(),
            })
    }

    /// Resolve a namespaced resource URI/name back to `(backend, original_name)`.
    #[must_use]
    pub fn resolve_resource(&self, session_id: &str, namespaced_name: &str) -> Option<(String, String)> {
        self.sessions.get(session_id)?.resources.get(namespaced_name).cloned()
    }

    /// Resolve a namespaced prompt name back to `(backend, original_name)`.
    #[must_use]
    pub fn resolve_prompt(&self, session_id: &str, namespaced_name: &str) -> Option<(String, String)> {
        self.sessions.get(session_id)?.prompts.get(namespaced_name).cloned()
    }

    /// Register (or retrieve) `session_id`'s notification channel.
    pub fn subscribe(&self, session_id: &str) -> broadcast::Receiver<Notification> {
        self.notifiers
            .entry(session_id.to_string())
            .or_insert_with(|| broadcast::channel(NOTIFICATION_CAPACITY).0)
            .subscribe()
    }

    /// Re-run the affected backend's `list_*`, recompute its slice of every
    /// subscribed session's namespaced view, and fan out a `list_changed`
    /// event (§4.9 "Notifications"). Until this re-lists, a session's
    /// `tools`/`resources`/`prompts` map stays stale and routes the new
    /// capability nowhere.
    #[instrument(skip(self), fields(backend = %backend_name, kind = ?kind))]
    pub async fn notify_list_changed(&self, backend_name: &str, kind: CapabilityKind) {
        let session_ids: Vec<String> = self
            .sessions
            .iter()
            .filter(|e| e.value().backends.contains_key(backend_name))
            .map(|e| e.key().clone())
            .collect();

        for session_id in session_ids {
            let connector = match self.sessions.get(&session_id) {
                Some(view) => view.backends.get(backend_name).cloned(),
                None => None,
            };
            let Some(connector) = connector else { continue };

            match kind {
                CapabilityKind::Tools => {
                    let Ok(tools) = connector.list_tools().await else {
                        warn!(backend = %backend_name, session = %session_id, "list_tools failed during re-list, keeping stale view");
                        continue;
                    };
                    if let Some(mut view) = self.sessions.get_mut(&session_id) {
                        view.tools.retain(|_, (b, _)| b != backend_name);
                        for t in tools {
                            let full = namespaced(backend_name, &t.name);
                            if view.tools.contains_key(&full) {
                                warn!(name = %full, "tool name collision across backends, keeping first");
                                continue;
                            }
                            view.tools.insert(full, (backend_name.to_string(), t.name.clone()));
                        }
                    }
                }
                CapabilityKind::Resources => {
                    let Ok(resources) = connector.list_resources().await else {
                        warn!(backend = %backend_name, session = %session_id, "list_resources failed during re-list, keeping stale view");
                        continue;
                    };
                    if let Some(mut view) = self.sessions.get_mut(&session_id) {
                        view.resources.retain(|_, (b, _)| b != backend_name);
                        for r in resources {
                            let full = namespaced(backend_name, &r.name);
                            if view.resources.contains_key(&full) {
                                warn!(name = %full, "resource name collision across backends, keeping first");
                                continue;
                            }
                            view.resources.insert(full, (backend_name.to_string(), r.name.clone()));
                        }
                    }
                }
                CapabilityKind::Prompts => {
                    let Ok(prompts) = connector.list_prompts().await else {
                        warn!(backend = %backend_name, session = %session_id, "list_prompts failed during re-list, keeping stale view");
                        continue;
                    };
                    if let Some(mut view) = self.sessions.get_mut(&session_id) {
                        view.prompts.retain(|_, (b, _)| b != backend_name);
                        for p in prompts {
                            let full = namespaced(backend_name, &p.name);
                            if view.prompts.contains_key(&full) {
                                warn!(name = %full, "prompt name collision across backends, keeping first");
                                continue;
                            }
                            view.prompts.insert(full, (backend_name.to_string(), p.name.clone()));
                        }
                    }
                }
            }

            if let Some(tx) = self.notifiers.get(&session_id) {
                // `send` only errors when there are no receivers; that's a
                // normal, ignorable case for a fan-out channel.
                let _ = tx.send(Notification {
                    kind,
                    backend: backend_name.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespacing_is_reversible_by_lookup_not_parsing() {
        assert_eq!(namespaced("fs", "read_file"), "fs__read_file");
    }

    #[tokio::test]
    async fn call_tool_on_unknown_session_is_not_found() {
        let router = Router::new();
        let err = router.call_tool("nope", "fs__read", None).await.unwrap_err();
        assert!(matches!(err, AggregatorError::NotFound(_)));
    }

    #[test]
    fn teardown_removes_session_and_notifier() {
        let router = Router::new();
        let _rx = router.subscribe("s1");
        assert!(!router.has_session("s1"));
        router.teardown_session("s1");
        assert!(!router.notifiers.contains_key("s1"));
    }
}
