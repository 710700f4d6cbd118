//! Template Server Manager (C6)
//!
//! Translates the set of templates matching a session's filter (C4) into
//! pool reservations (C5), and keeps the session → template → renderedHash
//! routing table current so C9 and this module's own cleanup path can find
//! the pooled instance behind a template name without ever storing a
//! back-pointer to it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{instrument, warn};

use crate::aggregator::context::Context;
use crate::aggregator::error::{AggregatorError, AggregatorResult};
use crate::aggregator::pool::{self, GetOrCreateOptions, InstancePool};
use crate::aggregator::server_config::{ServerConfigEntry, TransportConfig};
use crate::aggregator::tags::filter;
use crate::aggregator::tags::query::TagQuery;
use crate::aggregator::template::{extractor, renderer};
use crate::proxy::backend::{BackendConfig, BackendTransport};

/// One materialized template-backed backend, ready to be registered in
/// the session's C9 view.
#[derive(Debug, Clone)]
pub struct TemplateOutboundEntry {
    /// The template (declared server) name this entry was built from.
    pub template_name: String,
    /// Pool key for the backing instance; identical to the outbound key
    /// used to look the instance up later (§4.6 step d).
    pub outbound_key: Arc<str>,
    /// Rendered-config content hash, recorded for the routing table.
    pub rendered_hash: String,
}

/// Outcome of one `create_template_based_servers` call.
#[derive(Debug, Default)]
pub struct CreateResult {
    /// Successfully materialized entries, in declared order.
    pub entries: Vec<TemplateOutboundEntry>,
    /// Templates skipped due to a per-template failure, with the reason.
    pub skipped: Vec<(String, AggregatorError)>,
}

/// Convert a rendered [`TransportConfig`] into the shape `BackendConnector`
/// understands. `sse` has no distinct wire behavior in this crate's
/// outbound client beyond streamable HTTP, so it folds into `Http`,
/// carrying an `Authorization` header (if any) as the bearer token.
pub(crate) fn to_backend_transport(transport: &TransportConfig) -> BackendTransport {
    match transport {
        TransportConfig::Stdio { command, args, env, cwd } => BackendTransport::Stdio {
            command: command.clone(),
            args: args.clone(),
            working_dir: cwd.clone(),
            env: env.clone(),
        },
        TransportConfig::Http { url, headers } | TransportConfig::Sse { url, headers } => BackendTransport::Http {
            url: url.clone(),
            auth_token: headers.get("authorization").or_else(|| headers.get("Authorization")).cloned(),
        },
    }
}

/// Translates matched templates into pool reservations and keeps the
/// per-session routing table current.
pub struct TemplateManager {
    pool: Arc<InstancePool>,
    /// `sessionId -> (templateName -> renderedHash)`.
    routing_table: DashMap<String, HashMap<String, String>>,
}

impl TemplateManager {
    /// A manager backed by `pool`.
    #[must_use]
    pub fn new(pool: Arc<InstancePool>) -> Self {
        Self {
            pool,
            routing_table: DashMap::new(),
        }
    }

    /// §4.6 `createTemplateBasedServers`.
    #[instrument(skip(self, context, templates_view, opts), fields(session = %session_id))]
    pub async fn create_template_based_servers(
        &self,
        session_id: &str,
        context: &Context,
        filter_query: &TagQuery,
        templates_view: &[(String, ServerConfigEntry)],
        opts: &GetOrCreateOptions,
    ) -> CreateResult {
        let matches = filter::get_matching_templates(templates_view, filter_query);

        let mut result = CreateResult::default();
        let mut session_routes = HashMap::new();

        for (name, cfg) in matches {
            match self.materialize_one(session_id, context, name, cfg, opts).await {
                Ok(entry) => {
                    session_routes.insert(name.to_string(), entry.rendered_hash.clone());
                    result.entries.push(entry);
                }
                Err(err) => {
                    warn!(template = name, error = %err, "skipping template for this session");
                    result.skipped.push((name.to_string(), err));
                }
            }
        }

        self.routing_table.insert(session_id.to_string(), session_routes);
        result
    }

    async fn materialize_one(
        &self,
        session_id: &str,
        context: &Context,
        name: &str,
        cfg: &ServerConfigEntry,
        opts: &GetOrCreateOptions,
    ) -> AggregatorResult<TemplateOutboundEntry> {
        extractor::extract(cfg).map_err(|e| AggregatorError::InputInvalid(e.to_string()))?;
        let render_out =
            renderer::render(cfg, context, renderer::RenderOptions::default()).map_err(|e| AggregatorError::InputInvalid(e.to_string()))?;

        let shareable = cfg.template.as_ref().is_none_or(super::server_config::TemplatePolicy::is_shareable);

        let backend_config = BackendConfig {
            transport: to_backend_transport(&render_out.rendered_config.transport),
            client_name: opts.client_name.clone(),
            client_version: opts.client_version.clone(),
        };

        let outbound_key = self
            .pool
            .get_or_create_instance(name, backend_config, &render_out.rendered_hash, shareable, session_id, opts)
            .await?;

        Ok(TemplateOutboundEntry {
            template_name: name.to_string(),
            outbound_key,
            rendered_hash: render_out.rendered_hash,
        })
    }

    /// §4.6 `cleanupTemplateServers`.
    #[instrument(skip(self), fields(session = %session_id))]
    pub fn cleanup_template_servers(&self, session_id: &str) {
        let Some((_, routes)) = self.routing_table.remove(session_id) else {
            return;
        };
        for (template_name, rendered_hash) in routes {
            let shareable_key = pool::derive_key(&template_name, &rendered_hash, true, session_id);
            let key = if self.pool.contains(&shareable_key) {
                shareable_key
            } else {
                pool::derive_key(&template_name, &rendered_hash, false, session_id)
            };
            self.pool.remove_client(&key, session_id);
        }
    }

    /// The renderedHash routed for `(session_id, template_name)`, if any.
    #[must_use]
    pub fn route(&self, session_id: &str, template_name: &str) -> Option<String> {
        self.routing_table.get(session_id)?.get(template_name).cloned()
    }

    /// Run belt-and-braces idle reclamation once. This mirrors the pool's
    /// own sweep at a potentially different cadence, catching instances
    /// whose client count reached zero but haven't yet been reclaimed.
    pub async fn sweep_once(&self) -> usize {
        self.pool.sweep_idle().await
    }

    /// Spawn the periodic belt-and-braces sweep task (§4.6, last paragraph).
    pub fn spawn_periodic_sweep(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let reclaimed = this.sweep_once().await;
                if reclaimed > 0 {
                    tracing::debug!(reclaimed, "belt-and-braces sweep reclaimed instances");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::pool::PoolConfig;
    use crate::aggregator::server_config::TransportConfig;
    use crate::aggregator::tags::query::TagQuery;

    fn opts() -> GetOrCreateOptions {
        GetOrCreateOptions {
            client_name: "gateway".to_string(),
            client_version: "0.0.0".to_string(),
        }
    }

    #[tokio::test]
    async fn unmatched_templates_produce_no_entries() {
        let pool = Arc::new(InstancePool::new(PoolConfig::default()));
        let manager = TemplateManager::new(pool);
        let templates = vec![(
            "srv".to_string(),
            ServerConfigEntry {
                transport: TransportConfig::Http {
                    url: "http://example".to_string(),
                    headers: HashMap::new(),
                },
                tags: ["other".to_string()].into_iter().collect(),
                disabled: false,
                timeout: None,
                template: None,
                metadata: None,
            },
        )];
        let ctx = Context::default();
        let result = manager
            .create_template_based_servers("s1", &ctx, &TagQuery::Tag("web".to_string()), &templates, &opts())
            .await;
        assert!(result.entries.is_empty());
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn cleanup_on_unknown_session_is_a_noop() {
        let pool = Arc::new(InstancePool::new(PoolConfig::default()));
        let manager = TemplateManager::new(pool);
        manager.cleanup_template_servers("never-connected");
    }
}
