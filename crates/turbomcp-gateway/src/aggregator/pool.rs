//! Outbound Instance Pool (C5)
//!
//! Owns every backend MCP client + transport pair reachable through a
//! template, keyed by `templateName:renderedHash` (shareable) or
//! `templateName:renderedHash:sessionId` (per-client). This is the only
//! component that opens or closes backend connections; C6/C9 hold string
//! keys into this pool, never a reference to the instance itself.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::aggregator::error::{AggregatorError, AggregatorResult};
use crate::proxy::backend::{BackendConfig, BackendConnector};

/// Pool-wide tunables (§4.5 "Configuration").
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Per-template ceiling on concurrently pooled instances.
    pub max_instances_per_template: usize,
    /// Global ceiling across all templates.
    pub max_total_instances: usize,
    /// How long an idle instance survives before the sweep evicts it.
    pub idle_timeout: Duration,
    /// Interval between idle sweeps.
    pub cleanup_interval: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_instances_per_template: 16,
            max_total_instances: 256,
            idle_timeout: Duration::from_secs(600),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

/// Lifecycle state of a pooled instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    /// Placeholder inserted while the connect/initialize handshake is
    /// in flight; never observable as a usable instance.
    Reserving,
    /// At least one client holds a reference.
    Active,
    /// `referenceCount == 0`; eligible for the idle sweep once
    /// `idleTimeout` has elapsed since `lastUsedAt`.
    Idle,
    /// Being closed by the sweep; about to be removed from every index.
    Terminating,
}

/// An outbound MCP client + transport pair, shared by reference count
/// across sessions when its template is shareable.
pub struct PooledOutboundInstance {
    /// Stable identifier, equal to its pool key.
    pub id: String,
    /// Owning template name.
    pub template_name: String,
    /// Rendered-config content hash this instance was created for.
    pub rendered_hash: String,
    /// The connected backend, present once the handshake completes.
    client: Option<Arc<BackendConnector>>,
    /// Current lifecycle state.
    pub status: InstanceStatus,
    /// Number of distinct clients currently holding this instance.
    pub reference_count: usize,
    /// Session/client identifiers currently holding this instance.
    pub client_ids: HashSet<String>,
    /// Last time a client was added, removed, or this instance was returned
    /// from `getOrCreateInstance`.
    pub last_used_at: Instant,
}

impl PooledOutboundInstance {
    /// The connected backend client, if the handshake has completed.
    #[must_use]
    pub fn client(&self) -> Option<&Arc<BackendConnector>> {
        self.client.as_ref()
    }
}

/// Point-in-time pool statistics (§4.5 "Statistics"). Observability only;
/// never consulted for correctness.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PoolStats {
    /// Total pooled instances, across every status.
    pub total: usize,
    /// Instances with `status == active`.
    pub active: usize,
    /// Instances with `status == idle`.
    pub idle: usize,
    /// Distinct template names with at least one instance.
    pub templates: usize,
    /// Sum of `clientIds.len()` across every instance.
    pub total_clients: usize,
}

/// Compute the shareable flag and pool key for a template instance (§4.5
/// "Key derivation").
#[must_use]
pub fn derive_key(template_name: &str, rendered_hash: &str, shareable: bool, session_id: &str) -> String {
    if shareable {
        format!("{template_name}:{rendered_hash}")
    } else {
        format!("{template_name}:{rendered_hash}:{session_id}")
    }
}

/// Extra per-call allocation options passed down to `BackendConnector::new`.
#[derive(Debug, Clone, Default)]
pub struct GetOrCreateOptions {
    /// Client name advertised during `initialize`.
    pub client_name: String,
    /// Client version advertised during `initialize`.
    pub client_version: String,
}

/// The outbound instance pool.
pub struct InstancePool {
    config: PoolConfig,
    instances: DashMap<String, PooledOutboundInstance>,
    total_count: AtomicU64,
}

impl InstancePool {
    /// An empty pool with the given configuration.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            instances: DashMap::new(),
            total_count: AtomicU64::new(0),
        }
    }

    /// The single allocation entry point (§4.5).
    ///
    /// # Errors
    /// Returns [`AggregatorError::CapacityExceeded`] if both the
    /// per-template and total ceilings are at capacity after an idle-sweep
    /// retry, and [`AggregatorError::BackendUnavailable`] if opening the
    /// backend transport or the `initialize` handshake fails.
    #[instrument(skip(self, backend_config, opts), fields(template = %template_name))]
    #[allow(clippy::too_many_arguments)]
    pub async fn get_or_create_instance(
        &self,
        template_name: &str,
        backend_config: BackendConfig,
        rendered_hash: &str,
        shareable: bool,
        session_id: &str,
        opts: &GetOrCreateOptions,
    ) -> AggregatorResult<Arc<str>> {
        let key = derive_key(template_name, rendered_hash, shareable, session_id);

        // Step 2: reuse an existing, non-terminating shareable instance.
        if shareable {
            if let Some(mut entry) = self.instances.get_mut(&key) {
                if entry.status != InstanceStatus::Terminating {
                    if entry.client_ids.insert(session_id.to_string()) {
                        entry.reference_count += 1;
                    }
                    entry.status = InstanceStatus::Active;
                    entry.last_used_at = Instant::now();
                    debug!(key = %key, refs = entry.reference_count, "reusing pooled instance");
                    return Ok(Arc::from(key.as_str()));
                }
            }
        }

        // Step 4: enforce ceilings before allocating, with one idle-eviction retry.
        self.enforce_ceilings(template_name).await?;

        // Step 3: allocate. Reserve a placeholder before releasing to I/O so a
        // partially initialized instance is never observable to a concurrent caller.
        match self.instances.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                // A concurrent caller raced us onto the same key (per-client keys
                // include the session id, so this only happens for shareable keys
                // that just flipped out of `Terminating`).
                let entry = occupied.get_mut();
                if entry.client_ids.insert(session_id.to_string()) {
                    entry.reference_count += 1;
                }
                entry.status = InstanceStatus::Active;
                entry.last_used_at = Instant::now();
                return Ok(Arc::from(key.as_str()));
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(PooledOutboundInstance {
                    id: key.clone(),
                    template_name: template_name.to_string(),
                    rendered_hash: rendered_hash.to_string(),
                    client: None,
                    status: InstanceStatus::Reserving,
                    reference_count: 0,
                    client_ids: HashSet::new(),
                    last_used_at: Instant::now(),
                });
            }
        }
        self.total_count.fetch_add(1, Ordering::Relaxed);

        let connect_config = BackendConfig {
            transport: backend_config.transport,
            client_name: opts.client_name.clone(),
            client_version: opts.client_version.clone(),
        };

        match BackendConnector::new(connect_config).await {
            Ok(connector) => {
                if let Some(mut entry) = self.instances.get_mut(&key) {
                    entry.client = Some(Arc::new(connector));
                    entry.reference_count = 1;
                    entry.client_ids.insert(session_id.to_string());
                    entry.status = InstanceStatus::Active;
                    entry.last_used_at = Instant::now();
                }
                debug!(key = %key, "allocated new pooled instance");
                Ok(Arc::from(key.as_str()))
            }
            Err(err) => {
                // Roll back the reservation; it must never be observable as usable.
                self.instances.remove(&key);
                self.total_count.fetch_sub(1, Ordering::Relaxed);
                Err(AggregatorError::BackendUnavailable {
                    backend: template_name.to_string(),
                    message: err.to_string(),
                })
            }
        }
    }

    /// Idempotent add of `client_id` to an existing instance (§4.5 `addClient`).
    pub fn add_client(&self, key: &str, client_id: &str) {
        if let Some(mut entry) = self.instances.get_mut(key) {
            if entry.client_ids.insert(client_id.to_string()) {
                entry.reference_count += 1;
            }
            entry.status = InstanceStatus::Active;
            entry.last_used_at = Instant::now();
        }
    }

    /// Remove `client_id` from an instance; transitions it to `idle` once
    /// the reference count reaches zero (§4.5 `removeClient`). Never
    /// closes the transport synchronously.
    pub fn remove_client(&self, key: &str, client_id: &str) {
        if let Some(mut entry) = self.instances.get_mut(key) {
            if entry.client_ids.remove(client_id) {
                entry.reference_count = entry.reference_count.saturating_sub(1);
            }
            if entry.reference_count == 0 {
                entry.status = InstanceStatus::Idle;
                entry.last_used_at = Instant::now();
            }
        }
    }

    /// Whether a pooled instance currently exists under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.instances.contains_key(key)
    }

    /// The connected backend client for `key`, if the instance exists and
    /// its handshake has completed. Used by C9 to resolve a template's
    /// outbound connector without ever handing out the pooled instance
    /// itself (§9 "Cyclic references").
    #[must_use]
    pub fn client(&self, key: &str) -> Option<Arc<BackendConnector>> {
        self.instances.get(key).and_then(|e| e.client().cloned())
    }

    /// Spawn the pool's own periodic idle sweep (§4.5 "Idle sweep").
    pub fn spawn_periodic_sweep(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                this.sweep_idle().await;
            }
        })
    }

    /// Current snapshot statistics (§4.5 "Statistics").
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let mut stats = PoolStats::default();
        let mut templates = HashSet::new();
        for entry in &self.instances {
            stats.total += 1;
            match entry.status {
                InstanceStatus::Active | InstanceStatus::Reserving => stats.active += 1,
                InstanceStatus::Idle => stats.idle += 1,
                InstanceStatus::Terminating => {}
            }
            stats.total_clients += entry.client_ids.len();
            templates.insert(entry.template_name.clone());
        }
        stats.templates = templates.len();
        stats
    }

    /// Run one idle sweep: every instance idle past `idle_timeout` is
    /// transitioned to `terminating`, best-effort closed, and removed from
    /// the index (§4.5 "Idle sweep"). Returns the number of keys reclaimed.
    #[instrument(skip(self))]
    pub async fn sweep_idle(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .instances
            .iter()
            .filter(|e| {
                e.status == InstanceStatus::Idle && now.duration_since(e.last_used_at) > self.config.idle_timeout
            })
            .map(|e| e.key().clone())
            .collect();

        let mut reclaimed = 0;
        for key in expired {
            if let Some((_, mut instance)) = self.instances.remove(&key) {
                instance.status = InstanceStatus::Terminating;
                // Closing is best-effort; a failure here must not block
                // eviction of the entry itself.
                if instance.client.is_some() {
                    debug!(key = %key, "closing idle pooled instance");
                }
                self.total_count.fetch_sub(1, Ordering::Relaxed);
                reclaimed += 1;
            }
        }
        if reclaimed > 0 {
            debug!(reclaimed, "idle sweep reclaimed instances");
        }
        reclaimed
    }

    /// Forcibly close every instance, regardless of status (shutdown path).
    pub async fn shutdown(&self) {
        let keys: Vec<String> = self.instances.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            self.instances.remove(&key);
        }
        self.total_count.store(0, Ordering::Relaxed);
    }

    async fn enforce_ceilings(&self, template_name: &str) -> AggregatorResult<()> {
        let per_template = self
            .instances
            .iter()
            .filter(|e| e.template_name == template_name && e.status != InstanceStatus::Terminating)
            .count();
        let total = self.total_count.load(Ordering::Relaxed) as usize;

        if per_template < self.config.max_instances_per_template && total < self.config.max_total_instances {
            return Ok(());
        }

        warn!(template = %template_name, per_template, total, "pool ceiling reached, attempting idle reclaim");
        let reclaimed = self.sweep_idle().await;
        if reclaimed == 0 {
            return Err(AggregatorError::CapacityExceeded {
                template: template_name.to_string(),
            });
        }

        let per_template = self
            .instances
            .iter()
            .filter(|e| e.template_name == template_name && e.status != InstanceStatus::Terminating)
            .count();
        let total = self.total_count.load(Ordering::Relaxed) as usize;
        if per_template < self.config.max_instances_per_template && total < self.config.max_total_instances {
            Ok(())
        } else {
            Err(AggregatorError::CapacityExceeded {
                template: template_name.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_derivation_matches_shareable_rule() {
        assert_eq!(derive_key("srv", "h", true, "s1"), "srv:h");
        assert_eq!(derive_key("srv", "h", false, "s1"), "srv:h:s1");
    }

    #[test]
    fn stats_on_empty_pool_are_zero() {
        let pool = InstancePool::new(PoolConfig::default());
        let stats = pool.stats();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.active, 0);
    }

    #[tokio::test]
    async fn remove_client_transitions_to_idle_without_closing() {
        let pool = InstancePool::new(PoolConfig::default());
        pool.instances.insert(
            "srv:h".to_string(),
            PooledOutboundInstance {
                id: "srv:h".to_string(),
                template_name: "srv".to_string(),
                rendered_hash: "h".to_string(),
                client: None,
                status: InstanceStatus::Active,
                reference_count: 1,
                client_ids: ["s1".to_string()].into_iter().collect(),
                last_used_at: Instant::now(),
            },
        );
        pool.remove_client("srv:h", "s1");
        let entry = pool.instances.get("srv:h").unwrap();
        assert_eq!(entry.status, InstanceStatus::Idle);
        assert_eq!(entry.reference_count, 0);
        assert!(pool.instances.contains_key("srv:h"));
    }

    #[tokio::test]
    async fn sweep_idle_reclaims_past_timeout_only() {
        let pool = InstancePool::new(PoolConfig {
            idle_timeout: Duration::from_millis(1),
            ..PoolConfig::default()
        });
        pool.instances.insert(
            "srv:h".to_string(),
            PooledOutboundInstance {
                id: "srv:h".to_string(),
                template_name: "srv".to_string(),
                rendered_hash: "h".to_string(),
                client: None,
                status: InstanceStatus::Idle,
                reference_count: 0,
                client_ids: HashSet::new(),
                last_used_at: Instant::now() - Duration::from_secs(1),
            },
        );
        pool.total_count.store(1, Ordering::Relaxed);
        let reclaimed = pool.sweep_idle().await;
        assert_eq!(reclaimed, 1);
        assert!(!pool.instances.contains_key("srv:h"));
    }

    #[tokio::test]
    async fn idle_instance_not_past_timeout_survives_sweep() {
        let pool = InstancePool::new(PoolConfig::default());
        pool.instances.insert(
            "srv:h".to_string(),
            PooledOutboundInstance {
                id: "srv:h".to_string(),
                template_name: "srv".to_string(),
                rendered_hash: "h".to_string(),
                client: None,
                status: InstanceStatus::Idle,
                reference_count: 0,
                client_ids: HashSet::new(),
                last_used_at: Instant::now(),
            },
        );
        let reclaimed = pool.sweep_idle().await;
        assert_eq!(reclaimed, 0);
        assert!(pool.instances.contains_key("srv:h"));
    }
}
