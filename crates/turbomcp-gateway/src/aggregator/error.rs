//! Error taxonomy for the aggregating proxy
//!
//! Six kinds, matching the propagation policy described at the module root:
//! `InputInvalid` and `CapacityExceeded` and `NotFound` are always surfaced
//! to the caller; `BackendUnavailable` aborts only the affected template or
//! request; `ConflictDetected` and `Transient` are logged and swallowed by
//! their callers.

use thiserror::Error;

/// Result type for aggregator operations
pub type AggregatorResult<T> = std::result::Result<T, AggregatorError>;

/// Error taxonomy for the multi-tenant aggregating proxy core.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum AggregatorError {
    /// Malformed tag query, malformed template placeholder, unknown transport type.
    #[error("invalid input: {0}")]
    InputInvalid(String),

    /// Pool ceiling reached after an idle-eviction attempt.
    #[error("capacity exceeded for template '{template}'")]
    CapacityExceeded {
        /// Name of the template whose ceiling was hit.
        template: String,
    },

    /// Backend transport/initialize/request failed.
    #[error("backend '{backend}' unavailable: {message}")]
    BackendUnavailable {
        /// Backend (template or static server) name.
        backend: String,
        /// Underlying failure description.
        message: String,
    },

    /// Static/template name collision detected during materialization.
    #[error("conflicting server name(s): {0:?}")]
    ConflictDetected(Vec<String>),

    /// Preset name, server name, or tool name not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transient I/O failure during idle close or notification send.
    #[error("transient error: {0}")]
    Transient(String),
}

impl AggregatorError {
    /// MCP JSON-RPC error code for this error kind, per the wire convention:
    /// `-32000` internal, `-32002` backend unavailable, `-32001` capacity exceeded.
    #[must_use]
    pub fn mcp_code(&self) -> i32 {
        match self {
            Self::BackendUnavailable { .. } => -32002,
            Self::CapacityExceeded { .. } => -32001,
            _ => -32000,
        }
    }

    /// Whether this error kind is local to one template and should not fail
    /// the whole session setup (per the propagation policy in §7).
    #[must_use]
    pub fn is_per_template(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. } | Self::ConflictDetected(_))
    }
}
