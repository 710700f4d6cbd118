//! Per-session immutable context and its external encodings
//!
//! A [`Context`] is built once when a transport is admitted (§6) and never
//! mutated afterwards; templates render against it, and rendered-hash
//! purity (§3 invariants) depends on that immutability.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Recognized namespaces a template placeholder's path may start with.
pub const NAMESPACES: [&str; 3] = ["project", "user", "environment"];

/// Optional client descriptor carried in a [`Context`].
///
/// The distilled spec names this field but doesn't give it a shape; both
/// members are optional so a partially-populated descriptor still renders.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientDescriptor {
    /// Client-reported name, if supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Client-reported version, if supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Per-session immutable context available to template rendering.
///
/// Leaf values are always strings; unknown paths resolve to the
/// placeholder's default (if any) or the literal placeholder (non-strict)
/// / a render failure (strict), per §1 of the Template Renderer design.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Context {
    /// `project.*` namespace.
    #[serde(default)]
    pub project: HashMap<String, String>,
    /// `user.*` namespace.
    #[serde(default)]
    pub user: HashMap<String, String>,
    /// `environment.*` namespace.
    #[serde(default)]
    pub environment: HashMap<String, String>,
    /// Scalar `sessionId` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Scalar `timestamp` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Scalar `version` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Optional client descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientDescriptor>,
}

impl Context {
    /// Resolve a dot-joined path (e.g. `project.path`, `sessionId`) against
    /// this context. Returns `None` when the path is unrecognized.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<String> {
        let mut parts = path.splitn(2, '.');
        let head = parts.next()?;
        let rest = parts.next();
        match (head, rest) {
            ("project", Some(key)) => self.project.get(key).cloned(),
            ("user", Some(key)) => self.user.get(key).cloned(),
            ("environment", Some(key)) => self.environment.get(key).cloned(),
            ("sessionId", None) => self.session_id.clone(),
            ("timestamp", None) => self.timestamp.clone(),
            ("version", None) => self.version.clone(),
            ("client", Some("name")) => self.client.as_ref()?.name.clone(),
            ("client", Some("version")) => self.client.as_ref()?.version.clone(),
            _ => None,
        }
    }
}

/// Header names recognized on inbound HTTP transports, per §6.
pub mod headers {
    pub const PROJECT_NAME: &str = "x-context-project-name";
    pub const PROJECT_PATH: &str = "x-context-project-path";
    pub const USER_NAME: &str = "x-context-user-name";
    pub const USER_EMAIL: &str = "x-context-user-email";
    pub const ENVIRONMENT_NAME: &str = "x-context-environment-name";
    pub const SESSION_ID: &str = "x-context-session-id";
    pub const TIMESTAMP: &str = "x-context-timestamp";
    pub const VERSION: &str = "x-context-version";
}

/// Build a [`Context`] from a decoded header map (string → string).
///
/// Case-insensitivity of the actual transport's header map is the caller's
/// responsibility (e.g. `http::HeaderMap` is already case-insensitive);
/// this function expects lowercase keys matching [`headers`].
#[must_use]
pub fn from_headers(map: &HashMap<String, String>) -> Context {
    let mut ctx = Context::default();
    if let Some(v) = map.get(headers::PROJECT_NAME) {
        ctx.project.insert("name".into(), v.clone());
    }
    if let Some(v) = map.get(headers::PROJECT_PATH) {
        ctx.project.insert("path".into(), v.clone());
    }
    if let Some(v) = map.get(headers::USER_NAME) {
        ctx.user.insert("name".into(), v.clone());
    }
    if let Some(v) = map.get(headers::USER_EMAIL) {
        ctx.user.insert("email".into(), v.clone());
    }
    if let Some(v) = map.get(headers::ENVIRONMENT_NAME) {
        ctx.environment.insert("name".into(), v.clone());
    }
    ctx.session_id = map.get(headers::SESSION_ID).cloned();
    ctx.timestamp = map.get(headers::TIMESTAMP).cloned();
    ctx.version = map.get(headers::VERSION).cloned();
    ctx
}

/// Build a [`Context`] from query-string parameters, the fallback encoding
/// for transports without custom headers.
#[must_use]
pub fn from_query(params: &HashMap<String, String>) -> Context {
    let mut ctx = Context::default();
    if let Some(v) = params.get("project_name") {
        ctx.project.insert("name".into(), v.clone());
    }
    if let Some(v) = params.get("project_path") {
        ctx.project.insert("path".into(), v.clone());
    }
    if let Some(v) = params.get("user_name") {
        ctx.user.insert("name".into(), v.clone());
    }
    if let Some(v) = params.get("user_email") {
        ctx.user.insert("email".into(), v.clone());
    }
    if let Some(v) = params.get("environment_name") {
        ctx.environment.insert("name".into(), v.clone());
    }
    ctx.session_id = params.get("context_session_id").cloned();
    ctx.timestamp = params.get("context_timestamp").cloned();
    ctx.version = params.get("context_version").cloned();
    ctx
}

/// Merge headers and query parameters into one [`Context`], per §6:
/// query parameters override header-derived fields iff `context_session_id`
/// is present in the query string; otherwise headers win outright.
#[must_use]
pub fn merge(
    headers: &HashMap<String, String>,
    query: &HashMap<String, String>,
) -> Context {
    let from_hdrs = from_headers(headers);
    if !query.contains_key("context_session_id") {
        return from_hdrs;
    }
    let from_qs = from_query(query);
    Context {
        project: if from_qs.project.is_empty() {
            from_hdrs.project
        } else {
            from_qs.project
        },
        user: if from_qs.user.is_empty() {
            from_hdrs.user
        } else {
            from_qs.user
        },
        environment: if from_qs.environment.is_empty() {
            from_hdrs.environment
        } else {
            from_qs.environment
        },
        session_id: from_qs.session_id.or(from_hdrs.session_id),
        timestamp: from_qs.timestamp.or(from_hdrs.timestamp),
        version: from_qs.version.or(from_hdrs.version),
        client: from_hdrs.client.or(from_qs.client),
    }
}
