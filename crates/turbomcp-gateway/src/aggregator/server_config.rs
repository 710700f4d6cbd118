//! Server configuration entries (§3 "Server config entry")
//!
//! A tagged union over transport kinds, shared by static servers and
//! templates alike — a static entry is just a template with no
//! placeholders in any of its string fields.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Transport-specific fields of a server configuration entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Subprocess over stdio.
    Stdio {
        /// Command to execute.
        command: String,
        /// Command arguments (placeholders allowed per-element).
        #[serde(default)]
        args: Vec<String>,
        /// Environment variables (placeholders allowed in values).
        #[serde(default)]
        env: HashMap<String, String>,
        /// Working directory (placeholders allowed).
        #[serde(skip_serializing_if = "Option::is_none")]
        cwd: Option<String>,
    },
    /// Streamable HTTP.
    Http {
        /// Base URL (placeholders allowed).
        url: String,
        /// Extra headers (placeholders allowed in values).
        #[serde(default)]
        headers: HashMap<String, String>,
    },
    /// Server-sent events.
    Sse {
        /// Base URL (placeholders allowed).
        url: String,
        /// Extra headers (placeholders allowed in values).
        #[serde(default)]
        headers: HashMap<String, String>,
    },
}

impl TransportConfig {
    /// Transport kind name, for diagnostics and error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Stdio { .. } => "stdio",
            Self::Http { .. } => "http",
            Self::Sse { .. } => "sse",
        }
    }

    /// Iterate over every placeholder-eligible string field in declaration
    /// order, paired with a stable field label used for rendering back.
    #[must_use]
    pub fn string_fields(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        match self {
            Self::Stdio {
                command,
                args,
                env,
                cwd,
            } => {
                out.push(("command".to_string(), command.clone()));
                for (i, a) in args.iter().enumerate() {
                    out.push((format!("args[{i}]"), a.clone()));
                }
                for (k, v) in env {
                    out.push((format!("env.{k}"), v.clone()));
                }
                if let Some(c) = cwd {
                    out.push(("cwd".to_string(), c.clone()));
                }
            }
            Self::Http { url, headers } | Self::Sse { url, headers } => {
                out.push(("url".to_string(), url.clone()));
                for (k, v) in headers {
                    out.push((format!("headers.{k}"), v.clone()));
                }
            }
        }
        out
    }

    /// Rebuild this config, replacing each placeholder-eligible field with
    /// the value produced by `rendered`, keyed by the same field label
    /// `string_fields` emitted.
    #[must_use]
    pub fn with_rendered_fields(&self, rendered: &HashMap<String, String>) -> Self {
        match self {
            Self::Stdio {
                command,
                args,
                env,
                cwd,
            } => Self::Stdio {
                command: rendered.get("command").cloned().unwrap_or_else(|| command.clone()),
                args: args
                    .iter()
                    .enumerate()
                    .map(|(i, a)| rendered.get(&format!("args[{i}]")).cloned().unwrap_or_else(|| a.clone()))
                    .collect(),
                env: env
                    .iter()
                    .map(|(k, v)| {
                        let key = format!("env.{k}");
                        (k.clone(), rendered.get(&key).cloned().unwrap_or_else(|| v.clone()))
                    })
                    .collect(),
                cwd: cwd.as_ref().map(|c| {
                    rendered.get("cwd").cloned().unwrap_or_else(|| c.clone())
                }),
            },
            Self::Http { url, headers } => Self::Http {
                url: rendered.get("url").cloned().unwrap_or_else(|| url.clone()),
                headers: headers
                    .iter()
                    .map(|(k, v)| {
                        let key = format!("headers.{k}");
                        (k.clone(), rendered.get(&key).cloned().unwrap_or_else(|| v.clone()))
                    })
                    .collect(),
            },
            Self::Sse { url, headers } => Self::Sse {
                url: rendered.get("url").cloned().unwrap_or_else(|| url.clone()),
                headers: headers
                    .iter()
                    .map(|(k, v)| {
                        let key = format!("headers.{k}");
                        (k.clone(), rendered.get(&key).cloned().unwrap_or_else(|| v.clone()))
                    })
                    .collect(),
            },
        }
    }
}

/// Template-specific pool-sharing policy (§3).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemplatePolicy {
    /// Whether instances may be shared across sessions. Defaults to `true`
    /// unless `per_client` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shareable: Option<bool>,
    /// Whether each session always gets its own instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_client: Option<bool>,
    /// Idle timeout override for instances of this template.
    #[serde(skip_serializing_if = "Option::is_none", with = "humantime_opt")]
    pub idle_timeout: Option<Duration>,
}

impl TemplatePolicy {
    /// Whether instances of this template are shareable, per the key
    /// derivation rule in §4.5: `shareable = !per_client && shareable != false`.
    #[must_use]
    pub fn is_shareable(&self) -> bool {
        self.per_client != Some(true) && self.shareable != Some(false)
    }
}

mod humantime_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(v: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(d) => s.serialize_u64(d.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let secs: Option<u64> = Option::deserialize(d)?;
        Ok(secs.map(Duration::from_secs))
    }
}

/// Optional installation metadata pass-through on static server entries (§6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerMetadata {
    /// ISO-8601 install timestamp.
    pub installed_at: String,
    /// Who/what installed this server, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_by: Option<String>,
    /// Installed version string.
    pub version: String,
    /// Source registry identifier, if installed from a registry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_id: Option<String>,
    /// ISO-8601 last-updated timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// A server (static or template) configuration entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfigEntry {
    /// Transport-specific configuration.
    #[serde(flatten)]
    pub transport: TransportConfig,
    /// Tags used by the tag query evaluator.
    #[serde(default)]
    pub tags: HashSet<String>,
    /// Whether this entry is disabled (never started, never matched).
    #[serde(default)]
    pub disabled: bool,
    /// Per-request timeout override.
    #[serde(skip_serializing_if = "Option::is_none", with = "humantime_opt")]
    pub timeout: Option<Duration>,
    /// Template pool-sharing policy; `None` for static (non-template) entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplatePolicy>,
    /// Opaque pass-through installation metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ServerMetadata>,
}

impl ServerConfigEntry {
    /// Whether this entry is a template (has a pool-sharing policy attached).
    ///
    /// Per §4.4, entries missing a transport primary field are filtered out
    /// of matching upstream; that's enforced by the deserializer already
    /// requiring `command`/`url`.
    #[must_use]
    pub fn is_template(&self) -> bool {
        self.template.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shareable_default_true() {
        let p = TemplatePolicy::default();
        assert!(p.is_shareable());
    }

    #[test]
    fn per_client_forces_not_shareable() {
        let p = TemplatePolicy {
            per_client: Some(true),
            ..Default::default()
        };
        assert!(!p.is_shareable());
    }

    #[test]
    fn shareable_false_overrides() {
        let p = TemplatePolicy {
            shareable: Some(false),
            ..Default::default()
        };
        assert!(!p.is_shareable());
    }

    #[test]
    fn string_fields_roundtrip() {
        let cfg = TransportConfig::Http {
            url: "{project.path}/mcp".to_string(),
            headers: HashMap::new(),
        };
        let fields = cfg.string_fields();
        assert_eq!(fields, vec![("url".to_string(), "{project.path}/mcp".to_string())]);

        let mut rendered = HashMap::new();
        rendered.insert("url".to_string(), "/repo/mcp".to_string());
        let out = cfg.with_rendered_fields(&rendered);
        match out {
            TransportConfig::Http { url, .. } => assert_eq!(url, "/repo/mcp"),
            _ => panic!("wrong variant"),
        }
    }
}
