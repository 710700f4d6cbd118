//! Template Renderer (C2)
//!
//! Substitutes placeholders extracted by [`super::extractor`] using a
//! supplied [`Context`], folding the closed pipeline-function registry
//! left-to-right. Never touches the network or filesystem.

use std::collections::HashMap;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::aggregator::context::Context;
use crate::aggregator::server_config::ServerConfigEntry;
use crate::aggregator::template::extractor::{self, VariableRef};

/// Rendering mode: whether unresolved paths/functions are fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// When true, an unresolved path with no default or a failing pipeline
    /// function aborts the whole render with [`RenderError`].
    pub strict: bool,
}

/// A fatal render failure (strict mode only).
#[derive(Debug, Clone, thiserror::Error)]
#[error("render failure for `{path}`: {message}")]
pub struct RenderError {
    /// The placeholder path that failed.
    pub path: String,
    /// One-line reason.
    pub message: String,
}

/// Output of a successful render.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// The config with every placeholder substituted.
    pub rendered_config: ServerConfigEntry,
    /// Non-fatal warnings (sentinel substitutions, syntax fallbacks).
    pub warnings: Vec<String>,
    /// Content hash of `rendered_config`, stable across calls for identical
    /// (template, resolved-field) pairs.
    pub rendered_hash: String,
}

const UNKNOWN_FUNCTION: &str = "unknown";

fn apply_function(name: &str, args: &[String], value: &str) -> Result<String, String> {
    match name {
        "upper" => Ok(value.to_uppercase()),
        "lower" => Ok(value.to_lowercase()),
        "basename" => Ok(value.rsplit('/').next().unwrap_or(value).to_string()),
        "truncate" => {
            let n: i64 = args
                .first()
                .and_then(|a| a.parse().ok())
                .ok_or_else(|| "truncate requires a numeric argument".to_string())?;
            if n <= 0 {
                return Err("truncate(n) requires n > 0".to_string());
            }
            let n = n as usize;
            if value.chars().count() > n {
                Ok(format!("{}...", value.chars().take(n).collect::<String>()))
            } else {
                Ok(value.to_string())
            }
        }
        "default" => {
            if value.is_empty() {
                Ok(args.first().cloned().unwrap_or_default())
            } else {
                Ok(value.to_string())
            }
        }
        "replace" => {
            let from = args.first().ok_or("replace requires (from, to)")?;
            let to = args.get(1).ok_or("replace requires (from, to)")?;
            Ok(value.replacen(from, to, 1))
        }
        _ => Err(format!("Template function '{name}' failed: {UNKNOWN_FUNCTION}")),
    }
}

/// Result of rendering a single placeholder: either a value (with an
/// optional non-fatal warning) or a fatal failure.
enum PlaceholderResult {
    Value(String, Option<String>),
    Failure(RenderError),
}

fn render_placeholder(var: &VariableRef, context: &Context, opts: RenderOptions) -> PlaceholderResult {
    let resolved = context.resolve(&var.path);
    let mut value = match resolved {
        Some(v) => v,
        None => match &var.default {
            Some(d) => d.clone(),
            None => {
                if opts.strict {
                    return PlaceholderResult::Failure(RenderError {
                        path: var.path.clone(),
                        message: "no value and no default in strict mode".to_string(),
                    });
                }
                return PlaceholderResult::Value(var.raw.clone(), None);
            }
        },
    };

    for f in &var.functions {
        match apply_function(&f.name, &f.args, &value) {
            Ok(v) => value = v,
            Err(message) => {
                if opts.strict {
                    return PlaceholderResult::Failure(RenderError {
                        path: var.path.clone(),
                        message,
                    });
                }
                return PlaceholderResult::Value(
                    "[ERROR]".to_string(),
                    Some(format!("{} (path `{}`)", message, var.path)),
                );
            }
        }
    }
    PlaceholderResult::Value(value, None)
}

/// Render every placeholder in `field` against `context`.
fn render_field(
    field: &str,
    context: &Context,
    opts: RenderOptions,
    warnings: &mut Vec<String>,
) -> Result<String, RenderError> {
    let placeholders = match extractor::parse_placeholders(field) {
        Ok(p) => p,
        Err(e) => {
            if opts.strict {
                return Err(RenderError {
                    path: e.path,
                    message: e.reason,
                });
            }
            warnings.push(format!("{e}; left unchanged"));
            return Ok(field.to_string());
        }
    };
    if placeholders.is_empty() {
        return Ok(field.to_string());
    }

    // Whole-field placeholder: the field is exactly one `{...}` span.
    if placeholders.len() == 1 && placeholders[0].raw == field {
        return match render_placeholder(&placeholders[0], context, opts) {
            PlaceholderResult::Value(v, warn) => {
                if let Some(w) = warn {
                    warnings.push(w);
                }
                Ok(v)
            }
            PlaceholderResult::Failure(e) => Err(e),
        };
    }

    // Interpolated: substitute each occurrence left-to-right.
    let mut out = String::with_capacity(field.len());
    let mut cursor = 0usize;
    for p in &placeholders {
        let Some(start) = field[cursor..].find(p.raw.as_str()).map(|i| i + cursor) else {
            continue;
        };
        out.push_str(&field[cursor..start]);
        match render_placeholder(p, context, opts) {
            PlaceholderResult::Value(v, warn) => {
                if let Some(w) = warn {
                    warnings.push(w);
                }
                out.push_str(&v);
            }
            PlaceholderResult::Failure(e) => return Err(e),
        }
        cursor = start + p.raw.len();
    }
    out.push_str(&field[cursor..]);
    Ok(out)
}

/// Render `config` against `context`, per §4.2.
///
/// # Errors
/// Returns [`RenderError`] only in strict mode, for the first unresolved
/// path with no default or failing pipeline function.
pub fn render(
    config: &ServerConfigEntry,
    context: &Context,
    opts: RenderOptions,
) -> Result<RenderOutput, RenderError> {
    let mut warnings = Vec::new();
    let mut rendered_fields = HashMap::new();
    for (label, value) in config.transport.string_fields() {
        let rendered = render_field(&value, context, opts, &mut warnings)?;
        rendered_fields.insert(label, rendered);
    }

    let rendered_transport = config.transport.with_rendered_fields(&rendered_fields);
    let rendered_config = ServerConfigEntry {
        transport: rendered_transport,
        ..config.clone()
    };
    let rendered_hash = hash_rendered_config(&rendered_config);

    Ok(RenderOutput {
        rendered_config,
        warnings,
        rendered_hash,
    })
}

/// Content hash of a rendered config's transport fields: sorted field
/// labels, stable JSON-ish serialization, SHA-256. Because the rendered
/// output only changes when a referenced placeholder's value changes,
/// this hash depends only on variables actually referenced (invariant 4).
#[must_use]
pub fn hash_rendered_config(config: &ServerConfigEntry) -> String {
    #[derive(Serialize)]
    struct Canonical<'a> {
        kind: &'static str,
        fields: Vec<(String, String)>,
        tags: Vec<&'a String>,
    }
    let mut fields = config.transport.string_fields();
    fields.sort();
    let mut tags: Vec<&String> = config.tags.iter().collect();
    tags.sort();
    let canonical = Canonical {
        kind: config.transport.kind(),
        fields,
        tags,
    };
    let json = serde_json::to_vec(&canonical).unwrap_or_default();
    let digest = Sha256::digest(&json);
    let mut out = String::with_capacity(digest.len() * 2);
    use std::fmt::Write as _;
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::server_config::TransportConfig;

    fn http_config(url: &str) -> ServerConfigEntry {
        ServerConfigEntry {
            transport: TransportConfig::Http {
                url: url.to_string(),
                headers: HashMap::new(),
            },
            tags: Default::default(),
            disabled: false,
            timeout: None,
            template: None,
            metadata: None,
        }
    }

    #[test]
    fn renders_simple_value() {
        let cfg = http_config("{project.path}/mcp");
        let mut ctx = Context::default();
        ctx.project.insert("path".into(), "/repo".into());
        let out = render(&cfg, &ctx, RenderOptions::default()).unwrap();
        match out.rendered_config.transport {
            TransportConfig::Http { url, .. } => assert_eq!(url, "/repo/mcp"),
            _ => unreachable!(),
        }
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn missing_value_nonstrict_uses_default() {
        let cfg = http_config("{user.name:anon}/mcp");
        let ctx = Context::default();
        let out = render(&cfg, &ctx, RenderOptions::default()).unwrap();
        match out.rendered_config.transport {
            TransportConfig::Http { url, .. } => assert_eq!(url, "anon/mcp"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn missing_value_strict_fails() {
        let cfg = http_config("{user.name}/mcp");
        let ctx = Context::default();
        let err = render(&cfg, &ctx, RenderOptions { strict: true }).unwrap_err();
        assert_eq!(err.path, "user.name");
    }

    #[test]
    fn unknown_function_nonstrict_sentinel() {
        let cfg = http_config("{project.path | bogus}");
        let mut ctx = Context::default();
        ctx.project.insert("path".into(), "/repo".into());
        let out = render(&cfg, &ctx, RenderOptions::default()).unwrap();
        match out.rendered_config.transport {
            TransportConfig::Http { url, .. } => assert_eq!(url, "[ERROR]"),
            _ => unreachable!(),
        }
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn truncate_zero_fails() {
        let cfg = http_config("{project.path | truncate(0)}");
        let mut ctx = Context::default();
        ctx.project.insert("path".into(), "/repo".into());
        let err = render(&cfg, &ctx, RenderOptions { strict: true }).unwrap_err();
        assert_eq!(err.path, "project.path");
    }

    #[test]
    fn unrelated_context_change_preserves_hash() {
        let cfg = http_config("{project.path}");
        let mut ctx_a = Context::default();
        ctx_a.project.insert("path".into(), "/repo".into());
        let mut ctx_b = ctx_a.clone();
        ctx_b.user.insert("name".into(), "someone-else".into());

        let out_a = render(&cfg, &ctx_a, RenderOptions::default()).unwrap();
        let out_b = render(&cfg, &ctx_b, RenderOptions::default()).unwrap();
        assert_eq!(out_a.rendered_hash, out_b.rendered_hash);
    }
}
