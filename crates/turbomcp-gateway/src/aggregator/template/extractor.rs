//! Template Variable Extractor (C1)
//!
//! Parses `{namespace.path[:default] [| fn(args) …]}` placeholders out of
//! every string field of a [`ServerConfigEntry`], without touching the
//! network or filesystem. Extraction is pure and memoized.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use sha2::{Digest, Sha256};

use crate::aggregator::context::Context;
use crate::aggregator::server_config::ServerConfigEntry;

/// One parsed `(name, args)` pipeline function application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// Function name (`upper`, `lower`, `basename`, `truncate`, `default`, `replace`, …).
    pub name: String,
    /// Raw argument strings, in declaration order.
    pub args: Vec<String>,
}

/// A single parsed template variable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRef {
    /// First dot-segment of `path` (e.g. `project`).
    pub namespace: String,
    /// Full dot-joined path (e.g. `project.path`).
    pub path: String,
    /// `:default` literal, if present.
    pub default: Option<String>,
    /// Pipeline functions, left-to-right.
    pub functions: Vec<FunctionCall>,
    /// The exact source span, including braces, as it appeared in the config.
    pub raw: String,
}

/// A placeholder syntax error.
#[derive(Debug, Clone, thiserror::Error)]
#[error("template syntax error at {position}: {reason} (near `{path}`)")]
pub struct ExtractError {
    /// Byte offset of the opening brace within the source string.
    pub position: usize,
    /// Best-effort recovered path text.
    pub path: String,
    /// One-line reason.
    pub reason: String,
}

/// Find every `{…}` placeholder span in `input` and parse it.
///
/// Braces inside quoted default values are not supported — this keeps
/// parsing regular, per §4.1. A lone unmatched `{` is a syntax error.
pub fn parse_placeholders(input: &str) -> Result<Vec<VariableRef>, ExtractError> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            let start = i;
            let close = input[i + 1..].find('}').map(|p| i + 1 + p);
            let Some(end) = close else {
                return Err(ExtractError {
                    position: start,
                    path: input[start..].to_string(),
                    reason: "unterminated placeholder (missing '}')".to_string(),
                });
            };
            let content = &input[start + 1..end];
            out.push(parse_placeholder_body(content, start, input)?);
            i = end + 1;
        } else {
            i += 1;
        }
    }
    Ok(out)
}

fn parse_placeholder_body(
    content: &str,
    position: usize,
    raw_source: &str,
) -> Result<VariableRef, ExtractError> {
    let mut segments = content.split('|');
    let head = segments.next().unwrap_or("").trim();
    if head.is_empty() {
        return Err(ExtractError {
            position,
            path: String::new(),
            reason: "empty placeholder path".to_string(),
        });
    }
    let (path, default) = match head.split_once(':') {
        Some((p, d)) => (p.trim().to_string(), Some(d.trim().to_string())),
        None => (head.to_string(), None),
    };
    if path.is_empty() {
        return Err(ExtractError {
            position,
            path: head.to_string(),
            reason: "empty placeholder path".to_string(),
        });
    }
    let namespace = path
        .split('.')
        .next()
        .unwrap_or(&path)
        .to_string();

    let mut functions = Vec::new();
    for raw_fn in segments {
        let raw_fn = raw_fn.trim();
        if raw_fn.is_empty() {
            continue;
        }
        functions.push(parse_function_call(raw_fn, position)?);
    }

    let end = position + 1 + content.len() + 1;
    let raw = raw_source
        .get(position..end.min(raw_source.len()))
        .unwrap_or(content)
        .to_string();

    Ok(VariableRef {
        namespace,
        path,
        default,
        functions,
        raw,
    })
}

fn parse_function_call(text: &str, position: usize) -> Result<FunctionCall, ExtractError> {
    match text.find('(') {
        Some(open) => {
            let Some(stripped) = text.strip_suffix(')') else {
                return Err(ExtractError {
                    position,
                    path: text.to_string(),
                    reason: "unterminated function call (missing ')')".to_string(),
                });
            };
            let name = text[..open].trim().to_string();
            let args_str = &stripped[open + 1..];
            let args = if args_str.trim().is_empty() {
                Vec::new()
            } else {
                args_str
                    .split(',')
                    .map(|a| a.trim().to_string())
                    .collect()
            };
            if name.is_empty() {
                return Err(ExtractError {
                    position,
                    path: text.to_string(),
                    reason: "empty function name".to_string(),
                });
            }
            Ok(FunctionCall { name, args })
        }
        None => Ok(FunctionCall {
            name: text.to_string(),
            args: Vec::new(),
        }),
    }
}

/// Extract every distinct placeholder across all placeholder-eligible
/// string fields of `config`, in first-seen order (deduped on full `raw`).
///
/// # Errors
/// Returns the first syntax error encountered.
pub fn extract(config: &ServerConfigEntry) -> Result<Vec<VariableRef>, ExtractError> {
    let cache = extract_cache();
    if let Some(cached) = cache.get(&cache_key(config)) {
        return Ok((*cached).clone());
    }
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for (_, value) in config.transport.string_fields() {
        for v in parse_placeholders(&value)? {
            if seen.insert(v.raw.clone()) {
                out.push(v);
            }
        }
    }
    cache.insert(cache_key(config), Arc::new(out.clone()));
    Ok(out)
}

/// Resolve every variable referenced by `config` against `context`.
///
/// Entries are included even when the value is missing (mapped to `None`):
/// downstream hashing and diagnostics need stable keys regardless.
#[must_use]
pub fn get_used(config: &ServerConfigEntry, context: &Context) -> HashMap<String, Option<String>> {
    let mut used = HashMap::new();
    let refs = extract(config).unwrap_or_default();
    for r in refs {
        let resolved = context.resolve(&r.path);
        used.insert(r.path.clone(), resolved);
    }
    used
}

/// Deterministic hex digest of a used-variable map: sorted keys, stable
/// primitives, SHA-256.
#[must_use]
pub fn create_variable_hash(used: &HashMap<String, Option<String>>) -> String {
    let mut keys: Vec<&String> = used.keys().collect();
    keys.sort();
    let mut hasher = Sha256::new();
    for k in keys {
        hasher.update(k.as_bytes());
        hasher.update([0u8]);
        match used.get(k).unwrap() {
            Some(v) => {
                hasher.update([1u8]);
                hasher.update(v.as_bytes());
            }
            None => hasher.update([0u8]),
        }
        hasher.update([0xFFu8]);
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

fn cache_key(config: &ServerConfigEntry) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for (label, value) in config.transport.string_fields() {
        label.hash(&mut hasher);
        value.hash(&mut hasher);
    }
    hasher.finish()
}

fn extract_cache() -> &'static DashMap<u64, Arc<Vec<VariableRef>>> {
    static CACHE: OnceLock<DashMap<u64, Arc<Vec<VariableRef>>>> = OnceLock::new();
    CACHE.get_or_init(DashMap::new)
}

/// Drop all memoized extraction results.
pub fn clear_cache() {
    extract_cache().clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_placeholder() {
        let refs = parse_placeholders("{project.path}").unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].namespace, "project");
        assert_eq!(refs[0].path, "project.path");
        assert_eq!(refs[0].default, None);
    }

    #[test]
    fn parses_default_and_pipeline() {
        let refs = parse_placeholders("{user.name:anon | upper | truncate(3)}").unwrap();
        assert_eq!(refs.len(), 1);
        let r = &refs[0];
        assert_eq!(r.path, "user.name");
        assert_eq!(r.default.as_deref(), Some("anon"));
        assert_eq!(r.functions.len(), 2);
        assert_eq!(r.functions[0].name, "upper");
        assert_eq!(r.functions[1].name, "truncate");
        assert_eq!(r.functions[1].args, vec!["3".to_string()]);
    }

    #[test]
    fn unterminated_placeholder_errors() {
        let err = parse_placeholders("{project.path").unwrap_err();
        assert_eq!(err.position, 0);
    }

    #[test]
    fn hash_is_stable_and_ignores_unused_fields() {
        let mut used_a = HashMap::new();
        used_a.insert("project.path".to_string(), Some("/repo".to_string()));
        let mut used_b = used_a.clone();
        used_b.insert("user.name".to_string(), Some("ignored-but-present".to_string()));

        // Different used-maps produce different hashes (this function hashes
        // whatever subset it's given — purity w.r.t. *unused* context fields
        // is the caller's responsibility: only call get_used with the
        // template's own extracted variables).
        assert_ne!(create_variable_hash(&used_a), create_variable_hash(&used_b));
        assert_eq!(create_variable_hash(&used_a), create_variable_hash(&used_a.clone()));
    }

    #[test]
    fn get_used_includes_missing_as_none() {
        let config = ServerConfigEntry {
            transport: crate::aggregator::server_config::TransportConfig::Http {
                url: "{project.path}/{user.missing}".to_string(),
                headers: Default::default(),
            },
            tags: Default::default(),
            disabled: false,
            timeout: None,
            template: None,
            metadata: None,
        };
        let mut ctx = Context::default();
        ctx.project.insert("path".into(), "/repo".into());
        let used = get_used(&config, &ctx);
        assert_eq!(used.get("project.path").unwrap().as_deref(), Some("/repo"));
        assert_eq!(used.get("user.missing").unwrap(), &None);
    }
}
