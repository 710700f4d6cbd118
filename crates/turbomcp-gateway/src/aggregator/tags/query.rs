//! Tag Query Evaluator (C3)
//!
//! A recursive boolean expression over tag membership, modeled as a
//! tagged variant (§9 design note) rather than an open map, with a custom
//! `Serialize`/`Deserialize` pair matching the wire shape described in §3.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Recursive tag query sum type (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagQuery {
    /// Matches nothing (the empty object `{}`).
    Empty,
    /// `{tag: "x"}` — server must carry tag `x`.
    Tag(String),
    /// `{$or: [...]}` — any subquery matches.
    Or(Vec<TagQuery>),
    /// `{$and: [...]}` — every subquery matches.
    And(Vec<TagQuery>),
    /// `{$not: {...}}` — subquery must not match.
    Not(Box<TagQuery>),
    /// `{$in: [...]}` — server tag set intersects this list.
    In(Vec<String>),
    /// `{$advanced: "..."}` — opaque, passed through; evaluates false
    /// unless an out-of-core advanced resolver is supplied.
    Advanced(String),
    /// A structurally well-formed but unrecognized top-level operator.
    /// Kept (rather than rejected at parse time) so that a persisted
    /// preset written by a newer version of this system still loads;
    /// [`evaluate`] treats it as non-matching and [`validate`] flags it.
    Unknown(Value),
}

/// Strategy for combining multiple selected tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Combine with `$or`.
    Or,
    /// Combine with `$and`.
    And,
    /// Treat the expression as an opaque advanced query.
    Advanced,
}

/// Evaluate `query` against a server's tag set. Unknown top-level
/// operators and `$advanced` (without a resolver) are tolerant failures:
/// they evaluate to `false` rather than erroring, per §4.3.
#[must_use]
pub fn evaluate(query: &TagQuery, tags: &HashSet<String>) -> bool {
    match query {
        TagQuery::Empty => false,
        TagQuery::Tag(t) => tags.contains(t),
        TagQuery::Or(subs) => subs.iter().any(|q| evaluate(q, tags)),
        TagQuery::And(subs) => subs.iter().all(|q| evaluate(q, tags)),
        TagQuery::Not(q) => !evaluate(q, tags),
        TagQuery::In(list) => list.iter().any(|t| tags.contains(t)),
        TagQuery::Advanced(_) | TagQuery::Unknown(_) => false,
    }
}

/// Convert a comma-separated tag expression into a [`TagQuery`].
///
/// Comma splits, trims, and drops empty segments. `strategy == Advanced`
/// wraps the expression unparsed.
#[must_use]
pub fn string_to_query(expr: &str, strategy: Strategy) -> TagQuery {
    if strategy == Strategy::Advanced {
        return TagQuery::Advanced(expr.to_string());
    }
    let tags: Vec<String> = expr
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if tags.is_empty() {
        return TagQuery::Empty;
    }
    if tags.len() == 1 {
        return TagQuery::Tag(tags.into_iter().next().unwrap());
    }
    match strategy {
        Strategy::Or => TagQuery::Or(tags.into_iter().map(TagQuery::Tag).collect()),
        Strategy::And => TagQuery::And(tags.into_iter().map(TagQuery::Tag).collect()),
        Strategy::Advanced => unreachable!(),
    }
}

/// Deterministic human-readable form of `q`, for display and logs only —
/// never a parser input.
#[must_use]
pub fn query_to_string(q: &TagQuery) -> String {
    match q {
        TagQuery::Empty => String::new(),
        TagQuery::Tag(t) => t.clone(),
        TagQuery::Or(subs) => join_with(subs, "OR"),
        TagQuery::And(subs) => join_with(subs, "AND"),
        TagQuery::Not(q) => format!("NOT ({})", query_to_string(q)),
        TagQuery::In(list) => format!("IN [{}]", list.join(", ")),
        TagQuery::Advanced(s) => s.clone(),
        TagQuery::Unknown(v) => format!("<unknown:{v}>"),
    }
}

fn join_with(subs: &[TagQuery], op: &str) -> String {
    subs.iter()
        .map(query_to_string)
        .collect::<Vec<_>>()
        .join(&format!(" {op} "))
}

/// Result of structural validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether `q` passed validation.
    pub ok: bool,
    /// Human-readable error messages, if any.
    pub errors: Vec<String>,
}

const MAX_DEPTH: usize = 64;

/// Structurally validate a query: rejects unknown top-level operators
/// (anywhere in the tree) and guards against pathologically deep nesting
/// (cycles can't arise structurally once deserialized into this enum, so
/// depth is the practical proxy for "circular reference").
#[must_use]
pub fn validate(q: &TagQuery) -> ValidationResult {
    let mut errors = Vec::new();
    validate_inner(q, 0, &mut errors);
    ValidationResult {
        ok: errors.is_empty(),
        errors,
    }
}

fn validate_inner(q: &TagQuery, depth: usize, errors: &mut Vec<String>) {
    if depth > MAX_DEPTH {
        errors.push("query nested too deeply (possible circular reference)".to_string());
        return;
    }
    match q {
        TagQuery::Empty | TagQuery::Tag(_) | TagQuery::In(_) | TagQuery::Advanced(_) => {}
        TagQuery::Or(subs) | TagQuery::And(subs) => {
            for s in subs {
                validate_inner(s, depth + 1, errors);
            }
        }
        TagQuery::Not(inner) => validate_inner(inner, depth + 1, errors),
        TagQuery::Unknown(_) => {
            errors.push("unknown top-level operator".to_string());
        }
    }
}

// --- Serialization matching the wire shape in §3 ---

fn to_value(q: &TagQuery) -> Value {
    match q {
        TagQuery::Empty => serde_json::json!({}),
        TagQuery::Tag(t) => serde_json::json!({ "tag": t }),
        TagQuery::Or(subs) => serde_json::json!({ "$or": subs.iter().map(to_value).collect::<Vec<_>>() }),
        TagQuery::And(subs) => serde_json::json!({ "$and": subs.iter().map(to_value).collect::<Vec<_>>() }),
        TagQuery::Not(inner) => serde_json::json!({ "$not": to_value(inner) }),
        TagQuery::In(list) => serde_json::json!({ "$in": list }),
        TagQuery::Advanced(s) => serde_json::json!({ "$advanced": s }),
        TagQuery::Unknown(v) => v.clone(),
    }
}

fn from_value(v: Value) -> Result<TagQuery, String> {
    let Value::Object(map) = v else {
        return Err("tag query must be a JSON object".to_string());
    };
    if map.is_empty() {
        return Ok(TagQuery::Empty);
    }
    if let Some(tag) = map.get("tag") {
        let s = tag.as_str().ok_or("`tag` must be a string")?;
        return Ok(TagQuery::Tag(s.to_string()));
    }
    if let Some(v) = map.get("$or") {
        return Ok(TagQuery::Or(parse_array(v)?));
    }
    if let Some(v) = map.get("$and") {
        return Ok(TagQuery::And(parse_array(v)?));
    }
    if let Some(v) = map.get("$not") {
        return Ok(TagQuery::Not(Box::new(from_value(v.clone())?)));
    }
    if let Some(v) = map.get("$in") {
        let arr = v.as_array().ok_or("`$in` must be an array")?;
        let tags = arr
            .iter()
            .map(|t| t.as_str().map(str::to_string).ok_or("`$in` entries must be strings"))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(TagQuery::In(tags));
    }
    if let Some(v) = map.get("$advanced") {
        let s = v.as_str().ok_or("`$advanced` must be a string")?;
        return Ok(TagQuery::Advanced(s.to_string()));
    }
    Ok(TagQuery::Unknown(Value::Object(map)))
}

fn parse_array(v: &Value) -> Result<Vec<TagQuery>, String> {
    let arr = v.as_array().ok_or("operator body must be an array")?;
    arr.iter().cloned().map(from_value).collect()
}

impl Serialize for TagQuery {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TagQuery {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        from_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_query_matches_nothing() {
        assert!(!evaluate(&TagQuery::Empty, &tags(&["web"])));
    }

    #[test]
    fn three_state_query_matches_truth_table() {
        // web=selected, api=not-selected, strategy=or
        let q = TagQuery::And(vec![
            TagQuery::Tag("web".to_string()),
            TagQuery::Not(Box::new(TagQuery::Tag("api".to_string()))),
        ]);
        assert!(evaluate(&q, &tags(&["web"])));
        assert!(!evaluate(&q, &tags(&["web", "api"])));
        assert!(evaluate(&q, &tags(&["web", "db"])));
    }

    #[test]
    fn unknown_operator_is_tolerant_false() {
        let q = TagQuery::Unknown(serde_json::json!({"$future": "x"}));
        assert!(!evaluate(&q, &tags(&["web"])));
        assert!(!validate(&q).ok);
    }

    #[test]
    fn roundtrip_serialization() {
        let q = TagQuery::And(vec![
            TagQuery::Tag("web".to_string()),
            TagQuery::Not(Box::new(TagQuery::Tag("api".to_string()))),
        ]);
        let json = serde_json::to_string(&q).unwrap();
        let back: TagQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(q, back);
    }

    #[test]
    fn string_to_query_splits_and_trims() {
        let q = string_to_query(" web , api ,, ", Strategy::Or);
        assert_eq!(
            q,
            TagQuery::Or(vec![TagQuery::Tag("web".to_string()), TagQuery::Tag("api".to_string())])
        );
    }

    #[test]
    fn query_to_string_is_human_readable() {
        let q = TagQuery::Or(vec![TagQuery::Tag("a".to_string()), TagQuery::Tag("b".to_string())]);
        assert_eq!(query_to_string(&q), "a OR b");
    }

    #[test]
    fn non_array_operator_body_rejected_on_parse() {
        let json = serde_json::json!({"$or": "not-an-array"});
        let err = serde_json::from_value::<TagQuery>(json).unwrap_err();
        assert!(err.to_string().contains("array"));
    }
}
