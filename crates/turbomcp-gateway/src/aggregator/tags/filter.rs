//! Preset & Template Filter (C4)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::aggregator::error::{AggregatorError, AggregatorResult};
use crate::aggregator::presets::PresetStore;
use crate::aggregator::server_config::ServerConfigEntry;
use crate::aggregator::tags::query::{self, Strategy, TagQuery};

/// Three-valued selection state for one tag (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagSelectionState {
    /// Ignored when building the query.
    Empty,
    /// Must match.
    Selected,
    /// Must not match.
    NotSelected,
}

/// How an inbound session's filter criteria resolve to a [`TagQuery`] (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagFilterMode {
    /// Any of the listed tags (`$or`).
    Any,
    /// All of the listed tags (`$and`).
    All,
    /// Caller-supplied query structure, used verbatim after validation.
    Advanced,
    /// Resolve by stored preset name.
    Preset,
}

/// An inbound session's raw filter criteria, as received at connect time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Tags for `any`/`all` modes.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Filter mode.
    pub tag_filter_mode: Option<TagFilterMode>,
    /// Preset name, required when `tag_filter_mode == preset`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_name: Option<String>,
    /// Explicit query, required when `tag_filter_mode == advanced`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_query: Option<TagQuery>,
}

/// Resolve a session's filter criteria into a final [`TagQuery`] (§4.4).
///
/// # Errors
/// Returns [`AggregatorError::NotFound`] if `preset_name` doesn't resolve,
/// and [`AggregatorError::InputInvalid`] for a missing/invalid advanced query.
pub fn resolve_filter(criteria: &FilterCriteria, presets: &PresetStore) -> AggregatorResult<TagQuery> {
    match criteria.tag_filter_mode.unwrap_or(TagFilterMode::Any) {
        TagFilterMode::Preset => {
            let name = criteria
                .preset_name
                .as_deref()
                .ok_or_else(|| AggregatorError::InputInvalid("preset mode requires preset_name".to_string()))?;
            presets
                .get(name)
                .map(|p| p.tag_query)
                .ok_or_else(|| AggregatorError::NotFound(format!("preset '{name}'")))
        }
        TagFilterMode::Any => Ok(query::string_to_query(&criteria.tags.join(","), Strategy::Or)),
        TagFilterMode::All => Ok(query::string_to_query(&criteria.tags.join(","), Strategy::And)),
        TagFilterMode::Advanced => {
            let q = criteria
                .advanced_query
                .clone()
                .ok_or_else(|| AggregatorError::InputInvalid("advanced mode requires advanced_query".to_string()))?;
            let v = query::validate(&q);
            if !v.ok {
                return Err(AggregatorError::InputInvalid(v.errors.join("; ")));
            }
            Ok(q)
        }
    }
}

/// Build a [`TagQuery`] from three-state per-tag selections (§4.3 "Three-state build").
#[must_use]
pub fn build_query_from_selections(
    selections: &HashMap<String, TagSelectionState>,
    strategy: Strategy,
) -> TagQuery {
    let mut selected: Vec<&String> = selections
        .iter()
        .filter(|(_, s)| **s == TagSelectionState::Selected)
        .map(|(t, _)| t)
        .collect();
    selected.sort();
    let mut not_selected: Vec<&String> = selections
        .iter()
        .filter(|(_, s)| **s == TagSelectionState::NotSelected)
        .map(|(t, _)| t)
        .collect();
    not_selected.sort();

    let positive = if selected.is_empty() {
        None
    } else if selected.len() == 1 {
        Some(TagQuery::Tag(selected[0].clone()))
    } else {
        let tags: Vec<TagQuery> = selected.into_iter().map(|t| TagQuery::Tag(t.clone())).collect();
        Some(match strategy {
            Strategy::And => TagQuery::And(tags),
            _ => TagQuery::Or(tags),
        })
    };

    let negatives: Vec<TagQuery> = not_selected
        .into_iter()
        .map(|t| TagQuery::Not(Box::new(TagQuery::Tag(t.clone()))))
        .collect();

    match (positive, negatives.is_empty()) {
        (Some(p), true) => p,
        (Some(p), false) => {
            let mut terms = vec![p];
            terms.extend(negatives);
            TagQuery::And(terms)
        }
        (None, false) => TagQuery::And(negatives),
        (None, true) => TagQuery::Empty,
    }
}

/// Select template entries whose tags satisfy `query`, in declared order (§4.4).
///
/// Disabled entries never match; order is preserved because it determines
/// tool-namespace allocation downstream (C9).
#[must_use]
pub fn get_matching_templates<'a>(
    templates: &'a [(String, ServerConfigEntry)],
    query: &TagQuery,
) -> Vec<(&'a str, &'a ServerConfigEntry)> {
    templates
        .iter()
        .filter(|(_, cfg)| !cfg.disabled)
        .filter(|(_, cfg)| query::evaluate(query, &cfg.tags))
        .map(|(name, cfg)| (name.as_str(), cfg))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_state_build_matches_boundary_scenario() {
        let mut sel = HashMap::new();
        sel.insert("web".to_string(), TagSelectionState::Selected);
        sel.insert("api".to_string(), TagSelectionState::NotSelected);
        let q = build_query_from_selections(&sel, Strategy::Or);

        let tags_web: std::collections::HashSet<String> = ["web".to_string()].into_iter().collect();
        let tags_web_api: std::collections::HashSet<String> =
            ["web".to_string(), "api".to_string()].into_iter().collect();
        let tags_web_db: std::collections::HashSet<String> =
            ["web".to_string(), "db".to_string()].into_iter().collect();

        assert!(query::evaluate(&q, &tags_web));
        assert!(!query::evaluate(&q, &tags_web_api));
        assert!(query::evaluate(&q, &tags_web_db));
    }

    #[test]
    fn no_selections_matches_nothing() {
        let q = build_query_from_selections(&HashMap::new(), Strategy::Or);
        assert_eq!(q, TagQuery::Empty);
    }

    #[test]
    fn negatives_only_wraps_in_and() {
        let mut sel = HashMap::new();
        sel.insert("api".to_string(), TagSelectionState::NotSelected);
        let q = build_query_from_selections(&sel, Strategy::Or);
        assert!(matches!(q, TagQuery::And(_)));
    }

    #[test]
    fn matching_templates_preserve_order_and_skip_disabled() {
        use crate::aggregator::server_config::TransportConfig;
        let mk = |name: &str, tag: &str, disabled: bool| {
            (
                name.to_string(),
                ServerConfigEntry {
                    transport: TransportConfig::Http {
                        url: "http://x".into(),
                        headers: Default::default(),
                    },
                    tags: [tag.to_string()].into_iter().collect(),
                    disabled,
                    timeout: None,
                    template: None,
                    metadata: None,
                },
            )
        };
        let templates = vec![mk("a", "web", false), mk("b", "web", true), mk("c", "web", false)];
        let q = TagQuery::Tag("web".to_string());
        let matches = get_matching_templates(&templates, &q);
        assert_eq!(matches.iter().map(|(n, _)| *n).collect::<Vec<_>>(), vec!["a", "c"]);
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    const CANDIDATE_TAGS: [&str; 4] = ["web", "api", "db", "cache"];

    fn selection_strategy() -> impl Strategy<Value = HashMap<String, TagSelectionState>> {
        proptest::collection::vec(
            prop_oneof![
                Just(TagSelectionState::Empty),
                Just(TagSelectionState::Selected),
                Just(TagSelectionState::NotSelected),
            ],
            CANDIDATE_TAGS.len(),
        )
        .prop_map(|states| {
            CANDIDATE_TAGS
                .iter()
                .zip(states)
                .map(|(t, s)| ((*t).to_string(), s))
                .collect()
        })
    }

    fn tag_set_strategy() -> impl Strategy<Value = HashSet<String>> {
        proptest::collection::vec(any::<bool>(), CANDIDATE_TAGS.len()).prop_map(|present| {
            CANDIDATE_TAGS
                .iter()
                .zip(present)
                .filter(|(_, present)| *present)
                .map(|(t, _)| (*t).to_string())
                .collect()
        })
    }

    proptest! {
        // Invariant 5 (§8): evaluate(buildQueryFromSelections(sel, strategy), tags)
        // equals the intended three-state truth table of `sel` against `tags`,
        // for any selection map and any candidate tag set.
        #[test]
        fn three_state_query_matches_truth_table_for_any_input(
            selections in selection_strategy(),
            tags in tag_set_strategy(),
            strategy in prop_oneof![Just(Strategy::Or), Just(Strategy::And)],
        ) {
            let q = build_query_from_selections(&selections, strategy);
            let actual = query::evaluate(&q, &tags);

            let selected: Vec<&String> = selections
                .iter()
                .filter(|(_, s)| **s == TagSelectionState::Selected)
                .map(|(t, _)| t)
                .collect();
            let not_selected: Vec<&String> = selections
                .iter()
                .filter(|(_, s)| **s == TagSelectionState::NotSelected)
                .map(|(t, _)| t)
                .collect();

            let positive_ok = if selected.is_empty() {
                None
            } else {
                Some(match strategy {
                    Strategy::And => selected.iter().all(|t| tags.contains(*t)),
                    _ => selected.iter().any(|t| tags.contains(*t)),
                })
            };
            let negative_ok = not_selected.iter().all(|t| !tags.contains(*t));

            let expected = match positive_ok {
                Some(p) => p && negative_ok,
                None => !not_selected.is_empty() && negative_ok,
            };

            prop_assert_eq!(actual, expected);
        }
    }
}
