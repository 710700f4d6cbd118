//! Tag-based filtering and routing (C3 + C4).

pub mod filter;
pub mod query;

pub use filter::{build_query_from_selections, get_matching_templates, resolve_filter, FilterCriteria, TagFilterMode, TagSelectionState};
pub use query::{evaluate, query_to_string, string_to_query, validate, Strategy, TagQuery, ValidationResult};
