//! Server Lifecycle / Config View (C8)
//!
//! Materializes, per session, the "what is configured" view: statically
//! declared servers minus any name colliding with a template that matched
//! this session's filter, plus the matched template entries themselves.

use std::collections::HashSet;

use tracing::warn;

use crate::aggregator::server_config::ServerConfigEntry;
use crate::aggregator::tags::filter;
use crate::aggregator::tags::query::TagQuery;

/// The static and template-backed server sets visible to one session.
#[derive(Debug, Clone, Default)]
pub struct ConfigView {
    /// Statically declared servers, collision-free against matched templates.
    pub static_servers: Vec<(String, ServerConfigEntry)>,
    /// Templates matching the session's filter, in declared order.
    pub template_servers: Vec<(String, ServerConfigEntry)>,
}

/// `materialize`'s full result, including any conflict warning produced.
#[derive(Debug, Clone, Default)]
pub struct ConfigViewResult {
    /// The computed view.
    pub view: ConfigView,
    /// Human-readable warnings (one aggregated collision warning, if any).
    pub warnings: Vec<String>,
}

/// Build a session's config view (§4.8).
///
/// `static_entries` and `template_entries` are the full declared sets;
/// disabled entries are dropped from both. A single aggregated warning
/// lists every static name dropped for colliding with a matched template.
#[must_use]
pub fn materialize(
    static_entries: &[(String, ServerConfigEntry)],
    template_entries: &[(String, ServerConfigEntry)],
    filter_query: &TagQuery,
) -> ConfigViewResult {
    let matches = filter::get_matching_templates(template_entries, filter_query);
    let matched_names: HashSet<&str> = matches.iter().map(|(name, _)| *name).collect();

    let mut collisions = Vec::new();
    let static_servers: Vec<(String, ServerConfigEntry)> = static_entries
        .iter()
        .filter(|(_, cfg)| !cfg.disabled)
        .filter(|(name, _)| {
            if matched_names.contains(name.as_str()) {
                collisions.push(name.clone());
                false
            } else {
                true
            }
        })
        .cloned()
        .collect();

    let mut warnings = Vec::new();
    if !collisions.is_empty() {
        collisions.sort();
        let message = format!("static/template name collision(s), static entries dropped: {collisions:?}");
        warn!(names = ?collisions, "{message}");
        warnings.push(message);
    }

    let template_servers = matches.into_iter().map(|(name, cfg)| (name.to_string(), cfg.clone())).collect();

    ConfigViewResult {
        view: ConfigView {
            static_servers,
            template_servers,
        },
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::server_config::TransportConfig;
    use std::collections::HashMap;

    fn entry(tag: &str, disabled: bool) -> ServerConfigEntry {
        ServerConfigEntry {
            transport: TransportConfig::Http {
                url: "http://x".to_string(),
                headers: HashMap::new(),
            },
            tags: [tag.to_string()].into_iter().collect(),
            disabled,
            timeout: None,
            template: None,
            metadata: None,
        }
    }

    #[test]
    fn colliding_static_entry_is_dropped_with_warning() {
        let statics = vec![("fs".to_string(), entry("x", false))];
        let mut template = entry("web", false);
        template.template = Some(crate::aggregator::server_config::TemplatePolicy::default());
        let templates = vec![("fs".to_string(), template)];

        let result = materialize(&statics, &templates, &TagQuery::Tag("web".to_string()));
        assert!(result.view.static_servers.is_empty());
        assert_eq!(result.view.template_servers.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("fs"));
    }

    #[test]
    fn non_colliding_entries_pass_through() {
        let statics = vec![("db".to_string(), entry("x", false)), ("disabled".to_string(), entry("x", true))];
        let templates = vec![];
        let result = materialize(&statics, &templates, &TagQuery::Empty);
        assert_eq!(result.view.static_servers.len(), 1);
        assert_eq!(result.view.static_servers[0].0, "db");
        assert!(result.warnings.is_empty());
    }
}
