//! Derived URL generation and parsing (§6 "Derived URLs")
//!
//! A derived URL carries exactly one filtering parameter, in priority
//! order `preset` > `tag-filter` > `tags`; parsing recovers at most one,
//! preferring `preset` when several are present.

use url::Url;

/// A derived URL's recovered filter, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlFilter {
    /// `?preset=<name>`.
    Preset(String),
    /// `?tag-filter=<urlencoded query>`.
    TagFilter(String),
    /// `?tags=<comma-joined, urlencoded>`.
    Tags(Vec<String>),
}

/// Append a `preset` filter parameter to `base`.
///
/// # Errors
/// Returns an error string if `base` isn't a valid URL.
pub fn generate_preset_url(base: &str, preset_name: &str) -> Result<String, String> {
    append_param(base, "preset", preset_name)
}

/// Append a `tag-filter` filter parameter to `base`. `tag_filter_json` is
/// expected to already be a serialized query expression.
///
/// # Errors
/// Returns an error string if `base` isn't a valid URL.
pub fn generate_tag_filter_url(base: &str, tag_filter_json: &str) -> Result<String, String> {
    append_param(base, "tag-filter", tag_filter_json)
}

/// Append a comma-joined `tags` filter parameter to `base`.
///
/// # Errors
/// Returns an error string if `base` isn't a valid URL.
pub fn generate_tags_url(base: &str, tags: &[String]) -> Result<String, String> {
    append_param(base, "tags", &tags.join(","))
}

/// `Url::query_pairs_mut().append_pair` percent-encodes `value` itself (the
/// form-urlencoded serializer); callers must pass the raw, un-encoded value
/// or it gets encoded twice and `parse_url` recovers the once-encoded form.
fn append_param(base: &str, key: &str, value: &str) -> Result<String, String> {
    let mut url = Url::parse(base).map_err(|e| e.to_string())?;
    url.query_pairs_mut().append_pair(key, value);
    Ok(url.to_string())
}

/// Recover at most one filter from a derived URL, `preset` winning ties.
#[must_use]
pub fn parse_url(url: &str) -> Option<UrlFilter> {
    let parsed = Url::parse(url).ok()?;
    let mut preset = None;
    let mut tag_filter = None;
    let mut tags = None;
    for (k, v) in parsed.query_pairs() {
        match k.as_ref() {
            "preset" => preset = Some(v.into_owned()),
            "tag-filter" => tag_filter = Some(v.into_owned()),
            "tags" => tags = Some(v.into_owned()),
            _ => {}
        }
    }
    if let Some(name) = preset {
        return Some(UrlFilter::Preset(name));
    }
    if let Some(expr) = tag_filter {
        return Some(UrlFilter::TagFilter(expr));
    }
    tags.map(|joined| {
        UrlFilter::Tags(joined.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_round_trips() {
        let url = generate_preset_url("https://gw.example/mcp", "web-only").unwrap();
        assert_eq!(parse_url(&url), Some(UrlFilter::Preset("web-only".to_string())));
    }

    #[test]
    fn preset_wins_when_multiple_present() {
        let base = "https://gw.example/mcp?tags=a%2Cb&preset=web-only";
        assert_eq!(parse_url(base), Some(UrlFilter::Preset("web-only".to_string())));
    }

    #[test]
    fn preset_round_trips_with_reserved_chars() {
        let url = generate_preset_url("https://gw.example/mcp", "a b/c").unwrap();
        assert_eq!(parse_url(&url), Some(UrlFilter::Preset("a b/c".to_string())));
    }

    #[test]
    fn tags_split_and_trim() {
        let url = generate_tags_url("https://gw.example/mcp", &["web".to_string(), "api".to_string()]).unwrap();
        assert_eq!(
            parse_url(&url),
            Some(UrlFilter::Tags(vec!["web".to_string(), "api".to_string()]))
        );
    }
}
