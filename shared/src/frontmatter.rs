//! Frontmatter extraction.
//!
//! A header is a block delimited by `---` lines at the very top of the file:
//!
//! ```text
//! ---
//! title: Scaling Teams
//! tags: [hiring, culture]
//! draft: false
//! ---
//!
//! Body starts here.
//! ```
//!
//! Parsing never fails. A missing header yields empty metadata and the whole
//! text as body; a header that is not a YAML mapping yields empty metadata.

use std::collections::BTreeMap;

use gray_matter::{engine::YAML, Matter};
use serde_json::Value;

const DELIMITER: &str = "---";

/// A scalar or list value from the header.
#[derive(Debug, Clone, PartialEq)]
pub enum FrontmatterValue {
    /// Plain string.
    String(String),
    /// Boolean.
    Bool(bool),
    /// Integer or float.
    Number(f64),
    /// Sequence of scalars, stringified.
    List(Vec<String>),
}

/// What was found at the top of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderState {
    /// No delimited header.
    #[default]
    Absent,
    /// Header present and parsed as a mapping (possibly empty).
    Parsed,
    /// Header present but not a YAML mapping.
    Malformed,
}

/// Split metadata and body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    /// Flattened header fields.
    pub metadata: BTreeMap<String, FrontmatterValue>,
    /// Markdown after the header.
    pub body: String,
    /// Whether a header was found and understood.
    pub header: HeaderState,
}

impl Frontmatter {
    /// Raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.metadata.get(key)
    }

    /// Non-empty trimmed string for `key`. Numbers and booleans are
    /// stringified so that `version: 2` still reads as `"2"`.
    pub fn get_string(&self, key: &str) -> Option<String> {
        let value = match self.get(key)? {
            FrontmatterValue::String(value) => value.trim().to_string(),
            FrontmatterValue::Bool(value) => value.to_string(),
            FrontmatterValue::Number(value) => format_number(*value),
            FrontmatterValue::List(_) => return None,
        };
        Some(value).filter(|value| !value.is_empty())
    }

    /// Boolean for `key`; accepts `true/false/yes/no` strings.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            FrontmatterValue::Bool(value) => Some(*value),
            FrontmatterValue::String(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            },
            FrontmatterValue::Number(value) => Some(*value != 0.0),
            FrontmatterValue::List(_) => None,
        }
    }

    /// Non-negative whole number for `key`; accepts numeric strings.
    pub fn get_u32(&self, key: &str) -> Option<u32> {
        let number = match self.get(key)? {
            FrontmatterValue::Number(value) => *value,
            FrontmatterValue::String(value) => value.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if !number.is_finite() || number < 0.0 || number > f64::from(u32::MAX) {
            return None;
        }
        Some(number.round() as u32)
    }

    /// List for `key`. A plain string is split on commas.
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        let items = match self.get(key)? {
            FrontmatterValue::List(items) => items
                .iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            FrontmatterValue::String(value) => value
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            _ => return None,
        };
        Some(items)
    }

    /// First key in `keys` that yields a string.
    pub fn first_string(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get_string(key))
    }

    /// First key in `keys` that yields a number.
    pub fn first_u32(&self, keys: &[&str]) -> Option<u32> {
        keys.iter().find_map(|key| self.get_u32(key))
    }

    /// First key in `keys` that yields a list.
    pub fn first_list(&self, keys: &[&str]) -> Option<Vec<String>> {
        keys.iter().find_map(|key| self.get_list(key))
    }
}

/// Split `text` into metadata and body.
pub fn parse_frontmatter(text: &str) -> Frontmatter {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if !has_delimited_header(text) {
        return Frontmatter {
            metadata: BTreeMap::new(),
            body: text.to_string(),
            header: HeaderState::Absent,
        };
    }

    let matter = Matter::<YAML>::new();
    let parsed = matter.parse(text);

    let empty_header = parsed.matter.trim().is_empty();
    let data = parsed.data.and_then(|pod| pod.deserialize::<Value>().ok());

    let (metadata, header) = match data {
        Some(Value::Object(map)) => {
            let metadata = map
                .into_iter()
                .filter_map(|(key, value)| convert_value(value).map(|value| (key, value)))
                .collect();
            (metadata, HeaderState::Parsed)
        },
        _ if empty_header => (BTreeMap::new(), HeaderState::Parsed),
        _ => {
            tracing::debug!("frontmatter header is not a YAML mapping; ignoring it");
            (BTreeMap::new(), HeaderState::Malformed)
        },
    };

    Frontmatter {
        metadata,
        body: parsed.content,
        header,
    }
}

/// Opening `---` line followed later by a closing `---` line.
fn has_delimited_header(text: &str) -> bool {
    let mut lines = text.lines();
    match lines.next() {
        Some(first) if first.trim_end() == DELIMITER => {},
        _ => return false,
    }
    lines.any(|line| line.trim_end() == DELIMITER)
}

fn convert_value(value: Value) -> Option<FrontmatterValue> {
    match value {
        Value::String(value) => Some(FrontmatterValue::String(value)),
        Value::Bool(value) => Some(FrontmatterValue::Bool(value)),
        Value::Number(value) => value.as_f64().map(FrontmatterValue::Number),
        Value::Array(items) => Some(FrontmatterValue::List(
            items.into_iter().filter_map(scalar_to_string).collect(),
        )),
        Value::Null | Value::Object(_) => None,
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(value) => Some(value),
        Value::Bool(value) => Some(value.to_string()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalars_and_lists() {
        let text = "---\ntitle: Scaling Teams\ntags:\n  - hiring\n  - culture\ndraft: \
                    true\nreading_time: 7\n---\n\n# Body\n\nText.";
        let parsed = parse_frontmatter(text);

        assert_eq!(parsed.header, HeaderState::Parsed);
        assert_eq!(parsed.get_string("title").as_deref(), Some("Scaling Teams"));
        assert_eq!(
            parsed.get_list("tags"),
            Some(vec!["hiring".to_string(), "culture".to_string()])
        );
        assert_eq!(parsed.get_bool("draft"), Some(true));
        assert_eq!(parsed.get_u32("reading_time"), Some(7));
        assert!(parsed.body.contains("# Body"));
        assert!(!parsed.body.contains("title:"));
    }

    #[test]
    fn missing_header_keeps_whole_text() {
        let text = "# Just markdown\n\nNo header here.";
        let parsed = parse_frontmatter(text);

        assert_eq!(parsed.header, HeaderState::Absent);
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.body, text);
    }

    #[test]
    fn unclosed_header_is_body() {
        let text = "---\ntitle: Dangling\n\nNo closing delimiter";
        let parsed = parse_frontmatter(text);

        assert_eq!(parsed.header, HeaderState::Absent);
        assert_eq!(parsed.body, text);
    }

    #[test]
    fn scalar_header_is_malformed_not_an_error() {
        let parsed = parse_frontmatter("---\njust a sentence\n---\nBody");

        assert_eq!(parsed.header, HeaderState::Malformed);
        assert!(parsed.metadata.is_empty());
        assert!(parsed.body.contains("Body"));
    }

    #[test]
    fn nested_maps_and_nulls_are_dropped() {
        let text = "---\ntitle: Keep\nseo:\n  og: nested\nsubtitle:\n---\nBody";
        let parsed = parse_frontmatter(text);

        assert!(parsed.get("seo").is_none());
        assert!(parsed.get("subtitle").is_none());
        assert_eq!(parsed.get_string("title").as_deref(), Some("Keep"));
    }

    #[test]
    fn typed_getters_tolerate_strings() {
        let text = "---\nfeatured: \"yes\"\nreading_time: \"12\"\ntags: rust, async , \
                    \nversion: 2\n---\nBody";
        let parsed = parse_frontmatter(text);

        assert_eq!(parsed.get_bool("featured"), Some(true));
        assert_eq!(parsed.get_u32("reading_time"), Some(12));
        assert_eq!(parsed.get_list("tags"), Some(vec!["rust".to_string(), "async".to_string()]));
        assert_eq!(parsed.get_string("version").as_deref(), Some("2"));
    }

    #[test]
    fn invalid_number_is_absent() {
        let parsed = parse_frontmatter("---\nreading_time: soon\n---\nBody");
        assert_eq!(parsed.get_u32("reading_time"), None);
    }

    #[test]
    fn first_string_follows_alias_order() {
        let parsed = parse_frontmatter("---\nsummary: From summary\n---\nBody");
        assert_eq!(
            parsed.first_string(&["excerpt", "summary"]).as_deref(),
            Some("From summary")
        );
    }
}
