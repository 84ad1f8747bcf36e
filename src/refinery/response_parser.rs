// * Turns raw provider text into fields: strict JSON first, heuristics second

use crate::refinery::markup::strip_markup;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static PATTERN_FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*?\})\s*```").expect("Invalid fenced JSON regex")
});

static PATTERN_BULLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*+\u{2022}]|\d+[.)])\s+(.+)$").expect("Invalid bullet regex")
});

static PATTERN_LABELED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\**([A-Za-z][A-Za-z _-]{1,30}?)\**\s*:\s*(.+)$").expect("Invalid label regex")
});

/// Extracts a JSON object from a fenced block or the outermost braces
pub fn extract_json_object(raw: &str) -> Option<Map<String, Value>> {
    if let Some(caps) = PATTERN_FENCED_JSON.captures(raw) {
        if let Some(map) = caps.get(1).and_then(|m| parse_object(m.as_str())) {
            return Some(map);
        }
    }

    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&raw[start..=end])
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// First non-empty string among `keys`
pub fn str_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// String list from an array, or from a comma-separated string
pub fn list_field(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Non-negative integer from a number or a string like `"5 min"`
pub fn u32_field(map: &Map<String, Value>, key: &str) -> Option<u32> {
    match map.get(key)? {
        Value::Number(n) => n.as_u64().map(|v| v.min(u32::MAX as u64) as u32),
        Value::String(s) => s
            .split(|c: char| !c.is_ascii_digit())
            .find(|part| !part.is_empty())
            .and_then(|digits| digits.parse().ok()),
        _ => None,
    }
}

/// Bullet or numbered list items
pub fn extract_bullets(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| PATTERN_BULLET.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| strip_markup(m.as_str())))
        .filter(|item| !item.is_empty())
        .collect()
}

/// Value of the first `Label: value` line whose label matches (case-insensitive)
pub fn extract_labeled_field(raw: &str, labels: &[&str]) -> Option<String> {
    raw.lines().find_map(|line| {
        let caps = PATTERN_LABELED.captures(line)?;
        let label = caps.get(1)?.as_str().trim().to_lowercase().replace(['_', '-'], " ");
        let wanted = labels
            .iter()
            .any(|l| l.to_lowercase().replace(['_', '-'], " ") == label);
        if wanted {
            caps.get(2)
                .map(|m| strip_markup(m.as_str()))
                .filter(|v| !v.is_empty())
        } else {
            None
        }
    })
}

/// Paragraphs that are neither list items nor labeled fields
pub fn prose_paragraphs(raw: &str) -> Vec<String> {
    raw.split("\n\n")
        .filter(|block| {
            let mut lines = block.lines().filter(|l| !l.trim().is_empty());
            match lines.next() {
                Some(first) => {
                    !PATTERN_BULLET.is_match(first) && !PATTERN_LABELED.is_match(first)
                }
                None => false,
            }
        })
        .map(strip_markup)
        .map(|p| p.replace('\n', " ").trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fenced_json() {
        let raw = "Here you go:\n```json\n{\"title\": \"Guide\", \"tags\": [\"a\"]}\n```\nThanks";
        let map = extract_json_object(raw).unwrap();
        assert_eq!(str_field(&map, &["title"]).as_deref(), Some("Guide"));
        assert_eq!(list_field(&map, "tags"), vec!["a"]);
    }

    #[test]
    fn test_extract_bare_json() {
        let map = extract_json_object("noise {\"headline\": \"Hi\"} trailing").unwrap();
        assert_eq!(str_field(&map, &["headline"]).as_deref(), Some("Hi"));
    }

    #[test]
    fn test_extract_json_rejects_non_object() {
        assert!(extract_json_object("no braces here").is_none());
        assert!(extract_json_object("{not json}").is_none());
    }

    #[test]
    fn test_str_field_alias_order() {
        let map = extract_json_object(r#"{"button": "", "button_text": "Go"}"#).unwrap();
        assert_eq!(str_field(&map, &["button", "button_text"]).as_deref(), Some("Go"));
    }

    #[test]
    fn test_list_field_from_csv() {
        let map = extract_json_object(r#"{"tags": "tile, grout ,  "}"#).unwrap();
        assert_eq!(list_field(&map, "tags"), vec!["tile", "grout"]);
    }

    #[test]
    fn test_u32_field_from_string() {
        let map = extract_json_object(r#"{"reading_time": "7 minutes", "n": 3}"#).unwrap();
        assert_eq!(u32_field(&map, "reading_time"), Some(7));
        assert_eq!(u32_field(&map, "n"), Some(3));
        assert_eq!(u32_field(&map, "missing"), None);
    }

    #[test]
    fn test_extract_bullets() {
        let bullets = extract_bullets("Intro\n- one\n* **two**\n3. three\nnot a bullet");
        assert_eq!(bullets, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_extract_labeled_field() {
        let raw = "Headline: Big Savings\nButton text: Shop now";
        assert_eq!(
            extract_labeled_field(raw, &["headline"]).as_deref(),
            Some("Big Savings")
        );
        assert_eq!(
            extract_labeled_field(raw, &["button_text"]).as_deref(),
            Some("Shop now")
        );
        assert!(extract_labeled_field(raw, &["summary"]).is_none());
    }

    #[test]
    fn test_prose_paragraphs_skip_lists() {
        let raw = "Title line\n\n- a\n- b\n\nSummary: x\n\nReal prose here.";
        assert_eq!(prose_paragraphs(raw), vec!["Title line", "Real prose here."]);
    }
}
