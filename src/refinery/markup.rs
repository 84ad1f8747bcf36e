// * Markup stripping and grapheme-safe truncation for generated text fields

use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

const ELLIPSIS: &str = "...";

static PATTERN_HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("Invalid HTML tag regex"));

static PATTERN_MD_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]{0,3}#{1,6}[ \t]+").expect("Invalid heading regex"));

static PATTERN_MD_EMPHASIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\*\*|__|\*)([^*_\n]+?)(\*\*|__|\*)").expect("Invalid emphasis regex")
});

static PATTERN_MD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("Invalid link regex"));

static PATTERN_MD_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`+").expect("Invalid code regex"));

static PATTERN_MD_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*>[ \t]?").expect("Invalid quote regex"));

static PATTERN_INLINE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{00A0}]+").expect("Invalid whitespace regex"));

static PATTERN_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*(\n\s*)+").expect("Invalid blank line regex"));

/// Removes HTML tags and markdown decoration, keeping paragraph breaks
pub fn strip_markup(text: &str) -> String {
    let text = if PATTERN_HTML_TAG.is_match(text) {
        html_to_text(text)
    } else {
        text.to_string()
    };

    let text = PATTERN_MD_LINK.replace_all(&text, "$1");
    let text = PATTERN_MD_HEADING.replace_all(&text, "");
    let text = PATTERN_MD_EMPHASIS.replace_all(&text, "$2");
    let text = PATTERN_MD_CODE.replace_all(&text, "");
    let text = PATTERN_MD_QUOTE.replace_all(&text, "");
    let text = PATTERN_INLINE_SPACE.replace_all(&text, " ");
    let text = PATTERN_BLANK_LINES.replace_all(&text, "\n\n");

    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

// * Block-level closing tags become line breaks before the DOM text is collected
fn html_to_text(html: &str) -> String {
    let spaced = html
        .replace("</p>", "</p>\n\n")
        .replace("<br>", "\n")
        .replace("<br/>", "\n")
        .replace("<br />", "\n")
        .replace("</li>", "</li>\n")
        .replace("</h1>", "</h1>\n\n")
        .replace("</h2>", "</h2>\n\n")
        .replace("</h3>", "</h3>\n\n");

    let fragment = Html::parse_fragment(&spaced);
    fragment.root_element().text().collect::<Vec<_>>().join("")
}

/// Number of user-perceived characters
pub fn grapheme_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Cuts `text` to `budget` graphemes, ending in `...` when shortened
pub fn truncate_with_ellipsis(text: &str, budget: usize) -> String {
    if grapheme_len(text) <= budget {
        return text.to_string();
    }
    if budget <= ELLIPSIS.len() {
        return text.graphemes(true).take(budget).collect();
    }

    let mut out: String = text.graphemes(true).take(budget - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Strip markup, trim, then enforce the field budget
pub fn clean_field(text: &str, budget: usize) -> String {
    truncate_with_ellipsis(strip_markup(text).trim(), budget)
}

/// Cleans each item, drops empties and keeps at most `max_items`
pub fn clean_list(items: &[String], max_items: usize, item_budget: usize) -> Vec<String> {
    items
        .iter()
        .map(|item| clean_field(item, item_budget))
        .filter(|item| !item.is_empty())
        .take(max_items)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_exact_budget() {
        let text = "a".repeat(2000);
        let out = truncate_with_ellipsis(&text, 800);
        assert_eq!(out.chars().count(), 800);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("exact", 5), "exact");
    }

    #[test]
    fn test_truncate_grapheme_safe() {
        let text = "é".repeat(20);
        let out = truncate_with_ellipsis(&text, 10);
        assert_eq!(grapheme_len(&out), 10);
    }

    #[test]
    fn test_strip_markdown() {
        let out = strip_markup("## Title\n\nSome **bold** and [a link](https://x.y) with `code`.");
        assert_eq!(out, "Title\n\nSome bold and a link with code.");
    }

    #[test]
    fn test_strip_html() {
        let out = strip_markup("<p>First <b>para</b></p><p>Second</p>");
        assert!(out.starts_with("First para"));
        assert!(out.contains("Second"));
        assert!(!out.contains('<'));
    }

    #[test]
    fn test_clean_field_trims_then_truncates() {
        let out = clean_field("   **Headline that is long**   ", 10);
        assert_eq!(out, "Headlin...");
    }

    #[test]
    fn test_clean_list_limits() {
        let items: Vec<String> = vec!["one".into(), "".into(), "two".into(), "three".into()];
        assert_eq!(clean_list(&items, 2, 50), vec!["one", "two"]);
    }
}
