//! Tab title normalization
//!
//! Titles reach a tab from several sources that race each other: the
//! placeholder set at navigation start, URL-derived guesses pushed by the
//! engine, the page's real `<title>`, and an HTTP title lookup. The helpers
//! here decide which of them is worth keeping.

use scraper::{Html, Selector};
use url::Url;

/// URL of a tab with no render surface attached
pub const BLANK_URL: &str = "about:blank";

/// Title of a fresh `about:blank` tab
pub const DEFAULT_TAB_TITLE: &str = "New Tab";

/// Transient title shown while a navigation is in flight
pub const LOADING_TITLE: &str = "Loading...";

/// Placeholder and brand titles that say nothing about the page
const GENERIC_TITLES: &[&str] = &[
    DEFAULT_TAB_TITLE,
    "Untitled",
    "Yandex",
    "Google",
    "GitHub",
    "Microsoft Bing",
    LOADING_TITLE,
    "Loading",
];

const LOADING_TITLES: &[&str] = &[LOADING_TITLE, "Loading"];

/// Longest single word still considered generic
const SHORT_WORD_LIMIT: usize = 6;

/// Whether `url` is an internal `about:` page (no history, no favicon)
pub fn is_special_url(url: &str) -> bool {
    url.starts_with("about:")
}

/// Heuristic: does `title` carry no information beyond what the URL already says?
///
/// A title is generic if it is empty, a known placeholder or brand string,
/// echoes the page host name (or its first label), or is a single short word.
/// Pages genuinely titled with one short word ("Search") are misjudged.
pub fn is_generic_title(title: &str, url: &str) -> bool {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return true;
    }

    if GENERIC_TITLES.contains(&trimmed) {
        return true;
    }

    if let Some(host) = Url::parse(url).ok().as_ref().and_then(Url::host_str) {
        let host = host.strip_prefix("www.").unwrap_or(host);
        let first_label = host.split('.').next().unwrap_or(host);
        if trimmed.eq_ignore_ascii_case(host) || trimmed.eq_ignore_ascii_case(first_label) {
            return true;
        }
    }

    !trimmed.contains(' ') && trimmed.chars().count() <= SHORT_WORD_LIMIT
}

pub fn is_loading_placeholder(title: &str) -> bool {
    LOADING_TITLES.contains(&title.trim())
}

/// Title-update policy.
///
/// A candidate replaces `current` only if it is a real, different string and
/// either carries information itself or replaces something that does not.
/// A generic candidate may overwrite a generic or loading title, never a good one.
pub fn should_adopt_title(current: &str, candidate: &str, url: &str) -> bool {
    if candidate.trim().is_empty() || candidate == "undefined" || candidate == "null" {
        return false;
    }

    if candidate == current {
        return false;
    }

    !is_generic_title(candidate, url)
        || is_generic_title(current, url)
        || is_loading_placeholder(current)
}

/// Decode HTML character references (`&amp;`, `&#1040;`, `&#x41;`) in a title
/// reported by injected page scripts.
pub fn decode_html_entities(raw: &str) -> String {
    if !has_entity(raw) {
        return raw.to_string();
    }

    // Textarea content is parsed as RCDATA: references are decoded, tags are not.
    // `<` is escaped so a literal `</textarea>` cannot end the element early.
    let escaped = raw.replace('<', "&lt;");
    let fragment = Html::parse_fragment(&format!("<textarea>{}</textarea>", escaped));
    let decoded = Selector::parse("textarea").ok().and_then(|selector| {
        fragment
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>())
    });

    decoded.unwrap_or_else(|| raw.to_string())
}

/// Matches `&[#a-zA-Z0-9]+;` anywhere in the string
fn has_entity(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'&' {
            let mut j = i + 1;
            while j < bytes.len() && (bytes[j] == b'#' || bytes[j].is_ascii_alphanumeric()) {
                j += 1;
            }
            if j > i + 1 && j < bytes.len() && bytes[j] == b';' {
                return true;
            }
        }
        i += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_placeholders() {
        assert!(is_generic_title("", "https://example.com"));
        assert!(is_generic_title("   ", "https://example.com"));
        assert!(is_generic_title("New Tab", "about:blank"));
        assert!(is_generic_title("Microsoft Bing", "https://www.bing.com"));
        assert!(is_generic_title("Loading...", "https://example.com"));
    }

    #[test]
    fn test_generic_host_echo() {
        // The host is compared with `www.` stripped
        assert!(!is_generic_title("www.example.org", "https://www.example.org/a"));
        assert!(is_generic_title("example.org", "https://www.example.org/a"));
        assert!(is_generic_title("EXAMPLE", "https://www.example.org/a"));
        assert!(is_generic_title("Wikipedia", "https://wikipedia.org/wiki/Rust"));
    }

    #[test]
    fn test_short_single_word() {
        assert!(is_generic_title("Search", "https://example.com"));
        assert!(!is_generic_title("Searching", "https://example.com"));
        assert!(!is_generic_title("My Custom Page", "https://github.com"));
    }

    #[test]
    fn test_loading_placeholder() {
        assert!(is_loading_placeholder("Loading..."));
        assert!(is_loading_placeholder(" Loading "));
        assert!(!is_loading_placeholder("New Tab"));
    }

    #[test]
    fn test_policy_rejects_equal_titles() {
        assert!(!should_adopt_title("Loading...", "Loading...", "https://github.com"));
    }

    #[test]
    fn test_policy_generic_replaces_loading() {
        assert!(should_adopt_title("Loading...", "GitHub", "https://github.com"));
    }

    #[test]
    fn test_policy_generic_never_replaces_good_title() {
        assert!(!should_adopt_title("My Custom Page", "GitHub", "https://github.com"));
    }

    #[test]
    fn test_policy_good_replaces_good() {
        assert!(should_adopt_title(
            "Issues · rust-lang/rust",
            "Pull requests · rust-lang/rust",
            "https://github.com/rust-lang/rust"
        ));
    }

    #[test]
    fn test_policy_rejects_junk() {
        assert!(!should_adopt_title("Loading...", "", "https://a.test"));
        assert!(!should_adopt_title("Loading...", "   ", "https://a.test"));
        assert!(!should_adopt_title("Loading...", "undefined", "https://a.test"));
        assert!(!should_adopt_title("Loading...", "null", "https://a.test"));
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_html_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_html_entities("&#1040;&#1041;"), "АБ");
        assert_eq!(decode_html_entities("&#x41;BC"), "ABC");
        assert_eq!(decode_html_entities("&lt;b&gt; tag"), "<b> tag");
    }

    #[test]
    fn test_decode_keeps_markup_text() {
        assert_eq!(
            decode_html_entities("Fish &amp; Chips </textarea> Menu"),
            "Fish & Chips </textarea> Menu"
        );
        assert_eq!(decode_html_entities("<i>A</i> &amp; B"), "<i>A</i> & B");
    }

    #[test]
    fn test_decode_leaves_plain_text() {
        assert_eq!(decode_html_entities("Fish & Chips"), "Fish & Chips");
        assert_eq!(decode_html_entities("Plain title"), "Plain title");
    }

    #[test]
    fn test_special_urls() {
        assert!(is_special_url("about:blank"));
        assert!(is_special_url("about:settings"));
        assert!(!is_special_url("https://about.me"));
    }
}
