use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static MD_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").unwrap());
static BARE_URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// Hosts whose links count as social posts or profiles.
pub const SOCIAL_HOSTS: &[&str] = &["x.com", "twitter.com"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Empty for bare URLs.
    pub label: String,
    pub url: String,
}

/// First `[label](url)` in `text`, else the first bare `http(s)://` token.
pub fn extract_first_link(text: &str) -> Option<Link> {
    if let Some(caps) = MD_LINK_RE.captures(text) {
        return Some(Link {
            label: caps[1].to_string(),
            url: caps[2].to_string(),
        });
    }
    bare_url(text)
}

/// Every markdown link in `text`; falls back to the first bare URL.
pub fn extract_all_links(text: &str) -> Vec<Link> {
    let links: Vec<Link> = MD_LINK_RE
        .captures_iter(text)
        .map(|caps| Link {
            label: caps[1].to_string(),
            url: caps[2].to_string(),
        })
        .collect();
    if links.is_empty() {
        return bare_url(text).into_iter().collect();
    }
    links
}

fn bare_url(text: &str) -> Option<Link> {
    BARE_URL_RE.find(text).map(|m| Link {
        label: String::new(),
        url: m.as_str().to_string(),
    })
}

/// Remove the first markdown link from `text`.
pub fn remove_first_link(text: &str) -> Cow<'_, str> {
    MD_LINK_RE.replace(text, "")
}

/// Host of an absolute URL with one leading `www.` removed; empty when `url` does not parse.
pub fn hostname_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.strip_prefix("www.").unwrap_or(h).to_string()))
        .unwrap_or_default()
}

pub fn is_social_url(url: &str) -> bool {
    let host = hostname_of(url);
    SOCIAL_HOSTS.contains(&host.as_str())
}

/// Drop link syntax (keeping the label), bold, italic and inline-code markers, then trim.
///
/// Markers can nest (`[[a](b)](c)`), so passes repeat until nothing changes. This makes the
/// function idempotent.
pub fn strip_markup_markers(text: &str) -> String {
    let mut current = text.trim().to_string();
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(text: &str) -> String {
    let s = MD_LINK_RE.replace_all(text, "$1");
    let s = BOLD_RE.replace_all(&s, "$1");
    let s = ITALIC_RE.replace_all(&s, "$1");
    let s = CODE_RE.replace_all(&s, "$1");
    s.trim().to_string()
}

/// Escape `&`, `<`, `>` and `"` for text and attribute positions in generated HTML.
pub fn escape_for_markup(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hostname() {
        assert_eq!(hostname_of("https://www.example.com/a"), "example.com");
        assert_eq!(hostname_of("http://news.ycombinator.com/item?id=1"), "news.ycombinator.com");
        assert_eq!(hostname_of("https://www.www.example.com"), "www.example.com");
        assert_eq!(hostname_of("not a url"), "");
        assert_eq!(hostname_of(""), "");
        assert_eq!(hostname_of("mailto:a@b.c"), "");
    }

    #[test]
    fn first_link_prefers_markdown() {
        let l = extract_first_link("see https://bare.io and [Docs](https://docs.rs/x)").unwrap();
        assert_eq!(l.label, "Docs");
        assert_eq!(l.url, "https://docs.rs/x");

        let l = extract_first_link("see https://bare.io/path now").unwrap();
        assert_eq!(l.label, "");
        assert_eq!(l.url, "https://bare.io/path");

        assert!(extract_first_link("no links here").is_none());
    }

    #[test]
    fn all_links() {
        let links = extract_all_links("[a](https://a.com) and [b](https://b.com)");
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].url, "https://b.com");

        let links = extract_all_links("https://one.com https://two.com");
        assert_eq!(links, vec![Link { label: String::new(), url: "https://one.com".into() }]);

        assert!(extract_all_links("plain").is_empty());
    }

    #[test]
    fn strip_markup() {
        assert_eq!(strip_markup_markers("  **Bold** and *it* with `code` "), "Bold and it with code");
        assert_eq!(strip_markup_markers("read [the post](https://a.com/p)"), "read the post");
        assert_eq!(strip_markup_markers("[[a](b)](c)"), "a");
        assert_eq!(strip_markup_markers("2 * 3 = 6"), "2 * 3 = 6");
    }

    #[test]
    fn social_hosts() {
        assert!(is_social_url("https://x.com/alice/status/1"));
        assert!(is_social_url("https://www.twitter.com/alice"));
        assert!(!is_social_url("https://example.com/x.com"));
        assert!(!is_social_url("x.com/alice"));
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_for_markup("a < b & \"c\" > d"), "a &lt; b &amp; &quot;c&quot; &gt; d");
        assert!(matches!(escape_for_markup("plain 'text'"), Cow::Borrowed(_)));
    }

    proptest! {
        #[test]
        fn strip_markup_is_idempotent(s in r"[\[\]()*`a-z :/.\-]{0,40}") {
            let once = strip_markup_markers(&s);
            prop_assert_eq!(strip_markup_markers(&once), once);
        }

        #[test]
        fn hostname_never_panics(s in r"\PC{0,30}") {
            let _ = hostname_of(&s);
        }
    }
}
