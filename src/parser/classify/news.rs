use std::sync::LazyLock;

use regex::Regex;

use super::{is_noise, Line, Rule};
use crate::parser::links::{extract_first_link, hostname_of, remove_first_link, strip_markup_markers};

static NUMBERED_BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\*\*(\d+)\.\s*(.+?)\*\*\s*$").unwrap());
static NUMBERED_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\*\*\d+\.").unwrap());
static BOLD_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\*\*(.+?)\*\*\s*$").unwrap());
static BULLET_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s+\[([^\]]+)\]\(([^)]+)\)(?:\s*[：:]\s*(.*))?").unwrap());
static BULLET_BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-\s+\*\*(.+?)\*\*\s*[—–-]+\s*(.*)").unwrap());
static BULLET_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-\s+(.+)").unwrap());
static STANDALONE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[([^\]]*)\]\(([^)]+)\)\s*$").unwrap());
static BARE_URL_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(https?://\S+)\s*$").unwrap());
static TRAILING_DASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[—–-]+\s*$").unwrap());

/// News record under construction. Markup is stripped when it is closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsDraft {
    pub title: String,
    pub description: String,
    pub url: Option<String>,
}

impl NewsDraft {
    fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    fn linked(title: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            url: Some(url.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsStep {
    Skip,
    /// Close the open record and start this one.
    Open(NewsDraft),
    /// Close the open record and emit a group heading.
    Group(String),
    /// Extend the open record's description; `url` fills a missing URL.
    Append { text: String, url: Option<String> },
    /// Set the open record's URL when it has none.
    AttachUrl(String),
}

pub static RULES: &[Rule<NewsDraft, NewsStep>] = &[
    Rule { name: "noise", classify: noise },
    Rule { name: "numbered_title", classify: numbered_title },
    Rule { name: "group_title", classify: group_title },
    Rule { name: "bold_title", classify: bold_title },
    Rule { name: "bullet_link", classify: bullet_link },
    Rule { name: "bullet_bold", classify: bullet_bold },
    Rule { name: "bullet_text", classify: bullet_text },
    Rule { name: "standalone_link", classify: standalone_link },
    Rule { name: "bare_url", classify: bare_url },
    Rule { name: "continuation", classify: continuation },
];

fn noise(line: &Line<'_>, _: Option<&NewsDraft>) -> Option<NewsStep> {
    is_noise(line.text).then_some(NewsStep::Skip)
}

// **3. Title**
fn numbered_title(line: &Line<'_>, _: Option<&NewsDraft>) -> Option<NewsStep> {
    let caps = NUMBERED_BOLD_RE.captures(line.text)?;
    Some(NewsStep::Open(NewsDraft::titled(&caps[2])))
}

fn bold_text<'a>(line: &Line<'a>) -> Option<&'a str> {
    if NUMBERED_PREFIX_RE.is_match(line.text) {
        return None;
    }
    BOLD_ONLY_RE
        .captures(line.text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// A bold-only line introducing a bullet list labels a group rather than an item.
fn group_title(line: &Line<'_>, _: Option<&NewsDraft>) -> Option<NewsStep> {
    let label = bold_text(line)?;
    let next = line.next_non_empty()?;
    next.starts_with('-').then(|| NewsStep::Group(label.to_string()))
}

fn bold_title(line: &Line<'_>, _: Option<&NewsDraft>) -> Option<NewsStep> {
    bold_text(line).map(|title| NewsStep::Open(NewsDraft::titled(title)))
}

// - [Title](url): description
fn bullet_link(line: &Line<'_>, _: Option<&NewsDraft>) -> Option<NewsStep> {
    let caps = BULLET_LINK_RE.captures(line.text)?;
    let mut draft = NewsDraft::linked(&caps[1], &caps[2]);
    if let Some(desc) = caps.get(3) {
        draft.description = desc.as_str().to_string();
    }
    Some(NewsStep::Open(draft))
}

// - **Title** — [host](url)
fn bullet_bold(line: &Line<'_>, _: Option<&NewsDraft>) -> Option<NewsStep> {
    let caps = BULLET_BOLD_RE.captures(line.text)?;
    let mut draft = NewsDraft::titled(&caps[1]);
    draft.url = extract_first_link(&caps[2]).map(|l| l.url);
    Some(NewsStep::Open(draft))
}

fn bullet_text(line: &Line<'_>, open: Option<&NewsDraft>) -> Option<NewsStep> {
    let caps = BULLET_TEXT_RE.captures(line.text)?;
    let text = &caps[1];
    let link = extract_first_link(text);
    let step = match (link, open) {
        (Some(link), None) => {
            let without_link = remove_first_link(text);
            let title = TRAILING_DASH_RE.replace(&without_link, "");
            NewsStep::Open(NewsDraft::linked(&strip_markup_markers(&title), &link.url))
        }
        (link, Some(_)) => NewsStep::Append {
            text: text.to_string(),
            url: link.map(|l| l.url),
        },
        (None, None) => NewsStep::Skip,
    };
    Some(step)
}

fn standalone_link(line: &Line<'_>, open: Option<&NewsDraft>) -> Option<NewsStep> {
    let caps = STANDALONE_LINK_RE.captures(line.text)?;
    let url = &caps[2];
    match open {
        Some(draft) if draft.url.is_none() => Some(NewsStep::AttachUrl(url.to_string())),
        _ => {
            let title = match &caps[1] {
                "" => hostname_of(url),
                label => label.to_string(),
            };
            Some(NewsStep::Open(NewsDraft::linked(&title, url)))
        }
    }
}

fn bare_url(line: &Line<'_>, open: Option<&NewsDraft>) -> Option<NewsStep> {
    let caps = BARE_URL_LINE_RE.captures(line.text)?;
    match open {
        Some(draft) if draft.url.is_none() => Some(NewsStep::AttachUrl(caps[1].to_string())),
        _ => Some(NewsStep::Skip),
    }
}

fn continuation(line: &Line<'_>, open: Option<&NewsDraft>) -> Option<NewsStep> {
    open?;
    Some(NewsStep::Append {
        text: line.text.to_string(),
        url: None,
    })
}
