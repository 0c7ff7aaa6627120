use std::sync::LazyLock;

use regex::Regex;

use super::{is_noise, Line, Rule};
use crate::model::profile_url_for;
use crate::parser::links::{is_social_url, strip_markup_markers};

static NAME_PROFILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*\*(.+?)\*\*\s*\(?(https?://(?:www\.)?(?:x|twitter)\.com/([A-Za-z0-9_]+))\)?").unwrap()
});
static BOLD_HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:🔥)?\s*\*\*@?([A-Za-z0-9_]+)\s*[—–-]+\s*(.+?)\*\*").unwrap());
static BOLD_AT_HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:🔥)?\s*\*\*@([A-Za-z0-9_]+)\*\*\s*(.*)").unwrap());
static BOLD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*([A-Za-z0-9_][A-Za-z0-9_\s]*?)\*\*\s*(.*)").unwrap());
static BULLET_HANDLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-\s+\*\*@?([A-Za-z0-9_]+)\*\*\s*(.*)").unwrap());
static NUMBERED_HANDLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\s+\*\*@?([A-Za-z0-9_]+)\*\*\s*\(?(https?://[^\s)]+)\)?\s*[—–-]?\s*(.*)").unwrap()
});
static LINK_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[→\-]?\s*\[([^\]]*)\]\(([^)]+)\)").unwrap());
static BARE_LINK_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:🔗\s*)?\[?(https?://\S+)").unwrap());
static SUB_BULLET_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-\s+\[([^\]]+)\]\(([^)]+)\)").unwrap());
static POST_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s+(.+)\[(?i:推文|tweet|post)\]\(([^)]+)\)").unwrap());

const QUOTES: &[char] = &['"', '“', '”'];

/// Social post under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialDraft {
    pub display_name: Option<String>,
    pub handle: String,
    pub summary: String,
    pub tweet_url: Option<String>,
    pub profile_url: String,
}

impl SocialDraft {
    pub fn for_handle(handle: &str, summary: String) -> Self {
        Self {
            display_name: None,
            handle: handle.to_string(),
            summary,
            tweet_url: None,
            profile_url: profile_url_for(handle),
        }
    }

    /// A new post by the same author.
    pub fn fork(&self, summary: String, tweet_url: String) -> Self {
        Self {
            display_name: self.display_name.clone(),
            handle: self.handle.clone(),
            summary,
            tweet_url: Some(tweet_url),
            profile_url: self.profile_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocialStep {
    Skip,
    /// Close the open post and start this one.
    Open(SocialDraft),
    /// Replace the open post's tweet URL.
    SetTweetUrl(String),
    /// Close the open post and start another by the same author.
    Fork { summary: String, tweet_url: String },
    /// Rewrite the open post's summary and tweet URL in place.
    Update { summary: String, tweet_url: String },
    Append(String),
}

pub static RULES: &[Rule<SocialDraft, SocialStep>] = &[
    Rule { name: "noise", classify: noise },
    Rule { name: "name_profile", classify: name_profile },
    Rule { name: "bold_handle", classify: bold_handle },
    Rule { name: "bold_name", classify: bold_name },
    Rule { name: "bullet_handle", classify: bullet_handle },
    Rule { name: "numbered_handle", classify: numbered_handle },
    Rule { name: "social_link", classify: social_link },
    Rule { name: "sub_bullet_link", classify: sub_bullet_link },
    Rule { name: "post_link", classify: post_link },
    Rule { name: "continuation", classify: continuation },
];

fn noise(line: &Line<'_>, _: Option<&SocialDraft>) -> Option<SocialStep> {
    is_noise(line.text).then_some(SocialStep::Skip)
}

// **Alice** (https://x.com/alice)
fn name_profile(line: &Line<'_>, _: Option<&SocialDraft>) -> Option<SocialStep> {
    let caps = NAME_PROFILE_RE.captures(line.text)?;
    let name = caps[1].strip_prefix('@').unwrap_or(&caps[1]);
    Some(SocialStep::Open(SocialDraft {
        display_name: (!name.is_empty()).then(|| name.to_string()),
        handle: caps[3].to_string(),
        summary: String::new(),
        tweet_url: None,
        profile_url: caps[2].to_string(),
    }))
}

// 🔥 **@alice — Headline**, or a bare **@alice** heading line
fn bold_handle(line: &Line<'_>, _: Option<&SocialDraft>) -> Option<SocialStep> {
    if let Some(caps) = BOLD_HANDLE_RE.captures(line.text) {
        return Some(SocialStep::Open(SocialDraft::for_handle(&caps[1], caps[2].to_string())));
    }
    let caps = BOLD_AT_HANDLE_RE.captures(line.text)?;
    Some(SocialStep::Open(SocialDraft::for_handle(&caps[1], strip_markup_markers(&caps[2]))))
}

/// `**Some Name** text`. Only capitalised names count; lowercase bold is ordinary emphasis.
fn bold_name(line: &Line<'_>, _: Option<&SocialDraft>) -> Option<SocialStep> {
    let caps = BOLD_NAME_RE.captures(line.text)?;
    let name = caps[1].trim();
    let capitalised = name.chars().next().is_some_and(|c| c.is_ascii_uppercase());
    if name.chars().count() < 2 || !capitalised {
        return None;
    }
    let handle: String = name.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase();
    let mut draft = SocialDraft::for_handle(&handle, caps[2].to_string());
    draft.display_name = Some(name.to_string());
    Some(SocialStep::Open(draft))
}

// - **@alice** text
fn bullet_handle(line: &Line<'_>, _: Option<&SocialDraft>) -> Option<SocialStep> {
    let caps = BULLET_HANDLE_RE.captures(line.text)?;
    Some(SocialStep::Open(SocialDraft::for_handle(&caps[1], strip_markup_markers(&caps[2]))))
}

// 1. **alice** (https://x.com/alice/status/1) — text
fn numbered_handle(line: &Line<'_>, _: Option<&SocialDraft>) -> Option<SocialStep> {
    let caps = NUMBERED_HANDLE_RE.captures(line.text)?;
    let mut draft = SocialDraft::for_handle(&caps[1], strip_markup_markers(&caps[3]));
    if caps[2].contains("/status/") {
        draft.tweet_url = Some(caps[2].to_string());
    }
    Some(SocialStep::Open(draft))
}

/// Unindented link or bare URL pointing at a social host. Overwrites any tweet URL
/// already set on the open post.
fn social_link(line: &Line<'_>, open: Option<&SocialDraft>) -> Option<SocialStep> {
    if line.is_indented() && line.text.starts_with('-') {
        return None;
    }
    let url = match LINK_LINE_RE.captures(line.text) {
        Some(caps) => caps[2].to_string(),
        None => {
            let caps = BARE_LINK_LINE_RE.captures(line.text)?;
            caps[1].trim_end_matches([']', ')']).to_string()
        }
    };
    if !is_social_url(&url) {
        return None;
    }
    Some(match open {
        Some(_) => SocialStep::SetTweetUrl(url),
        None => SocialStep::Skip,
    })
}

/// Indented `- [label](url)` under an author. A second distinct post URL fans out into a
/// new post by the same author.
fn sub_bullet_link(line: &Line<'_>, open: Option<&SocialDraft>) -> Option<SocialStep> {
    if !line.is_indented() {
        return None;
    }
    let caps = SUB_BULLET_LINK_RE.captures(line.text)?;
    let url = &caps[2];
    let Some(draft) = open else {
        return Some(SocialStep::Skip);
    };
    if !is_social_url(url) {
        return Some(SocialStep::Skip);
    }
    Some(match draft.tweet_url.as_deref() {
        None => SocialStep::SetTweetUrl(url.to_string()),
        Some(existing) if existing != url => SocialStep::Fork {
            summary: caps[1].to_string(),
            tweet_url: url.to_string(),
        },
        Some(_) => SocialStep::Skip,
    })
}

// - summary text [推文](https://x.com/a/status/1)
fn post_link(line: &Line<'_>, open: Option<&SocialDraft>) -> Option<SocialStep> {
    let caps = POST_LINK_RE.captures(line.text)?;
    let Some(draft) = open else {
        return Some(SocialStep::Skip);
    };
    let summary = strip_markup_markers(caps[1].trim());
    let tweet_url = caps[2].to_string();
    if !draft.summary.is_empty() && draft.tweet_url.is_some() {
        Some(SocialStep::Fork { summary, tweet_url })
    } else {
        Some(SocialStep::Update { summary, tweet_url })
    }
}

fn continuation(line: &Line<'_>, open: Option<&SocialDraft>) -> Option<SocialStep> {
    open?;
    if line.text.starts_with('#') {
        return None;
    }
    let text = line.text;
    let text = text.strip_prefix(QUOTES).unwrap_or(text);
    let text = text.strip_suffix(QUOTES).unwrap_or(text);
    Some(SocialStep::Append(strip_markup_markers(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::classify::first_match;

    fn classify(raw: &str, open: Option<&SocialDraft>) -> Option<(&'static str, SocialStep)> {
        first_match(RULES, &Line::new(raw, &[]), open)
    }

    fn opened(raw: &str) -> (&'static str, SocialDraft) {
        match classify(raw, None) {
            Some((name, SocialStep::Open(d))) => (name, d),
            other => panic!("expected open for {raw:?}, got {other:?}"),
        }
    }

    fn with_tweet(url: &str) -> SocialDraft {
        let mut d = SocialDraft::for_handle("alice", "first".into());
        d.tweet_url = Some(url.to_string());
        d
    }

    #[test]
    fn name_with_profile_link() {
        let (name, d) = opened("**Alice** (https://x.com/alice)");
        assert_eq!(name, "name_profile");
        assert_eq!(d.display_name.as_deref(), Some("Alice"));
        assert_eq!(d.handle, "alice");
        assert_eq!(d.profile_url, "https://x.com/alice");

        let (_, d) = opened("**@bob** https://twitter.com/bob_dev/status/9");
        assert_eq!(d.display_name.as_deref(), Some("bob"));
        assert_eq!(d.handle, "bob_dev");
        assert_eq!(d.profile_url, "https://twitter.com/bob_dev");
    }

    #[test]
    fn bold_handle_with_marker() {
        for raw in ["**@karpathy — On tokenizers**", "🔥 **karpathy - On tokenizers**"] {
            let (name, d) = opened(raw);
            assert_eq!(name, "bold_handle");
            assert_eq!(d.handle, "karpathy");
            assert_eq!(d.summary, "On tokenizers");
            assert_eq!(d.profile_url, "https://x.com/karpathy");
            assert_eq!(d.display_name, None);
        }

        let (name, d) = opened("**@emollick**");
        assert_eq!(name, "bold_handle");
        assert_eq!(d.handle, "emollick");
        assert_eq!(d.summary, "");
    }

    #[test]
    fn bold_name_requires_capital() {
        let (name, d) = opened("**Greg Isenberg** shares a thread");
        assert_eq!(name, "bold_name");
        assert_eq!(d.handle, "gregisenberg");
        assert_eq!(d.display_name.as_deref(), Some("Greg Isenberg"));
        assert_eq!(d.summary, "shares a thread");

        assert!(classify("**important** point", None).is_none());
        assert!(classify("**A** x", None).is_none());
    }

    #[test]
    fn bullet_and_numbered_handles() {
        let (name, d) = opened("- **@levelsio** ships **another** app");
        assert_eq!(name, "bullet_handle");
        assert_eq!(d.summary, "ships another app");

        let (name, d) = opened("2. **marclou** (https://x.com/marclou/status/42) — revenue update");
        assert_eq!(name, "numbered_handle");
        assert_eq!(d.tweet_url.as_deref(), Some("https://x.com/marclou/status/42"));
        assert_eq!(d.summary, "revenue update");

        let (_, d) = opened("3. **marclou** https://x.com/marclou - profile only");
        assert_eq!(d.tweet_url, None);
    }

    #[test]
    fn social_link_overwrites() {
        let open = with_tweet("https://x.com/alice/status/1");
        let (name, step) = classify("→ [view](https://x.com/alice/status/2)", Some(&open)).unwrap();
        assert_eq!(name, "social_link");
        assert_eq!(step, SocialStep::SetTweetUrl("https://x.com/alice/status/2".into()));

        let (_, step) = classify("🔗 https://x.com/alice/status/3", Some(&open)).unwrap();
        assert_eq!(step, SocialStep::SetTweetUrl("https://x.com/alice/status/3".into()));

        let (_, step) = classify("[https://x.com/alice/status/4]", Some(&open)).unwrap();
        assert_eq!(step, SocialStep::SetTweetUrl("https://x.com/alice/status/4".into()));

        assert_eq!(classify("- [a](https://x.com/a/status/1)", None).unwrap().1, SocialStep::Skip);
    }

    #[test]
    fn non_social_link_is_text() {
        let open = with_tweet("https://x.com/alice/status/1");
        let (name, step) = classify("[blog](https://blog.example.com/p)", Some(&open)).unwrap();
        assert_eq!(name, "continuation");
        assert_eq!(step, SocialStep::Append("blog".into()));
    }

    #[test]
    fn indented_link_fans_out() {
        let open = with_tweet("https://x.com/alice/status/1");
        let line = Line::new("  - [second thought](https://x.com/alice/status/2)", &[]);
        let (name, step) = first_match(RULES, &line, Some(&open)).unwrap();
        assert_eq!(name, "sub_bullet_link");
        assert_eq!(
            step,
            SocialStep::Fork {
                summary: "second thought".into(),
                tweet_url: "https://x.com/alice/status/2".into()
            }
        );

        let same = Line::new("  - [dup](https://x.com/alice/status/1)", &[]);
        assert_eq!(first_match(RULES, &same, Some(&open)).unwrap().1, SocialStep::Skip);

        let bare = SocialDraft::for_handle("alice", String::new());
        assert_eq!(
            first_match(RULES, &line, Some(&bare)).unwrap().1,
            SocialStep::SetTweetUrl("https://x.com/alice/status/2".into())
        );
    }

    #[test]
    fn post_link_updates_or_forks() {
        let raw = "- Shipped **v2** today [推文](https://x.com/alice/status/7)";
        let empty = SocialDraft::for_handle("alice", String::new());
        assert_eq!(
            classify(raw, Some(&empty)).unwrap().1,
            SocialStep::Update {
                summary: "Shipped v2 today".into(),
                tweet_url: "https://x.com/alice/status/7".into()
            }
        );

        let full = with_tweet("https://x.com/alice/status/1");
        assert!(matches!(classify(raw, Some(&full)).unwrap().1, SocialStep::Fork { .. }));

        let (name, _) = classify("- Notes [Tweet](https://x.com/a/status/8)", Some(&empty)).unwrap();
        assert_eq!(name, "post_link");
    }

    #[test]
    fn continuation_strips_quotes() {
        let open = SocialDraft::for_handle("a", String::new());
        assert_eq!(
            classify("“Ship *fast*, learn faster”", Some(&open)).unwrap().1,
            SocialStep::Append("Ship fast, learn faster".into())
        );
        assert!(classify("#### heading", Some(&open)).is_none());
        assert!(classify("loose text", None).is_none());
    }
}
