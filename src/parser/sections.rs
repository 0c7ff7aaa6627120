use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::accumulate::{accumulate_kind, RecordKind};
use crate::model::{IssueDate, Section};

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap());
static SUB_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\S+)\s+(.+)").unwrap());
static LEADING_DASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[—–-]\s*").unwrap());

/// A `## ` block: its heading text and the raw lines under it.
#[derive(Debug, Clone)]
pub struct Block<'a> {
    pub title: &'a str,
    pub lines: Vec<&'a str>,
}

/// A `### ` block inside a top-level block.
#[derive(Debug, Clone)]
pub struct SubBlock<'a> {
    pub emoji: String,
    pub label: String,
    pub lines: Vec<&'a str>,
}

/// The at-most-one news and at-most-one social top-level blocks of a document.
#[derive(Debug, Default)]
pub struct Selected<'a> {
    pub news: Option<Block<'a>>,
    pub social: Option<Block<'a>>,
}

/// Date embedded in the first `# ` heading.
pub fn extract_date(lines: &[&str]) -> IssueDate {
    lines
        .iter()
        .find(|l| l.starts_with("# "))
        .and_then(|title| DATE_RE.captures(title))
        .and_then(|caps| NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok())
        .map_or(IssueDate::Unknown, IssueDate::Known)
}

/// Split at `prefix` headings. Lines before the first heading belong to no block.
fn cluster<'a, T>(lines: &[&'a str], prefix: &str, open: impl Fn(&'a str) -> T) -> Vec<(T, Vec<&'a str>)> {
    let mut blocks: Vec<(T, Vec<&'a str>)> = Vec::new();
    let mut current: Option<T> = None;
    let mut current_lines: Vec<&'a str> = Vec::new();

    for &line in lines {
        if let Some(heading) = line.strip_prefix(prefix) {
            if let Some(head) = current.take() {
                blocks.push((head, std::mem::take(&mut current_lines)));
            }
            current = Some(open(heading.trim()));
        } else if current.is_some() {
            current_lines.push(line);
        }
    }

    if let Some(head) = current {
        blocks.push((head, current_lines));
    }
    blocks
}

pub fn top_level_blocks<'a>(lines: &[&'a str]) -> Vec<Block<'a>> {
    cluster(lines, "## ", |title| title)
        .into_iter()
        .map(|(title, lines)| Block { title, lines })
        .collect()
}

/// Which record kinds a top-level heading announces. A heading may announce both.
fn detect_kinds(title: &str) -> (bool, bool) {
    let t = title.to_lowercase();
    let social = t.contains("twitter") || t.contains("kol");
    let news = t.contains("rss") || ((t.contains("日报") || t.contains("report")) && !social);
    (news, social)
}

/// First matching block of each kind wins; later ones are ignored.
pub fn select_blocks(blocks: Vec<Block<'_>>) -> Selected<'_> {
    let mut selected = Selected::default();
    for block in blocks {
        let (news, social) = detect_kinds(block.title);
        if news && selected.news.is_none() {
            selected.news = Some(block.clone());
        }
        if social && selected.social.is_none() {
            selected.social = Some(block);
        }
    }
    selected
}

pub fn sub_blocks<'a>(lines: &[&'a str]) -> Vec<SubBlock<'a>> {
    cluster(lines, "### ", parse_sub_heading)
        .into_iter()
        .map(|((emoji, label), lines)| SubBlock { emoji, label, lines })
        .collect()
}

/// `🔥 — Label` → (`🔥`, `Label`). Headings without whitespace have no emoji.
fn parse_sub_heading(raw: &str) -> (String, String) {
    match SUB_HEADING_RE.captures(raw) {
        Some(caps) => (
            caps[1].to_string(),
            LEADING_DASH_RE.replace(&caps[2], "").into_owned(),
        ),
        None => (String::new(), raw.to_string()),
    }
}

/// Split a top-level block into sections and accumulate each; empty sections are dropped.
pub fn parse_block(block: &Block<'_>, kind: RecordKind) -> Vec<Section> {
    sub_blocks(&block.lines)
        .into_iter()
        .filter_map(|sub| {
            let items = accumulate_kind(kind, &sub.lines);
            (!items.is_empty()).then(|| Section {
                emoji: sub.emoji,
                label: sub.label,
                items,
            })
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn date_from_title() {
        let l = lines("intro\n# Daily News | 2025-02-03\n## RSS");
        assert_eq!(extract_date(&l), IssueDate::Known(NaiveDate::from_ymd_opt(2025, 2, 3).unwrap()));
    }

    #[test]
    fn date_missing_or_invalid() {
        assert_eq!(extract_date(&lines("# Daily News\n2025-02-03")), IssueDate::Unknown);
        assert_eq!(extract_date(&lines("# Issue 2025-13-45")), IssueDate::Unknown);
        assert_eq!(extract_date(&lines("## 2025-02-03")), IssueDate::Unknown);
    }

    #[test]
    fn blocks_keep_order_and_drop_preamble() {
        let l = lines("# T\npreamble\n## A\na1\n## B\nb1\nb2");
        let blocks = top_level_blocks(&l);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].title, "A");
        assert_eq!(blocks[0].lines, vec!["a1"]);
        assert_eq!(blocks[1].lines, vec!["b1", "b2"]);
    }

    #[test]
    fn third_level_headings_stay_inside_blocks() {
        let l = lines("## A\n### 🔥 x\n#### deep");
        let blocks = top_level_blocks(&l);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines, vec!["### 🔥 x", "#### deep"]);
    }

    #[test]
    fn kind_detection() {
        assert_eq!(detect_kinds("📰 RSS 日报"), (true, false));
        assert_eq!(detect_kinds("Morning Report"), (true, false));
        assert_eq!(detect_kinds("🐦 Twitter KOL 日报"), (false, true));
        assert_eq!(detect_kinds("KOL report"), (false, true));
        assert_eq!(detect_kinds("RSS + Twitter"), (true, true));
        assert_eq!(detect_kinds("Misc"), (false, false));
    }

    #[test]
    fn first_block_of_each_kind_wins() {
        let l = lines("## RSS one\nr1\n## Twitter one\nt1\n## RSS two\nr2\n## KOL two\nt2");
        let selected = select_blocks(top_level_blocks(&l));
        assert_eq!(selected.news.unwrap().lines, vec!["r1"]);
        assert_eq!(selected.social.unwrap().lines, vec!["t1"]);
    }

    #[test]
    fn sub_heading_parts() {
        assert_eq!(parse_sub_heading("🔥 重点推荐"), ("🔥".into(), "重点推荐".into()));
        assert_eq!(parse_sub_heading("🧠 — AI 技术前沿"), ("🧠".into(), "AI 技术前沿".into()));
        assert_eq!(parse_sub_heading("Standalone"), (String::new(), "Standalone".into()));
    }

    #[test]
    fn empty_sections_are_dropped() {
        let l = lines("## RSS\n### 🔥 Hot\n**1. Foo**\n### 🫥 Empty\n\n---\n### 📌 Other\n- [Bar](https://a.com)");
        let blocks = top_level_blocks(&l);
        let sections = parse_block(&blocks[0], RecordKind::News);
        let labels: Vec<&str> = sections.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Hot", "Other"]);
        assert!(sections.iter().all(|s| !s.items.is_empty()));
    }
}
