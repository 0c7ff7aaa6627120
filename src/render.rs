//! HTML fragments and page assembly.
//!
//! Templates carry `{{NAME}}` placeholders. Substitution is a single pass, so text coming
//! from a document can never expand into another placeholder.

use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use regex::{Captures, Regex};

use crate::config::SiteConfig;
use crate::model::{Issue, Item, NewsItem, Section, SocialPost};
use crate::parser::links::escape_for_markup as esc;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{([A-Z_]+)\}\}").unwrap());

const WEEKDAYS: [&str; 7] = ["日", "一", "二", "三", "四", "五", "六"];

pub fn render_news_item(item: &Item) -> String {
    match item {
        Item::GroupTitle { label } => format!("<div class=\"group-title\">{}</div>\n", esc(label)),
        Item::News(news) => render_news(news),
        Item::Social(_) => String::new(),
    }
}

fn render_news(item: &NewsItem) -> String {
    let title = match &item.url {
        Some(url) => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
            esc(url),
            esc(&item.title)
        ),
        None => esc(&item.title).into_owned(),
    };

    let mut html = String::from("<div class=\"news-item\">\n");
    html.push_str(&format!("  <div class=\"news-title\">{}</div>\n", title));
    if !item.description.is_empty() {
        html.push_str(&format!("  <div class=\"news-summary\">{}</div>\n", esc(&item.description)));
    }
    if let Some(source) = &item.source {
        html.push_str(&format!(
            "  <div class=\"news-meta\"><span class=\"news-source\">{}</span></div>\n",
            esc(source)
        ));
    }
    html.push_str("</div>\n");
    html
}

pub fn render_social_item(post: &SocialPost, link_label: &str) -> String {
    let mut html = String::from("<div class=\"tweet-item\">\n");
    html.push_str(&format!(
        "  <div class=\"tweet-author\"><span class=\"tweet-name\">{}</span> <span class=\"tweet-handle\">@{}</span></div>\n",
        esc(post.name()),
        esc(&post.handle)
    ));
    if !post.summary.is_empty() {
        html.push_str(&format!("  <div class=\"tweet-content\">{}</div>\n", esc(&post.summary)));
    }
    if let Some(url) = &post.tweet_url {
        html.push_str(&format!(
            "  <a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"tweet-link\">{}</a>\n",
            esc(url),
            esc(link_label)
        ));
    }
    html.push_str("</div>\n");
    html
}

/// One top-level page section. With no sections, an empty-state notice is shown instead.
pub fn render_section(title: &str, sections: &[Section], empty_label: &str, link_label: &str) -> String {
    let mut html = format!(
        "<section class=\"section\">\n<h2 class=\"section-title\">{}</h2>\n",
        esc(title)
    );
    if sections.is_empty() {
        html.push_str(&format!("<div class=\"empty-state\">{}</div>\n", esc(empty_label)));
    }
    for section in sections {
        html.push_str(&format!(
            "<h3 class=\"category-header\">{} {}</h3>\n",
            esc(&section.emoji),
            esc(&section.label)
        ));
        for item in &section.items {
            match item {
                Item::Social(post) => html.push_str(&render_social_item(post, link_label)),
                other => html.push_str(&render_news_item(other)),
            }
        }
    }
    html.push_str("</section>\n");
    html
}

/// `2025 年 3 月 14 日 · 星期五`
pub fn format_date_display(date: NaiveDate) -> String {
    let weekday = WEEKDAYS[date.weekday().num_days_from_sunday() as usize];
    format!("{} 年 {} 月 {} 日 · 星期{}", date.year(), date.month(), date.day(), weekday)
}

/// `03-14`
pub fn format_date_short(date: NaiveDate) -> String {
    date.format("%m-%d").to_string()
}

/// Replace every known `{{NAME}}`; unknown placeholders are left as written.
fn substitute(template: &str, values: &HashMap<&str, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn page_link(date: Option<NaiveDate>) -> (String, String) {
    match date {
        Some(d) => (format!("{}.html", d.format("%Y-%m-%d")), String::new()),
        None => ("#".to_string(), "disabled".to_string()),
    }
}

pub fn render_issue_page(
    template: &str,
    issue: &Issue,
    prev: Option<NaiveDate>,
    next: Option<NaiveDate>,
    all_dates: &[NaiveDate],
    cfg: &SiteConfig,
) -> Result<String> {
    let date = issue.date.format("%Y-%m-%d").to_string();
    let news_count = issue.doc.news_item_count();
    let social_count = issue.doc.social_item_count();
    let (prev_link, prev_disabled) = page_link(prev);
    let (next_link, next_disabled) = page_link(next);
    let dates: Vec<String> = all_dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();

    let values: HashMap<&str, String> = HashMap::from([
        ("TITLE", esc(&format!("{} #{} | {}", cfg.site_name, issue.number, date)).into_owned()),
        (
            "DESCRIPTION",
            esc(&format!("{} {} — {} 篇文章, {} 条推文", cfg.site_name, date, news_count, social_count)).into_owned(),
        ),
        ("DATE_SHORT", format_date_short(issue.date)),
        ("DATE_DISPLAY", format_date_display(issue.date)),
        ("ISSUE_NUMBER", issue.number.to_string()),
        ("RSS_COUNT", news_count.to_string()),
        ("TWEET_COUNT", social_count.to_string()),
        (
            "RSS_SECTION",
            render_section(&cfg.news_heading, &issue.doc.news, &cfg.empty_label, &cfg.tweet_link_label),
        ),
        (
            "TWITTER_SECTION",
            render_section(&cfg.social_heading, &issue.doc.social, &cfg.empty_label, &cfg.tweet_link_label),
        ),
        ("PREV_LINK", prev_link),
        ("NEXT_LINK", next_link),
        ("PREV_DISABLED", prev_disabled),
        ("NEXT_DISABLED", next_disabled),
        ("CURRENT_DATE", date.clone()),
        ("AVAILABLE_DATES", serde_json::to_string(&dates)?),
    ]);

    Ok(substitute(template, &values))
}

/// Newest issue first.
pub fn render_archive(template: &str, issues: &[Issue]) -> String {
    let items: Vec<String> = issues
        .iter()
        .rev()
        .map(|issue| {
            let date = issue.date.format("%Y-%m-%d");
            format!(
                "<a href=\"{date}.html\" class=\"archive-item\">\n  <span class=\"archive-date\">{date}</span>\n  <span class=\"archive-num\">#{}</span>\n  <span class=\"archive-stats\">{} 文章 · {} 推文</span>\n  <span class=\"archive-arrow\">›</span>\n</a>",
                issue.number,
                issue.doc.news_item_count(),
                issue.doc.social_item_count(),
            )
        })
        .collect();

    substitute(template, &HashMap::from([("ARCHIVE_ITEMS", items.join("\n"))]))
}
