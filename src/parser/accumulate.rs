//! Open-record state machine.
//!
//! A sub-block's lines are folded with a single `open` slot. Each line is classified by the
//! ruleset's table and the resulting step either closes the open record and starts another,
//! extends it, or is dropped. Whatever is still open at the end of the block is closed.

use tracing::trace;

use super::classify::news::{self, NewsDraft, NewsStep};
use super::classify::social::{self, SocialDraft, SocialStep};
use super::classify::{first_match, Line, Rule};
use super::links::{extract_all_links, hostname_of, strip_markup_markers};
use crate::model::{Item, NewsItem, SocialPost};

/// Which record kind a sub-block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    News,
    Social,
}

/// Rule table plus the state transitions for one record kind.
pub trait Ruleset {
    type Draft: 'static;
    type Step: 'static;

    fn rules() -> &'static [Rule<Self::Draft, Self::Step>];

    /// Apply a classified step to the open slot, pushing anything it closes.
    fn apply(step: Self::Step, open: &mut Option<Self::Draft>, items: &mut Vec<Item>);

    /// Finish a draft; `None` when it has nothing worth keeping.
    fn close(draft: Self::Draft) -> Option<Item>;
}

pub struct News;
pub struct Social;

pub fn accumulate_kind(kind: RecordKind, lines: &[&str]) -> Vec<Item> {
    match kind {
        RecordKind::News => accumulate::<News>(lines),
        RecordKind::Social => accumulate::<Social>(lines),
    }
}

pub fn accumulate<R: Ruleset>(lines: &[&str]) -> Vec<Item> {
    let (open, mut items) = lines.iter().enumerate().fold(
        (None, Vec::new()),
        |(mut open, mut items), (i, raw)| {
            let line = Line::new(raw, &lines[i + 1..]);
            if let Some((rule, step)) = first_match(R::rules(), &line, open.as_ref()) {
                trace!(rule, line = line.text, "classified");
                R::apply(step, &mut open, &mut items);
            }
            (open, items)
        },
    );
    items.extend(open.and_then(R::close));
    items
}

fn close_into<R: Ruleset>(open: &mut Option<R::Draft>, items: &mut Vec<Item>) {
    if let Some(item) = open.take().and_then(R::close) {
        items.push(item);
    }
}

fn append_text(target: &mut String, text: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

impl Ruleset for News {
    type Draft = NewsDraft;
    type Step = NewsStep;

    fn rules() -> &'static [Rule<NewsDraft, NewsStep>] {
        news::RULES
    }

    fn apply(step: NewsStep, open: &mut Option<NewsDraft>, items: &mut Vec<Item>) {
        match step {
            NewsStep::Skip => {}
            NewsStep::Open(draft) => {
                close_into::<Self>(open, items);
                *open = Some(draft);
            }
            NewsStep::Group(label) => {
                close_into::<Self>(open, items);
                items.push(Item::GroupTitle { label });
            }
            NewsStep::Append { text, url } => {
                if let Some(draft) = open {
                    append_text(&mut draft.description, &text);
                    if draft.url.is_none() {
                        draft.url = url;
                    }
                }
            }
            NewsStep::AttachUrl(url) => {
                if let Some(draft) = open.as_mut().filter(|d| d.url.is_none()) {
                    draft.url = Some(url);
                }
            }
        }
    }

    fn close(draft: NewsDraft) -> Option<Item> {
        if draft.title.is_empty() && draft.description.is_empty() {
            return None;
        }
        let url = draft.url.or_else(|| {
            extract_all_links(&format!("{} {}", draft.title, draft.description))
                .into_iter()
                .next()
                .map(|l| l.url)
        });
        let source = url.as_deref().map(hostname_of).filter(|h| !h.is_empty());
        Some(Item::News(NewsItem {
            title: strip_markup_markers(&draft.title),
            description: strip_markup_markers(&draft.description),
            url,
            source,
        }))
    }
}

impl Ruleset for Social {
    type Draft = SocialDraft;
    type Step = SocialStep;

    fn rules() -> &'static [Rule<SocialDraft, SocialStep>] {
        social::RULES
    }

    fn apply(step: SocialStep, open: &mut Option<SocialDraft>, items: &mut Vec<Item>) {
        match step {
            SocialStep::Skip => {}
            SocialStep::Open(draft) => {
                close_into::<Self>(open, items);
                *open = Some(draft);
            }
            SocialStep::SetTweetUrl(url) => {
                if let Some(draft) = open {
                    draft.tweet_url = Some(url);
                }
            }
            SocialStep::Fork { summary, tweet_url } => {
                if let Some(current) = open.take() {
                    let next = current.fork(summary, tweet_url);
                    items.extend(Self::close(current));
                    *open = Some(next);
                }
            }
            SocialStep::Update { summary, tweet_url } => {
                if let Some(draft) = open {
                    draft.summary = summary;
                    draft.tweet_url = Some(tweet_url);
                }
            }
            SocialStep::Append(text) => {
                if let Some(draft) = open {
                    append_text(&mut draft.summary, &text);
                }
            }
        }
    }

    fn close(draft: SocialDraft) -> Option<Item> {
        if draft.summary.is_empty() && draft.handle.is_empty() {
            return None;
        }
        Some(Item::Social(SocialPost {
            display_name: draft.display_name,
            handle: draft.handle,
            summary: draft.summary,
            tweet_url: draft.tweet_url,
            profile_url: draft.profile_url,
        }))
    }
}
