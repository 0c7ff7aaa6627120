use std::fmt;

use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Calendar date taken from a document's top-level heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueDate {
    Known(NaiveDate),
    Unknown,
}

impl IssueDate {
    pub fn known(&self) -> Option<NaiveDate> {
        match self {
            IssueDate::Known(d) => Some(*d),
            IssueDate::Unknown => None,
        }
    }
}

impl fmt::Display for IssueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueDate::Known(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            IssueDate::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for IssueDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One parsed input file. Item counts are computed from the sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestDocument {
    pub date: IssueDate,
    pub news: Vec<Section>,
    pub social: Vec<Section>,
}

impl DigestDocument {
    pub fn news_item_count(&self) -> usize {
        self.news.iter().map(|s| s.items.len()).sum()
    }

    pub fn social_item_count(&self) -> usize {
        self.social.iter().map(|s| s.items.len()).sum()
    }

    /// Take the social sections of a same-day variant when it carries strictly more posts.
    /// Returns true when the override happened.
    pub fn adopt_social_variant(&mut self, variant: DigestDocument) -> bool {
        if variant.social_item_count() > self.social_item_count() {
            self.social = variant.social;
            true
        } else {
            false
        }
    }
}

impl Serialize for DigestDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("DigestDocument", 5)?;
        st.serialize_field("date", &self.date)?;
        st.serialize_field("news_item_count", &self.news_item_count())?;
        st.serialize_field("social_item_count", &self.social_item_count())?;
        st.serialize_field("news", &self.news)?;
        st.serialize_field("social", &self.social)?;
        st.end()
    }
}

/// A dated document placed in the published series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub date: NaiveDate,
    pub number: i64,
    pub doc: DigestDocument,
}

/// A third-level-heading sub-block. Never empty once retained in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub emoji: String,
    pub label: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    News(NewsItem),
    GroupTitle { label: String },
    Social(SocialPost),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Host of `url` without a leading `www.`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialPost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub handle: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet_url: Option<String>,
    pub profile_url: String,
}

impl SocialPost {
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.handle)
    }
}

pub fn profile_url_for(handle: &str) -> String {
    format!("https://x.com/{}", handle)
}
