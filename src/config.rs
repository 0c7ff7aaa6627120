use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_yaml::Deserializer;
use tracing::debug;

/// Picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "daily_digest.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub content_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Per-file override of the built-in `issue.html` / `index.html`.
    pub template_dir: Option<PathBuf>,
    pub static_dir: PathBuf,
    pub site_name: String,
    /// Date of issue #1.
    pub epoch: NaiveDate,
    /// Substring identifying alternate social-only variants of a day's document.
    pub variant_marker: String,
    pub news_heading: String,
    pub social_heading: String,
    pub empty_label: String,
    pub tweet_link_label: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            output_dir: PathBuf::from("dist"),
            template_dir: None,
            static_dir: PathBuf::from("static"),
            site_name: "小虾日报".to_string(),
            epoch: NaiveDate::from_ymd_opt(2024, 10, 11).unwrap_or_default(),
            variant_marker: "-opus-twitter".to_string(),
            news_heading: "📰 RSS 日报".to_string(),
            social_heading: "🐦 Twitter KOL 日报".to_string(),
            empty_label: "暂无内容".to_string(),
            tweet_link_label: "查看推文 →".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn from_yaml(raw: &str, origin: &Path) -> Result<Self> {
        let deserializer = Deserializer::from_str(raw);
        serde_path_to_error::deserialize(deserializer).map_err(|e| {
            anyhow!(
                "Invalid YAML in {} at `{}`: {}",
                origin.display(),
                e.path(),
                e.inner()
            )
        })
    }

    /// Explicit path must exist; otherwise fall back to `daily_digest.yaml`, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Self::from_yaml(&raw, &path)
    }

    pub fn with_overrides(mut self, content: Option<PathBuf>, out: Option<PathBuf>) -> Self {
        if let Some(dir) = content {
            self.content_dir = dir;
        }
        if let Some(dir) = out {
            self.output_dir = dir;
        }
        self
    }
}
