use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use regex::Regex;
use tracing::{info, warn};

use crate::config::SiteConfig;
use crate::model::{DigestDocument, Issue};
use crate::parser::parse_document;
use crate::render::{render_archive, render_issue_page};

static MAIN_FILE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}\.md$").unwrap());

const ISSUE_TEMPLATE: &str = include_str!("../templates/issue.html");
const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Markdown files of a content directory, split by role. Both lists are sorted by name.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ContentFiles {
    pub main: Vec<PathBuf>,
    pub variants: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct BuildStats {
    pub issues: usize,
    pub news_items: usize,
    pub social_items: usize,
    pub static_files: usize,
}

/// Issue #1 falls on `epoch`; dates before it are clamped to #1.
pub fn issue_number(date: NaiveDate, epoch: NaiveDate) -> i64 {
    ((date - epoch).num_days() + 1).max(1)
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

pub fn scan_content(dir: &Path, variant_marker: &str) -> Result<ContentFiles> {
    let mut files = ContentFiles::default();
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read content dir {}", dir.display()))?;

    for entry in entries {
        let path = entry.with_context(|| format!("Failed to list {}", dir.display()))?.path();
        let name = file_name(&path);
        if !name.ends_with(".md") || !path.is_file() {
            continue;
        }
        if MAIN_FILE_RE.is_match(name) {
            files.main.push(path);
        } else if !variant_marker.is_empty() && name.contains(variant_marker) {
            files.variants.push(path);
        }
    }

    files.main.sort();
    files.variants.sort();
    Ok(files)
}

fn parse_file(path: &Path) -> Result<DigestDocument> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_document(&text))
}

/// Parse one main document and fold in its same-day social variant, if any.
fn load_issue(path: &Path, variants: &[PathBuf]) -> Result<Option<DigestDocument>> {
    let mut doc = parse_file(path)?;
    let Some(date) = doc.date.known() else {
        warn!("Skipping {}: no date in title", path.display());
        return Ok(None);
    };

    let prefix = date.format("%Y-%m-%d").to_string();
    if let Some(variant_path) = variants.iter().find(|v| file_name(v).starts_with(&prefix)) {
        let variant = parse_file(variant_path)?;
        let before = doc.social_item_count();
        if doc.adopt_social_variant(variant) {
            info!(
                "{}: social sections taken from {} ({} -> {} posts)",
                prefix,
                file_name(variant_path),
                before,
                doc.social_item_count()
            );
        }
    }
    Ok(Some(doc))
}

/// Parse every main document in parallel, then sort by date and number them.
pub fn load_issues(cfg: &SiteConfig) -> Result<Vec<Issue>> {
    let files = scan_content(&cfg.content_dir, &cfg.variant_marker)?;
    info!(
        "Found {} documents ({} variants) in {}",
        files.main.len(),
        files.variants.len(),
        cfg.content_dir.display()
    );

    let pb = ProgressBar::new(files.main.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let parsed: Vec<Option<DigestDocument>> = files
        .main
        .par_iter()
        .map(|path| {
            let doc = load_issue(path, &files.variants);
            pb.inc(1);
            doc
        })
        .collect::<Result<_>>()?;
    pb.finish_and_clear();

    let mut issues: Vec<Issue> = parsed
        .into_iter()
        .flatten()
        .filter_map(|doc| {
            let date = doc.date.known()?;
            Some(Issue {
                date,
                number: issue_number(date, cfg.epoch),
                doc,
            })
        })
        .collect();
    issues.sort_by_key(|issue| issue.date);
    Ok(issues)
}

fn load_template(cfg: &SiteConfig, name: &str, builtin: &str) -> Result<String> {
    match &cfg.template_dir {
        Some(dir) if dir.join(name).is_file() => {
            let path = dir.join(name);
            fs::read_to_string(&path).with_context(|| format!("Failed to read template {}", path.display()))
        }
        _ => Ok(builtin.to_string()),
    }
}

fn copy_static(from: &Path, to: &Path) -> Result<usize> {
    if !from.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in fs::read_dir(from).with_context(|| format!("Failed to read static dir {}", from.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let target = to.join(file_name(&path));
        fs::copy(&path, &target).with_context(|| format!("Failed to copy {} to {}", path.display(), target.display()))?;
        copied += 1;
    }
    Ok(copied)
}

pub fn build_site(cfg: &SiteConfig) -> Result<BuildStats> {
    let issue_template = load_template(cfg, "issue.html", ISSUE_TEMPLATE)?;
    let index_template = load_template(cfg, "index.html", INDEX_TEMPLATE)?;
    let issues = load_issues(cfg)?;

    let out = &cfg.output_dir;
    fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;

    let all_dates: Vec<NaiveDate> = issues.iter().map(|i| i.date).collect();
    for (i, issue) in issues.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| all_dates[p]);
        let next = all_dates.get(i + 1).copied();
        let html = render_issue_page(&issue_template, issue, prev, next, &all_dates, cfg)?;
        let path = out.join(format!("{}.html", issue.date.format("%Y-%m-%d")));
        fs::write(&path, html).with_context(|| format!("Failed to write {}", path.display()))?;
        info!(
            "{} (#{}: {} news, {} posts)",
            file_name(&path),
            issue.number,
            issue.doc.news_item_count(),
            issue.doc.social_item_count()
        );
    }

    let index = out.join("index.html");
    fs::write(&index, render_archive(&index_template, &issues))
        .with_context(|| format!("Failed to write {}", index.display()))?;
    info!("index.html ({} issues)", issues.len());

    let static_files = copy_static(&cfg.static_dir, out)?;
    let nojekyll = out.join(".nojekyll");
    fs::write(&nojekyll, "").with_context(|| format!("Failed to write {}", nojekyll.display()))?;

    Ok(BuildStats {
        issues: issues.len(),
        news_items: issues.iter().map(|i| i.doc.news_item_count()).sum(),
        social_items: issues.iter().map(|i| i.doc.social_item_count()).sum(),
        static_files,
    })
}
