mod config;
mod model;
mod parser;
mod render;
mod site;

use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use config::SiteConfig;
use model::{DigestDocument, Item, Section};

#[derive(Parser)]
#[command(name = "daily_digest", about = "Markdown daily digests to a static site")]
struct Cli {
    /// YAML config file (default: ./daily_digest.yaml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Override the content directory
    #[arg(long, global = true)]
    content: Option<PathBuf>,
    /// Override the output directory
    #[arg(long, global = true)]
    out: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse every document and write the site
    Build,
    /// Parse a single document
    Parse {
        file: PathBuf,
        /// Print the parsed document as JSON
        #[arg(long)]
        json: bool,
    },
    /// Per-issue counts for the content directory
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = SiteConfig::load(cli.config.as_deref())?.with_overrides(cli.content, cli.out);

    match cli.command {
        Commands::Build => {
            let t0 = Instant::now();
            println!(
                "Building {} -> {}...",
                cfg.content_dir.display(),
                cfg.output_dir.display()
            );
            let stats = site::build_site(&cfg)?;
            println!(
                "Built {} issues ({} news, {} posts, {} static files) into {} in {:.2}s",
                stats.issues,
                stats.news_items,
                stats.social_items,
                stats.static_files,
                cfg.output_dir.display(),
                t0.elapsed().as_secs_f64()
            );
            Ok(())
        }
        Commands::Parse { file, json } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let doc = parser::parse_document(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print_summary(&doc);
            }
            Ok(())
        }
        Commands::Stats => {
            let issues = site::load_issues(&cfg)?;
            if issues.is_empty() {
                println!("No dated documents in {}.", cfg.content_dir.display());
                return Ok(());
            }

            println!("{:<10} | {:>5} | {:>5} | {:>5}", "Date", "#", "News", "Posts");
            println!("{}", "-".repeat(34));
            for issue in &issues {
                println!(
                    "{:<10} | {:>5} | {:>5} | {:>5}",
                    issue.date.format("%Y-%m-%d"),
                    issue.number,
                    issue.doc.news_item_count(),
                    issue.doc.social_item_count()
                );
            }

            let news: usize = issues.iter().map(|i| i.doc.news_item_count()).sum();
            let posts: usize = issues.iter().map(|i| i.doc.social_item_count()).sum();
            println!("\n{} issues | {} news | {} posts", issues.len(), news, posts);
            Ok(())
        }
    }
}

fn print_summary(doc: &DigestDocument) {
    println!("Date: {}", doc.date);
    print_sections("News", &doc.news, doc.news_item_count());
    print_sections("Social", &doc.social, doc.social_item_count());
}

fn print_sections(kind: &str, sections: &[Section], total: usize) {
    println!("\n{} ({} items)", kind, total);
    for section in sections {
        println!("  {} {} ({})", section.emoji, section.label, section.items.len());
        for item in &section.items {
            let line = match item {
                Item::News(n) => format!("{} [{}]", n.title, n.source.as_deref().unwrap_or("-")),
                Item::GroupTitle { label } => format!("== {} ==", label),
                Item::Social(p) => format!("@{}: {}", p.handle, p.summary),
            };
            println!("    {}", truncate(&line, 72));
        }
    }
}

/// Cut to `max` characters, marking the cut with `...`.
fn truncate(s: &str, max: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max) {
        Some((end, _)) => Cow::Owned(format!("{}...", &s[..end])),
        None => Cow::Borrowed(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("小虾日报", 4), "小虾日报");
        assert_eq!(truncate("小虾日报 #155", 4), "小虾日报...");
        assert!(matches!(truncate("short", 72), Cow::Borrowed(_)));
    }
}
