use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use jsonfeed::config::Config;
use jsonfeed::feed::{document, fetcher, join_attachments, Feed};

/// Get the default config file path (~/.config/jsonfeed/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("jsonfeed")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(name = "jsonfeed", version, about = "Inspect and normalize JSON Feed documents")]
struct Args {
    /// Config file (defaults to ~/.config/jsonfeed/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a document and report whether it is a valid feed
    Check {
        /// Local path or http(s) URL
        source: String,
    },
    /// Decode a document and write it back in minimal form
    Normalize {
        /// Local path or http(s) URL
        source: String,

        /// Write to FILE instead of stdout (replaced atomically)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Compact output regardless of the `pretty` setting
        #[arg(long)]
        compact: bool,
    },
    /// Print a feed's metadata and items as plain text
    Show {
        /// Local path or http(s) URL
        source: String,
    },
}

fn is_remote(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

async fn load(source: &str, config: &Config) -> Result<Feed> {
    if is_remote(source) {
        let fetch_config = config.fetch_config();
        let client = fetch_config
            .build_client(&config.user_agent)
            .context("Failed to build HTTP client")?;
        fetcher::load_remote(&client, source, &fetch_config)
            .await
            .with_context(|| format!("Failed to load feed from {}", source))
    } else {
        document::load_file(Path::new(source), config.max_document_bytes)
            .with_context(|| format!("Failed to load feed from '{}'", source))
    }
}

fn print_feed(feed: &Feed, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{}", feed.title())?;
    if let Some(description) = &feed.description {
        writeln!(out, "{}", description)?;
    }
    if let Some(url) = &feed.home_page_url {
        writeln!(out, "Home page: {}", url)?;
    }
    if let Some(url) = &feed.feed_url {
        writeln!(out, "Feed URL: {}", url)?;
    }
    if feed.expired {
        writeln!(out, "Expired: yes")?;
    }
    writeln!(out, "{}", feed.author)?;
    for hub in &feed.hubs {
        writeln!(out, "Hub ({}): {}", hub.kind, hub.url)?;
    }

    for item in &feed.items {
        writeln!(out)?;
        writeln!(out, "[{}] {}", item.id(), item.title.as_deref().unwrap_or("(untitled)"))?;
        writeln!(out, "Published: {}", item.date_published.to_rfc2822())?;
        if let Some(modified) = item.date_modified {
            writeln!(out, "Modified: {}", modified.to_rfc2822())?;
        }
        if let Some(url) = &item.url {
            writeln!(out, "Link: {}", url)?;
        }
        if !item.tags.is_empty() {
            writeln!(out, "Tags: {}", item.tags.join(", "))?;
        }
        let text = item.text_content();
        if !text.trim().is_empty() {
            writeln!(out, "{}", text.trim())?;
        }
        if !item.attachments.is_empty() {
            writeln!(out, "{}", join_attachments(&item.attachments, "\n--\n"))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path.display()))?;

    match args.command {
        Command::Check { source } => match load(&source, &config).await {
            Ok(feed) => {
                println!(
                    "OK: \"{}\" ({} item{})",
                    feed.title(),
                    feed.items.len(),
                    if feed.items.len() == 1 { "" } else { "s" }
                );
            }
            Err(e) => {
                eprintln!("Invalid: {:#}", e);
                std::process::exit(1);
            }
        },
        Command::Normalize {
            source,
            output,
            compact,
        } => {
            let feed = load(&source, &config).await?;
            let pretty = config.pretty && !compact;
            match output {
                Some(path) => {
                    document::save_file(&feed, &path, pretty)
                        .with_context(|| format!("Failed to save feed to '{}'", path.display()))?;
                    tracing::info!(path = %path.display(), items = feed.items.len(), "Wrote normalized feed");
                }
                None => {
                    let text = if pretty {
                        document::to_pretty_string(&feed)?
                    } else {
                        String::from_utf8(document::encode(&feed)?)?
                    };
                    let mut stdout = std::io::stdout().lock();
                    writeln!(stdout, "{}", text)?;
                }
            }
        }
        Command::Show { source } => {
            let feed = load(&source, &config).await?;
            let mut stdout = std::io::stdout().lock();
            print_feed(&feed, &mut stdout)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonfeed::feed::{Author, Item};

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.org/feed.json"));
        assert!(is_remote("HTTP://example.org/feed.json"));
        assert!(!is_remote("feed.json"));
        assert!(!is_remote("/srv/https/feed.json"));
        assert!(!is_remote("ftp://example.org/feed.json"));
    }

    #[test]
    fn test_print_feed_renders_items() {
        let mut feed = Feed::new("Listing", Author::named("Ann")).unwrap();
        let mut item = Item::new("a1", "<p>Body <em>text</em></p>", chrono::Utc::now());
        item.title = Some("First".to_string());
        item.tags = vec!["rust".to_string(), "feeds".to_string()];
        feed.items.push(item);

        let mut out = Vec::new();
        print_feed(&feed, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Listing\n"));
        assert!(text.contains("Name: Ann"));
        assert!(text.contains("[a1] First"));
        assert!(text.contains("Tags: rust, feeds"));
        assert!(text.contains("Body text"));
    }

    #[test]
    fn test_args_parse_normalize() {
        let args = Args::try_parse_from(["jsonfeed", "normalize", "in.json", "-o", "out.json", "--compact"])
            .unwrap();
        match args.command {
            Command::Normalize {
                source,
                output,
                compact,
            } => {
                assert_eq!(source, "in.json");
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert!(compact);
            }
            other => panic!("Expected Normalize, got {:?}", other),
        }
    }
}
