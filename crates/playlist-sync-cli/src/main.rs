use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use playlist_sync_acquire::events::{DEFAULT_WORKERS, SITE_BASE};
use playlist_sync_acquire::fetch::{fetch_text, http_client, DEFAULT_TIMEOUT};
use playlist_sync_model::{builtin, Document};

mod config;
mod update;

use config::{RunConfig, UpdateArgs};

#[derive(Parser)]
#[command(name = "playlist-sync")]
#[command(about = "Keep selected M3U playlist entries in sync with upstream feeds")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh a destination playlist from a source playlist using a profile
    Update(UpdateArgs),

    /// List the built-in profiles and their targets
    Profiles {
        /// Print the full profile definitions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Copy every record whose name contains a keyword into a new playlist
    Extract {
        /// Keyword to look for (repeatable, case-insensitive)
        #[arg(short, long, required = true)]
        keyword: Vec<String>,

        /// Input playlist URL or local path
        #[arg(short, long)]
        input: String,

        /// Output playlist path
        #[arg(short, long, default_value = "extracted.m3u")]
        output: String,
    },

    /// Build a playlist of web-player links from a list of event pages
    ScrapeEvents {
        /// JSON file with an array of {name, time, url}
        #[arg(short, long)]
        events: String,

        /// Output playlist path
        #[arg(short, long, default_value = "events.m3u")]
        output: String,

        /// Site root used to absolutize relative links
        #[arg(long, default_value = SITE_BASE)]
        base: String,

        /// Pages fetched concurrently
        #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,
    },

    /// Check a playlist for structural problems
    Validate {
        /// Path to the playlist file
        file: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Map log level, suppressing noisy HTML-parsing crates at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn  => "warn",
        LogLevel::Info  => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    if let Err(e) = run(cli.command).await {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Update(args) => {
            let profile = update::load_profile(args.profile.as_deref(), args.profile_file.as_deref())?;
            let config = RunConfig::resolve(&args, &profile.defaults)?;
            tracing::info!(
                profile = %profile.name,
                targets = profile.targets.len(),
                source = %config.source,
                dest = %config.destination,
                "Starting update"
            );
            update::run(&config, &profile).await?;
        }
        Commands::Profiles { json } => {
            let profiles = builtin::all();
            if json {
                println!("{}", serde_json::to_string_pretty(&profiles)?);
            } else {
                for profile in &profiles {
                    println!(
                        "{:<16} {}",
                        profile.name,
                        profile.description.as_deref().unwrap_or_default()
                    );
                    for target in &profile.targets {
                        println!("    {}", target.display());
                    }
                }
            }
        }
        Commands::Extract { keyword, input, output } => {
            tracing::info!(input = %input, keywords = ?keyword, "Extracting records");
            let client = http_client(DEFAULT_TIMEOUT)?;
            let text = fetch_text(&client, &input).await?;
            let extracted =
                playlist_sync_parse::extract_by_keywords(&Document::parse(&text), &keyword);
            let count = extracted.records().count();
            if count == 0 {
                tracing::warn!("No records matched the keywords");
            }
            playlist_sync_acquire::output::write_local(&output, &extracted.render())?;
            tracing::info!(records = count, path = %output, "Wrote extracted playlist");
        }
        Commands::ScrapeEvents { events, output, base, workers } => {
            let events = playlist_sync_acquire::events::load_events(&events)?;
            let doc = playlist_sync_acquire::events::scrape_events(events, &base, workers).await?;
            playlist_sync_acquire::output::write_local(&output, &doc.render())
                .with_context(|| format!("Failed to save {output}"))?;
        }
        Commands::Validate { file } => {
            tracing::info!(file = %file, "Validating");
            let errors = playlist_sync_validate::validate(&file)?;
            if !errors.is_empty() {
                anyhow::bail!("{} validation errors in {file}", errors.len());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_requires_a_profile() {
        assert!(Cli::try_parse_from(["playlist-sync", "update"]).is_err());
        assert!(Cli::try_parse_from([
            "playlist-sync", "update", "--profile", "bein", "--profile-file", "p.json"
        ])
        .is_err());
    }

    #[test]
    fn test_update_flags_parse() {
        let cli = Cli::try_parse_from([
            "playlist-sync", "--utc", "update", "-p", "dazn-pt", "--dry-run", "--timeout", "10",
        ])
        .unwrap();
        match cli.command {
            Commands::Update(args) => {
                assert_eq!(args.profile.as_deref(), Some("dazn-pt"));
                assert!(args.dry_run);
                assert_eq!(args.timeout, 10);
            }
            _ => panic!("expected update"),
        }
    }

    #[test]
    fn test_extract_needs_keyword() {
        assert!(Cli::try_parse_from(["playlist-sync", "extract", "-i", "in.m3u"]).is_err());
        assert!(Cli::try_parse_from(["playlist-sync", "extract", "-i", "in.m3u", "-k", "bein"]).is_ok());
    }
}
