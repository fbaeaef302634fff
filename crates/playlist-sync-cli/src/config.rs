// Run configuration.
//
// Flags and their environment fallbacks are parsed by clap, then merged with
// the profile's defaults into one immutable RunConfig that the update
// pipeline receives by reference.

use anyhow::Result;
use clap::Args;
use playlist_sync_acquire::store::{StoreConfig, DEFAULT_API_URL};
use playlist_sync_model::profile::DeliveryDefaults;
use std::time::Duration;

#[derive(Args, Debug, Clone, Default)]
pub struct UpdateArgs {
    /// Built-in profile: premier-league, dazn-pt, bein, match-football
    #[arg(short, long, required_unless_present = "profile_file", conflicts_with = "profile_file")]
    pub profile: Option<String>,

    /// Load the profile from a JSON file instead
    #[arg(long)]
    pub profile_file: Option<String>,

    /// Source playlist URL or local path
    #[arg(long, env = "SOURCE_URL")]
    pub source: Option<String>,

    /// Destination playlist URL or local path (read side)
    #[arg(long, env = "DEST_RAW_URL")]
    pub dest: Option<String>,

    /// GitHub token; without one the result is written locally
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub repository as owner/name
    #[arg(long, env = "GITHUB_REPO")]
    pub repo: Option<String>,

    #[arg(long, env = "GITHUB_BRANCH")]
    pub branch: Option<String>,

    /// Path of the playlist inside the repository
    #[arg(long, env = "DEST_REPO_PATH")]
    pub repo_path: Option<String>,

    /// Commit message for the remote write
    #[arg(short, long, env = "COMMIT_MESSAGE")]
    pub message: Option<String>,

    /// Local output path used when no token is set
    #[arg(short, long, env = "OUTPUT_LOCAL_PATH")]
    pub output: Option<String>,

    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 25)]
    pub timeout: u64,

    /// Don't write when nothing changed
    #[arg(long, env = "SKIP_UNCHANGED")]
    pub skip_unchanged: bool,

    /// Compute and print the result without writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Also write a JSON run report to this path
    #[arg(long)]
    pub report: Option<String>,
}

/// Where the updated playlist goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Remote {
        store: StoreConfig,
        path: String,
        message: String,
    },
    Local {
        path: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub source: String,
    pub destination: String,
    pub output: Output,
    pub timeout: Duration,
    pub skip_unchanged: bool,
    pub dry_run: bool,
    pub report: Option<String>,
}

impl RunConfig {
    /// Merge explicit settings over profile defaults.
    ///
    /// A non-empty token routes output to GitHub; otherwise it goes to the
    /// local fallback path.
    pub fn resolve(args: &UpdateArgs, defaults: &DeliveryDefaults) -> Result<Self> {
        let source = pick(&args.source, &defaults.source_url);
        let destination = pick(&args.dest, &defaults.dest_url);
        anyhow::ensure!(!source.is_empty(), "No source address: set --source or SOURCE_URL");
        anyhow::ensure!(
            !destination.is_empty(),
            "No destination address: set --dest or DEST_RAW_URL"
        );

        let token = args.token.as_deref().map(str::trim).unwrap_or_default();
        let output = if token.is_empty() {
            let path = pick(&args.output, &defaults.output_local_path);
            anyhow::ensure!(!path.is_empty(), "No local output path: set --output or OUTPUT_LOCAL_PATH");
            Output::Local { path }
        } else {
            let repo = pick(&args.repo, &defaults.repo);
            let path = pick(&args.repo_path, &defaults.repo_path);
            anyhow::ensure!(!repo.is_empty(), "No repository: set --repo or GITHUB_REPO");
            anyhow::ensure!(!path.is_empty(), "No repository path: set --repo-path or DEST_REPO_PATH");

            let mut branch = pick(&args.branch, &defaults.branch);
            if branch.is_empty() {
                branch = "main".to_string();
            }
            let mut message = pick(&args.message, &defaults.commit_message);
            if message.is_empty() {
                message = format!("update {path}");
            }

            Output::Remote {
                store: StoreConfig {
                    api_url: args.api_url.clone(),
                    repo,
                    branch,
                    token: token.to_string(),
                },
                path,
                message,
            }
        };

        Ok(Self {
            source,
            destination,
            output,
            timeout: Duration::from_secs(args.timeout.max(1)),
            skip_unchanged: args.skip_unchanged,
            dry_run: args.dry_run,
            report: args.report.clone(),
        })
    }
}

/// Explicit, non-blank value if given, else the default.
fn pick(explicit: &Option<String>, default: &str) -> String {
    explicit
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}
