use anyhow::{Context, Result};
use playlist_sync_acquire::fetch::{fetch_text, http_client};
use playlist_sync_acquire::output::{write_json, write_local};
use playlist_sync_acquire::store::GitHubStore;
use playlist_sync_model::profile::ProfileSpec;
use playlist_sync_model::report::{Delivery, RunReport};
use playlist_sync_model::Document;
use playlist_sync_parse::{refresh, Profile};

use crate::config::{Output, RunConfig};

/// Resolve `--profile` or `--profile-file` into a compiled profile.
pub fn load_profile(name: Option<&str>, file: Option<&str>) -> Result<Profile> {
    match (name, file) {
        (_, Some(path)) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read profile {path}"))?;
            let spec = ProfileSpec::from_json(&text)
                .with_context(|| format!("Invalid profile {path}"))?;
            Ok(Profile::compile(&spec)?)
        }
        (Some(name), None) => Ok(Profile::builtin(name)?),
        (None, None) => anyhow::bail!("No profile given: use --profile or --profile-file"),
    }
}

/// Fetch, select, splice and deliver one playlist.
pub async fn run(config: &RunConfig, profile: &Profile) -> Result<RunReport> {
    let client = http_client(config.timeout)?;

    tracing::info!(profile = %profile.name, "Fetching source playlist");
    let source = fetch_text(&client, &config.source)
        .await
        .context("Source fetch failed")?;
    tracing::info!("Fetching destination playlist");
    let destination = fetch_text(&client, &config.destination)
        .await
        .context("Destination fetch failed")?;

    let result = refresh(&source, &destination, profile);
    let outcome = &result.outcome;

    let problems = playlist_sync_validate::validate_document(&Document::parse(&outcome.text));
    if !problems.is_empty() {
        tracing::warn!(problems = problems.len(), "Updated playlist has structural problems");
    }

    let delivery = if result.selection.is_empty() {
        tracing::warn!("No source records matched any target; nothing to write");
        Delivery::Skipped { reason: "no source matches".to_string() }
    } else if config.skip_unchanged && outcome.updates == 0 {
        tracing::info!("Destination already up to date; skipping write");
        Delivery::Skipped { reason: "unchanged".to_string() }
    } else if config.dry_run {
        print!("{}", outcome.text);
        Delivery::Skipped { reason: "dry run".to_string() }
    } else {
        deliver(config, &client, &outcome.text).await?
    };

    let report = RunReport {
        profile: profile.name.clone(),
        generated_at: chrono::Utc::now(),
        picks: result.selection.iter().cloned().collect(),
        missing: profile
            .missing(&result.selection)
            .into_iter()
            .map(String::from)
            .collect(),
        actions: outcome.actions.clone(),
        updates: outcome.updates,
        delivery,
    };

    if let Some(path) = &config.report {
        write_json(path, &report)?;
        tracing::info!(path = %path, "Wrote run report");
    }

    tracing::info!(
        updates = report.updates,
        picked = report.picks.len(),
        missing = report.missing.len(),
        "Update complete"
    );
    Ok(report)
}

async fn deliver(config: &RunConfig, client: &reqwest::Client, text: &str) -> Result<Delivery> {
    match &config.output {
        Output::Remote { store, path, message } => {
            let github = GitHubStore::new(client.clone(), store.clone());
            let receipt = github
                .upsert(path, text, message)
                .await
                .with_context(|| format!("GitHub write to {}:{path} failed", store.repo))?;
            tracing::info!(
                path = %receipt.path,
                created = receipt.created,
                commit = receipt.commit.as_deref().unwrap_or("-"),
                "Updated on GitHub"
            );
            Ok(Delivery::Remote {
                repo: store.repo.clone(),
                branch: store.branch.clone(),
                path: receipt.path,
                commit: receipt.commit,
            })
        }
        Output::Local { path } => {
            let written = write_local(path, text)?;
            Ok(Delivery::Local { path: written.display().to_string() })
        }
    }
}
