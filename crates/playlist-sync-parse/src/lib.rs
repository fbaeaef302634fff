use playlist_sync_model::document::Document;
use playlist_sync_model::report::SpliceOutcome;
use playlist_sync_model::selection::Selection;

pub mod matcher;
pub mod splice;
pub mod extract;

pub use matcher::{CompiledTarget, Profile, ProfileError, Scorer};
pub use splice::splice;
pub use extract::extract_by_keywords;

/// Selection and splice result of one refresh.
#[derive(Debug, Clone)]
pub struct Refresh {
    pub selection: Selection,
    pub outcome: SpliceOutcome,
}

/// Run the whole text pipeline: parse both documents, select the best
/// source payload per target, and splice the picks into the destination.
pub fn refresh(source_text: &str, destination_text: &str, profile: &Profile) -> Refresh {
    let source = Document::parse(source_text);
    tracing::info!(records = source.records().count(), "Parsed source playlist");

    let selection = profile.select(&source);
    for target in &profile.targets {
        let mark = if selection.contains(&target.name) { "✓" } else { "x" };
        tracing::info!("  {mark} {}", target.name);
    }

    let destination = Document::parse(destination_text);
    tracing::info!(records = destination.records().count(), "Parsed destination playlist");

    let outcome = splice(&destination, &selection, profile);
    Refresh { selection, outcome }
}
