// Keyword extraction: copy every record whose metadata mentions a keyword
// into a fresh playlist.

use playlist_sync_model::document::{normalize_text, Document, Record};

/// Build a new playlist holding the records whose metadata line contains
/// any of the keywords (case-insensitive). Lines are trimmed; records keep
/// their payload if they had one.
pub fn extract_by_keywords(source: &Document, keywords: &[String]) -> Document {
    let needles: Vec<String> = keywords
        .iter()
        .map(|k| normalize_text(k.trim()).to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    let records: Vec<Record> = source
        .records()
        .filter(|r| {
            let hay = normalize_text(&r.metadata).to_lowercase();
            needles.iter().any(|n| hay.contains(n.as_str()))
        })
        .map(|r| Record::new(r.metadata.trim(), r.payload_value().map(String::from)))
        .collect();

    tracing::info!(
        keywords = ?needles,
        matched = records.len(),
        total = source.records().count(),
        "Extracted records"
    );

    Document::from_records(records)
}
