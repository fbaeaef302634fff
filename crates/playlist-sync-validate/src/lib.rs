use anyhow::Result;
use playlist_sync_model::document::{display_name, is_header, Document, Entry};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing #EXTM3U header on line 1")]
    MissingHeader,

    #[error("header repeated on line {0}")]
    RepeatedHeader(usize),

    #[error("record '{0}' has no payload line")]
    MissingPayload(String),

    #[error("record '{0}' appears more than once")]
    DuplicateName(String),

    #[error("record '{name}' has a payload that doesn't look like a stream address: {payload}")]
    SuspiciousPayload { name: String, payload: String },

    #[error("playlist contains no records")]
    Empty,
}

const STREAM_SCHEMES: [&str; 6] = ["http://", "https://", "rtmp://", "rtsp://", "udp://", "rtp://"];

/// Validate a playlist file, logging every problem found.
pub fn validate(file_path: &str) -> Result<Vec<ValidationError>> {
    let contents = std::fs::read_to_string(file_path)?;
    let doc = Document::parse(&contents);
    let errors = validate_document(&doc);
    if errors.is_empty() {
        tracing::info!(path = %file_path, records = doc.records().count(), "Playlist is valid");
    }
    Ok(errors)
}

/// Check a parsed playlist for structural problems.
pub fn validate_document(doc: &Document) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !doc.has_header() {
        errors.push(ValidationError::MissingHeader);
    }

    let mut line_no = 0usize;
    let mut seen = HashSet::new();
    let mut records = 0usize;

    for entry in &doc.entries {
        match entry {
            Entry::PassThrough(line) => {
                line_no += 1;
                if line_no > 1 && is_header(line) {
                    errors.push(ValidationError::RepeatedHeader(line_no));
                }
            }
            Entry::Record(record) => {
                records += 1;
                line_no += if record.payload.is_some() { 2 } else { 1 };

                let name = display_name(&record.metadata)
                    .unwrap_or(record.metadata.as_str())
                    .to_string();
                if !seen.insert(name.to_lowercase()) {
                    errors.push(ValidationError::DuplicateName(name.clone()));
                }
                match record.payload_value() {
                    None => errors.push(ValidationError::MissingPayload(name)),
                    Some(payload) => {
                        let lower = payload.to_lowercase();
                        if !STREAM_SCHEMES.iter().any(|s| lower.starts_with(s)) {
                            errors.push(ValidationError::SuspiciousPayload {
                                name,
                                payload: payload.to_string(),
                            });
                        }
                    }
                }
            }
        }
    }

    if records == 0 {
        errors.push(ValidationError::Empty);
    }

    for e in &errors {
        tracing::warn!("{e}");
    }

    errors
}
