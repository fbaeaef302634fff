// Line-oriented M3U playlist model.
//
// A document is an ordered list of entries: records (an `#EXTINF` line plus
// the payload line that follows it, if any) and pass-through lines (header,
// comments, blanks). Raw line text is kept so that re-emitting a document
// reproduces it exactly.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Required first line of every emitted playlist.
pub const HEADER: &str = "#EXTM3U";

/// Marker that starts a record's metadata line.
pub const METADATA_MARKER: &str = "#EXTINF";

const BOM: char = '\u{feff}';

/// A metadata line plus its payload line (usually a stream URL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// The `#EXTINF...` line exactly as it appeared in the input.
    pub metadata: String,
    /// The payload line exactly as it appeared, or `None` when the record
    /// has no payload yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl Record {
    pub fn new(metadata: impl Into<String>, payload: Option<String>) -> Self {
        Self {
            metadata: metadata.into(),
            payload,
        }
    }

    /// Build a record with a clean `#EXTINF:-1,<display>` metadata line.
    pub fn clean(display: &str, payload: impl Into<String>) -> Self {
        Self {
            metadata: clean_metadata(display),
            payload: Some(payload.into()),
        }
    }

    /// Trimmed payload value.
    pub fn payload_value(&self) -> Option<&str> {
        self.payload.as_deref().map(str::trim)
    }

    /// Display name after the attribute list (`#EXTINF:-1 tvg-id="x",NAME`).
    pub fn display_name(&self) -> Option<&str> {
        display_name(&self.metadata)
    }
}

/// One logical unit of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Record(Record),
    /// Header, comment, blank or otherwise unrecognized line.
    PassThrough(String),
}

/// An M3U playlist as an ordered sequence of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub entries: Vec<Entry>,
}

impl Document {
    /// Parse raw playlist text.
    ///
    /// A metadata line followed by a payload line becomes a record that
    /// consumes both. A metadata line followed by a comment, a blank line,
    /// another metadata line or end of input becomes a record without a
    /// payload, and the following line is scanned on its own. Everything
    /// else passes through untouched. A leading byte-order mark is dropped.
    /// Parsing never fails.
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix(BOM).unwrap_or(text);
        let lines: Vec<&str> = text.lines().collect();
        let mut entries = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            if is_metadata(line) {
                match lines.get(i + 1) {
                    Some(next) if is_payload(next) => {
                        entries.push(Entry::Record(Record::new(line, Some(next.to_string()))));
                        i += 2;
                    }
                    _ => {
                        entries.push(Entry::Record(Record::new(line, None)));
                        i += 1;
                    }
                }
                continue;
            }
            entries.push(Entry::PassThrough(line.to_string()));
            i += 1;
        }

        Self { entries }
    }

    /// A fresh playlist holding only a header and the given records.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut entries = vec![Entry::PassThrough(HEADER.to_string())];
        entries.extend(records.into_iter().map(Entry::Record));
        Self { entries }
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Record(r) => Some(r),
            Entry::PassThrough(_) => None,
        })
    }

    /// True when the first line is an `#EXTM3U` header.
    pub fn has_header(&self) -> bool {
        matches!(self.entries.first(), Some(Entry::PassThrough(line)) if is_header(line))
    }

    /// Put the header at line 0. A header line found before the first record
    /// is moved there; otherwise a new one is prepended. Returns true when
    /// the document changed.
    pub fn ensure_header(&mut self) -> bool {
        if self.has_header() {
            return false;
        }
        let existing = self
            .entries
            .iter()
            .take_while(|e| matches!(e, Entry::PassThrough(_)))
            .position(|e| matches!(e, Entry::PassThrough(line) if is_header(line)));
        let header = match existing {
            Some(index) => self.entries.remove(index),
            None => Entry::PassThrough(HEADER.to_string()),
        };
        self.entries.insert(0, header);
        true
    }

    /// All lines of the document in order.
    pub fn lines(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.entries.len() * 2);
        for entry in &self.entries {
            match entry {
                Entry::Record(r) => {
                    out.push(r.metadata.as_str());
                    if let Some(p) = &r.payload {
                        out.push(p.as_str());
                    }
                }
                Entry::PassThrough(line) => out.push(line.as_str()),
            }
        }
        out
    }

    /// Render with trailing whitespace trimmed and exactly one final newline.
    pub fn render(&self) -> String {
        render_lines(self.lines())
    }
}

/// Join lines with `\n`, trim trailing whitespace and terminate with one `\n`.
pub fn render_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    let joined = lines.into_iter().collect::<Vec<_>>().join("\n");
    let mut out = joined.trim_end().to_string();
    out.push('\n');
    out
}

pub fn is_header(line: &str) -> bool {
    let line = line.trim_start_matches(BOM);
    starts_with_ignore_case(line.trim(), HEADER)
}

pub fn is_metadata(line: &str) -> bool {
    starts_with_ignore_case(line.trim_start(), METADATA_MARKER)
}

/// A payload line is any non-empty line that is not a comment or directive.
pub fn is_payload(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// Text after the first comma of a metadata line, trimmed.
pub fn display_name(metadata: &str) -> Option<&str> {
    if !is_metadata(metadata) {
        return None;
    }
    metadata.split_once(',').map(|(_, name)| name.trim())
}

pub fn clean_metadata(display: &str) -> String {
    format!("{METADATA_MARKER}:-1,{display}")
}

/// NFC-normalize a line so composed and decomposed spellings match alike.
pub fn normalize_text(input: &str) -> String {
    input.nfc().collect()
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
