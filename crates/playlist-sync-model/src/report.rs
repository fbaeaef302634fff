use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::selection::Pick;

/// What the splicer did with one destination target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpliceActionKind {
    /// Existing payload (or normalized metadata) was rewritten.
    Replaced,
    /// Record had no payload; one was inserted after the metadata line.
    Inserted,
    /// Record already carried the selected payload.
    Unchanged,
    /// No destination record existed; a new one was appended.
    Appended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpliceAction {
    pub target: String,
    pub kind: SpliceActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_payload: Option<String>,
    pub new_payload: String,
}

/// Result of splicing a selection into a destination document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceOutcome {
    /// Rendered destination: header first, one trailing newline.
    pub text: String,
    /// Records whose lines actually changed (replacements, insertions, appends).
    pub updates: usize,
    pub actions: Vec<SpliceAction>,
}

impl SpliceOutcome {
    pub fn count(&self, kind: SpliceActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind == kind).count()
    }
}

/// Where the updated document went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Delivery {
    Remote {
        repo: String,
        branch: String,
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        commit: Option<String>,
    },
    Local {
        path: String,
    },
    Skipped {
        reason: String,
    },
}

/// Machine-readable summary of one `update` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub profile: String,
    pub generated_at: DateTime<Utc>,
    pub picks: Vec<Pick>,
    /// Targets with no source candidate.
    pub missing: Vec<String>,
    pub actions: Vec<SpliceAction>,
    pub updates: usize,
    pub delivery: Delivery,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_serializes_tagged() {
        let json = serde_json::to_string(&Delivery::Local { path: "out/x.m3u".into() }).unwrap();
        assert_eq!(json, r#"{"kind":"local","path":"out/x.m3u"}"#);
    }

    #[test]
    fn test_outcome_count() {
        let outcome = SpliceOutcome {
            text: "#EXTM3U\n".into(),
            updates: 1,
            actions: vec![
                SpliceAction {
                    target: "a".into(),
                    kind: SpliceActionKind::Replaced,
                    old_payload: Some("http://old".into()),
                    new_payload: "http://new".into(),
                },
                SpliceAction {
                    target: "b".into(),
                    kind: SpliceActionKind::Unchanged,
                    old_payload: Some("http://same".into()),
                    new_payload: "http://same".into(),
                },
            ],
        };
        assert_eq!(outcome.count(SpliceActionKind::Replaced), 1);
        assert_eq!(outcome.count(SpliceActionKind::Appended), 0);
    }
}
