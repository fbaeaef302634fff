use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A declarative description of one updater run: which records to pull from
/// the source, how to recognize them in the destination, and how to write
/// them back.
///
/// Profiles are plain data. Patterns are kept as strings here and compiled
/// once by the parse crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Targets in declaration order. Order is significant: when two targets
    /// match the same destination record, the earlier one claims it.
    pub targets: Vec<TargetSpec>,
    #[serde(default)]
    pub scoring: ScoringSpec,
    #[serde(default)]
    pub render: RenderMode,
    #[serde(default)]
    pub on_missing: MissingPolicy,
    #[serde(default)]
    pub match_on: SourceScope,
    #[serde(default)]
    pub defaults: DeliveryDefaults,
}

/// One wanted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Key used in selections and logs (e.g., "TNT 1").
    pub name: String,
    /// Canonical display text for rebuilt metadata lines. Falls back to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Case-insensitive patterns searched anywhere in a source metadata line.
    pub source_patterns: Vec<String>,
    /// Case-insensitive pattern that must match a whole destination metadata line.
    pub destination_pattern: String,
}

impl TargetSpec {
    pub fn display(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.name)
    }
}

/// Bonuses used to rank several source candidates for the same target.
///
/// Only the ordering regional > quality > language matters; the exact
/// weights are tunable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSpec {
    /// Substrings looked up in the lowercased metadata line. Entries that are
    /// not ASCII (flag glyphs) are looked up in the raw line.
    pub regional_markers: Vec<String>,
    pub quality_markers: Vec<String>,
    /// Regex for a preferred-language tag.
    pub language_pattern: Option<String>,
    pub regional_bonus: i32,
    pub quality_bonus: i32,
    pub language_bonus: i32,
}

impl Default for ScoringSpec {
    fn default() -> Self {
        Self {
            regional_markers: Vec::new(),
            quality_markers: [" uhd", " 4k", " fhd", " hd"]
                .into_iter()
                .map(String::from)
                .collect(),
            language_pattern: Some(r"\b(en|english)\b".to_string()),
            regional_bonus: 5,
            quality_bonus: 2,
            language_bonus: 1,
        }
    }
}

/// How a matched destination record's metadata line is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Keep the existing metadata line byte-for-byte.
    #[default]
    Strict,
    /// Rewrite it as `#EXTINF:-1,<display>`.
    Normalize,
}

/// What to do with a selected target that has no destination record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Never create records.
    #[default]
    UpdateOnly,
    /// Append a clean record under a `# --- <display> ---` separator.
    Append,
}

/// Which part of a source metadata line the source patterns look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceScope {
    /// The whole `#EXTINF` line, attributes included.
    #[default]
    Line,
    /// Only the display text after the first comma.
    Display,
}

/// Default addresses for a profile; every field can be overridden at run time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryDefaults {
    pub source_url: String,
    pub dest_url: String,
    pub repo: String,
    pub branch: String,
    pub repo_path: String,
    pub commit_message: String,
    pub output_local_path: String,
}

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    #[error("profile '{0}' declares no targets")]
    NoTargets(String),

    #[error("profile '{profile}' declares target '{target}' more than once")]
    DuplicateTarget { profile: String, target: String },

    #[error("invalid profile JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProfileSpec {
    /// Load a profile from JSON and check its shape.
    pub fn from_json(text: &str) -> Result<Self, SpecError> {
        let spec: ProfileSpec = serde_json::from_str(text)?;
        spec.check()?;
        Ok(spec)
    }

    /// Structural checks that don't need compiled patterns.
    pub fn check(&self) -> Result<(), SpecError> {
        if self.targets.is_empty() {
            return Err(SpecError::NoTargets(self.name.clone()));
        }
        for (i, target) in self.targets.iter().enumerate() {
            if self.targets[..i].iter().any(|t| t.name == target.name) {
                return Err(SpecError::DuplicateTarget {
                    profile: self.name.clone(),
                    target: target.name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_applies_defaults() {
        let json = r#"{
            "name": "custom",
            "targets": [
                { "name": "CH 1", "source_patterns": ["ch\\s*1"], "destination_pattern": "^#EXTINF.*CH 1$" }
            ]
        }"#;
        let spec = ProfileSpec::from_json(json).unwrap();
        assert_eq!(spec.render, RenderMode::Strict);
        assert_eq!(spec.on_missing, MissingPolicy::UpdateOnly);
        assert_eq!(spec.match_on, SourceScope::Line);
        assert_eq!(spec.scoring.regional_bonus, 5);
        assert_eq!(spec.targets[0].display(), "CH 1");
    }

    #[test]
    fn test_from_json_modes() {
        let json = r#"{
            "name": "clean",
            "render": "normalize",
            "on_missing": "append",
            "match_on": "display",
            "targets": [
                { "name": "a", "display": "A!", "source_patterns": [], "destination_pattern": "a" }
            ]
        }"#;
        let spec = ProfileSpec::from_json(json).unwrap();
        assert_eq!(spec.render, RenderMode::Normalize);
        assert_eq!(spec.on_missing, MissingPolicy::Append);
        assert_eq!(spec.match_on, SourceScope::Display);
        assert_eq!(spec.targets[0].display(), "A!");
    }

    #[test]
    fn test_no_targets_rejected() {
        let err = ProfileSpec::from_json(r#"{ "name": "empty", "targets": [] }"#).unwrap_err();
        assert!(matches!(err, SpecError::NoTargets(_)));
    }

    #[test]
    fn test_duplicate_target_rejected() {
        let json = r#"{
            "name": "dup",
            "targets": [
                { "name": "x", "source_patterns": [], "destination_pattern": "x" },
                { "name": "x", "source_patterns": [], "destination_pattern": "y" }
            ]
        }"#;
        let err = ProfileSpec::from_json(json).unwrap_err();
        assert!(matches!(err, SpecError::DuplicateTarget { .. }));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(ProfileSpec::from_json("{"), Err(SpecError::Json(_))));
    }
}
