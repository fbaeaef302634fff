// Name matching and candidate scoring.
//
// A profile's pattern strings are compiled once into a read-only table of
// targets. Source records are matched per target, scored, and the best
// payload per target becomes the run's Selection.

use playlist_sync_model::builtin;
use playlist_sync_model::document::{display_name, normalize_text, Document};
use playlist_sync_model::profile::{
    DeliveryDefaults, MissingPolicy, ProfileSpec, RenderMode, ScoringSpec, SourceScope, SpecError,
    TargetSpec,
};
use playlist_sync_model::selection::{Pick, Selection};
use regex::{Regex, RegexBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("target '{target}': invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        target: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("target '{0}' has no source patterns")]
    NoSourcePatterns(String),

    #[error(transparent)]
    Spec(#[from] SpecError),
}

/// A wanted record with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledTarget {
    pub name: String,
    pub display: String,
    source: Vec<Regex>,
    destination: Regex,
}

impl CompiledTarget {
    fn compile(spec: &TargetSpec) -> Result<Self, ProfileError> {
        if spec.source_patterns.is_empty() {
            return Err(ProfileError::NoSourcePatterns(spec.name.clone()));
        }
        let source = spec
            .source_patterns
            .iter()
            .map(|p| compile_pattern(&spec.name, p))
            .collect::<Result<Vec<_>, _>>()?;

        // Destination patterns always cover the whole line.
        let anchored = format!("^(?:{})$", spec.destination_pattern);
        let destination = RegexBuilder::new(&anchored)
            .case_insensitive(true)
            .build()
            .map_err(|source| ProfileError::InvalidPattern {
                target: spec.name.clone(),
                pattern: spec.destination_pattern.clone(),
                source,
            })?;

        Ok(Self {
            name: spec.name.clone(),
            display: spec.display().to_string(),
            source,
            destination,
        })
    }

    /// True when any source pattern occurs in the given text.
    pub fn matches_source(&self, metadata: &str) -> bool {
        let text = normalize_text(metadata);
        self.source.iter().any(|p| p.is_match(&text))
    }

    /// True when the destination pattern matches the whole trimmed line.
    pub fn matches_destination(&self, metadata: &str) -> bool {
        let text = normalize_text(metadata);
        self.destination.is_match(text.trim())
    }
}

fn compile_pattern(target: &str, pattern: &str) -> Result<Regex, ProfileError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| ProfileError::InvalidPattern {
            target: target.to_string(),
            pattern: pattern.to_string(),
            source,
        })
}

/// Ranks candidates by regional, quality and language markers.
#[derive(Debug, Clone)]
pub struct Scorer {
    regional_markers: Vec<String>,
    quality_markers: Vec<String>,
    language: Option<Regex>,
    regional_bonus: i32,
    quality_bonus: i32,
    language_bonus: i32,
}

impl Scorer {
    fn compile(spec: &ScoringSpec) -> Result<Self, ProfileError> {
        let language = spec
            .language_pattern
            .as_deref()
            .map(|p| compile_pattern("scoring", p))
            .transpose()?;
        Ok(Self {
            regional_markers: spec.regional_markers.iter().map(|m| m.to_lowercase()).collect(),
            quality_markers: spec.quality_markers.iter().map(|m| m.to_lowercase()).collect(),
            language,
            regional_bonus: spec.regional_bonus,
            quality_bonus: spec.quality_bonus,
            language_bonus: spec.language_bonus,
        })
    }

    pub fn score(&self, metadata: &str) -> i32 {
        let raw = normalize_text(metadata);
        let lower = raw.to_lowercase();
        let mut score = 0;

        if self
            .regional_markers
            .iter()
            .any(|m| lower.contains(m.as_str()) || raw.contains(m.as_str()))
        {
            score += self.regional_bonus;
        }
        if self.quality_markers.iter().any(|m| lower.contains(m.as_str())) {
            score += self.quality_bonus;
        }
        if self.language.as_ref().is_some_and(|re| re.is_match(&lower)) {
            score += self.language_bonus;
        }
        score
    }
}

/// A profile ready to run: compiled targets plus rendering policy.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub targets: Vec<CompiledTarget>,
    pub scorer: Scorer,
    pub render: RenderMode,
    pub on_missing: MissingPolicy,
    pub match_on: SourceScope,
    pub defaults: DeliveryDefaults,
}

impl Profile {
    pub fn compile(spec: &ProfileSpec) -> Result<Self, ProfileError> {
        spec.check()?;
        let targets = spec
            .targets
            .iter()
            .map(CompiledTarget::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: spec.name.clone(),
            targets,
            scorer: Scorer::compile(&spec.scoring)?,
            render: spec.render,
            on_missing: spec.on_missing,
            match_on: spec.match_on,
            defaults: spec.defaults.clone(),
        })
    }

    /// Compile one of the built-in profiles by name.
    pub fn builtin(name: &str) -> Result<Self, ProfileError> {
        Self::compile(&builtin::find(name)?)
    }

    pub fn target(&self, name: &str) -> Option<&CompiledTarget> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// The target that claims a destination metadata line: the first one in
    /// declaration order whose destination pattern matches.
    pub fn destination_target(&self, metadata: &str) -> Option<&CompiledTarget> {
        self.targets.iter().find(|t| t.matches_destination(metadata))
    }

    /// Pick the best source payload for every target.
    ///
    /// Records without a payload are never candidates. A record may be a
    /// candidate for more than one target. The highest score wins and ties
    /// go to the record that appears first. Targets with no candidate are
    /// left out of the selection.
    pub fn select(&self, source: &Document) -> Selection {
        let mut selection = Selection::new();

        for target in &self.targets {
            let mut best: Option<Pick> = None;
            let mut candidates = 0usize;

            for record in source.records() {
                let Some(payload) = record.payload_value() else {
                    continue;
                };
                if !target.matches_source(self.source_text(&record.metadata)) {
                    continue;
                }
                candidates += 1;
                let score = self.scorer.score(&record.metadata);
                tracing::debug!(target = %target.name, score, line = %record.metadata, "Candidate");

                if best.as_ref().map_or(true, |b| score > b.score) {
                    best = Some(Pick {
                        target: target.name.clone(),
                        payload: payload.to_string(),
                        metadata: record.metadata.clone(),
                        score,
                    });
                }
            }

            match best {
                Some(pick) => {
                    tracing::info!(target = %target.name, candidates, score = pick.score, "Picked source record");
                    selection.insert(pick);
                }
                None => {
                    tracing::warn!(target = %target.name, "No source candidate");
                }
            }
        }

        selection
    }

    /// The part of a source metadata line that source patterns see.
    fn source_text<'a>(&self, metadata: &'a str) -> &'a str {
        match self.match_on {
            SourceScope::Line => metadata,
            SourceScope::Display => display_name(metadata).unwrap_or(metadata),
        }
    }

    /// Targets that did not make it into the selection.
    pub fn missing<'a>(&'a self, selection: &Selection) -> Vec<&'a str> {
        self.targets
            .iter()
            .filter(|t| !selection.contains(&t.name))
            .map(|t| t.name.as_str())
            .collect()
    }
}
