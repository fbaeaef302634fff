// Built-in profiles for the playlists this tool keeps up to date.

use crate::profile::{
    DeliveryDefaults, MissingPolicy, ProfileSpec, RenderMode, ScoringSpec, SourceScope, SpecError,
    TargetSpec,
};

const DADDYLIVE_CHANNELS: &str = "https://raw.githubusercontent.com/pigzillaaa/daddylive/bc876b2f7935aeeb0df5b1c6b62b3c5f33998368/daddylive-channels-events.m3u8";
const DADDYLIVE_EVENTS: &str = "https://raw.githubusercontent.com/DisabledAbel/daddylivehd-m3u/f582ae100c91adf8c8db905a8f97beb42f369a0b/daddylive-events.m3u8";

const UK_MARKERS: [&str; 5] = [" uk", "(uk", "[uk", " united kingdom", "🇬🇧"];

/// Names of all built-in profiles, in listing order.
pub const NAMES: [&str; 4] = ["premier-league", "dazn-pt", "bein", "match-football"];

pub fn all() -> Vec<ProfileSpec> {
    vec![premier_league(), dazn_pt(), bein(), match_football()]
}

pub fn find(name: &str) -> Result<ProfileSpec, SpecError> {
    match name {
        "premier-league" => Ok(premier_league()),
        "dazn-pt" => Ok(dazn_pt()),
        "bein" => Ok(bein()),
        "match-football" => Ok(match_football()),
        other => Err(SpecError::UnknownProfile(other.to_string())),
    }
}

fn target(name: &str, display: Option<&str>, source: &[String], destination: String) -> TargetSpec {
    TargetSpec {
        name: name.to_string(),
        display: display.map(String::from),
        source_patterns: source.to_vec(),
        destination_pattern: destination,
    }
}

/// First matching candidate wins; no ranking.
fn first_match_scoring() -> ScoringSpec {
    ScoringSpec {
        regional_bonus: 0,
        quality_bonus: 0,
        language_bonus: 0,
        ..ScoringSpec::default()
    }
}

/// TNT Sports and Sky Sports UK feeds, preferring UK/HD/English variants.
pub fn premier_league() -> ProfileSpec {
    let tnt = |n: u8| {
        target(
            &format!("TNT {n}"),
            None,
            &[format!(r"\btnt\s*(sports)?\s*{n}\b")],
            format!(r"^#EXTINF[^,]*,\s*.*\btnt(\s*sports)?\s*{n}\b.*$"),
        )
    };
    let sky = |label: &str, words: &str| {
        target(
            label,
            None,
            &[
                format!(r"\bsky\s*sports\s*{words}\b"),
                format!(r"\(.*sky\s*sports\s*{words}\s*(uk)?\).*"),
            ],
            format!(r"^#EXTINF[^,]*,\s*.*\bsky\s*sports\s*{words}\b.*$"),
        )
    };

    ProfileSpec {
        name: "premier-league".to_string(),
        description: Some("TNT 1/2 and Sky Sports Main Event / Premier League UK".to_string()),
        targets: vec![
            tnt(1),
            tnt(2),
            sky("Sky Sports Main Event UK", r"main\s*event"),
            sky("Sky Sports Premier League UK", r"premier\s*league"),
        ],
        scoring: ScoringSpec {
            regional_markers: UK_MARKERS.iter().map(|s| s.to_string()).collect(),
            ..ScoringSpec::default()
        },
        render: RenderMode::Strict,
        on_missing: MissingPolicy::UpdateOnly,
        match_on: SourceScope::Line,
        defaults: DeliveryDefaults {
            source_url: DADDYLIVE_CHANNELS.to_string(),
            dest_url: "https://raw.githubusercontent.com/a7shk1/m3u-broadcast/refs/heads/main/premierleague.m3u".to_string(),
            repo: "a7shk1/m3u-broadcast".to_string(),
            branch: "main".to_string(),
            repo_path: "premierleague.m3u".to_string(),
            commit_message: "auto-update premierleague.m3u".to_string(),
            output_local_path: "./out/premierleague.m3u".to_string(),
        },
    }
}

/// DAZN ELEVEN Portugal 1-3, written into the destination's "DAZN n" entries.
pub fn dazn_pt() -> ProfileSpec {
    let dazn = |n: u8| {
        target(
            &format!("DAZN ELEVEN {n} PORTUGAL"),
            Some(format!("DAZN {n}").as_str()),
            &[
                format!(r"\bdazn\s*eleven\s*{n}\b.*\b(portugal|pt)\b"),
                format!(r"\beleven\s*sports?\s*{n}\b.*\b(portugal|pt)\b"),
                format!(r"\(.*(dazn\s*eleven|eleven\s*sports?)\s*{n}.*(portugal|pt).*?\)"),
            ],
            format!(r"^#EXTINF[^,]*,\s*DAZN\s*{n}\b.*$"),
        )
    };

    ProfileSpec {
        name: "dazn-pt".to_string(),
        description: Some("DAZN ELEVEN 1/2/3 Portugal into DAZN 1/2/3".to_string()),
        targets: vec![dazn(1), dazn(2), dazn(3)],
        scoring: ScoringSpec::default(),
        render: RenderMode::Strict,
        on_missing: MissingPolicy::UpdateOnly,
        match_on: SourceScope::Line,
        defaults: DeliveryDefaults {
            source_url: DADDYLIVE_EVENTS.to_string(),
            dest_url: "https://raw.githubusercontent.com/a7shk1/m3u-broadcast/refs/heads/main/dazn.m3u".to_string(),
            repo: "a7shk1/m3u-broadcast".to_string(),
            branch: "main".to_string(),
            repo_path: "dazn.m3u".to_string(),
            commit_message: "chore: update DAZN ELEVEN PT (1/2/3) URLs".to_string(),
            output_local_path: "./out/dazn.m3u".to_string(),
        },
    }
}

/// beIN SPORTS 6-9, first source match wins.
pub fn bein() -> ProfileSpec {
    let channel = |n: u8| {
        target(
            &format!("beIN SPORTS {n}"),
            None,
            &[format!(r"\bbein\s+sports\b.*\b{n}\b")],
            format!(r"^#EXTINF[^,]*,.*\bbein\s*sports\s*{n}\b.*$"),
        )
    };

    ProfileSpec {
        name: "bein".to_string(),
        description: Some("beIN SPORTS 6-9".to_string()),
        targets: (6..=9).map(channel).collect(),
        scoring: first_match_scoring(),
        render: RenderMode::Strict,
        on_missing: MissingPolicy::UpdateOnly,
        match_on: SourceScope::Line,
        defaults: DeliveryDefaults {
            source_url: DADDYLIVE_EVENTS.to_string(),
            dest_url: "https://raw.githubusercontent.com/amouradore/chaine-en-live/main/www/bein.m3u".to_string(),
            repo: "amouradore/chaine-en-live".to_string(),
            branch: "main".to_string(),
            repo_path: "www/bein.m3u".to_string(),
            commit_message: "chore: update bein.m3u (replace 6-9 URLs)".to_string(),
            output_local_path: "./out/bein.m3u".to_string(),
        },
    }
}

/// MATCH! FOOTBALL 1-3 RUSSIA, rewritten as clean entries and appended when missing.
pub fn match_football() -> ProfileSpec {
    let channel = |n: u8| {
        let name = format!("MATCH! FOOTBALL {n} RUSSIA");
        target(
            &name,
            None,
            &[
                format!(r"match!?\.?\s*football\s*{n}\s*russia"),
                format!(r"match!?\.?\s*futbol\s*{n}"),
            ],
            format!(r"^#EXTINF[^,]*,.*match!?\.?\s*(football\s*{n}\s*russia|futbol\s*{n}\b).*$"),
        )
    };

    ProfileSpec {
        name: "match-football".to_string(),
        description: Some("MATCH! FOOTBALL 1/2/3 RUSSIA as clean entries".to_string()),
        targets: (1..=3).map(channel).collect(),
        scoring: first_match_scoring(),
        render: RenderMode::Normalize,
        on_missing: MissingPolicy::Append,
        match_on: SourceScope::Display,
        defaults: DeliveryDefaults {
            source_url: DADDYLIVE_CHANNELS.to_string(),
            dest_url: "https://raw.githubusercontent.com/amouradore/chaine-en-live/main/www/generalsports.m3u".to_string(),
            repo: "amouradore/chaine-en-live".to_string(),
            branch: "main".to_string(),
            repo_path: "www/generalsports.m3u".to_string(),
            commit_message: "chore: update MATCH! FOOTBALL 1/2/3 from daddylive".to_string(),
            output_local_path: "./out/generalsports.m3u".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtins_pass_checks() {
        for spec in all() {
            spec.check().unwrap();
            assert!(NAMES.contains(&spec.name.as_str()));
        }
    }

    #[test]
    fn test_find_unknown() {
        assert!(matches!(find("nope"), Err(SpecError::UnknownProfile(_))));
        assert_eq!(find("bein").unwrap().targets.len(), 4);
    }

    #[test]
    fn test_dazn_display_names() {
        let spec = dazn_pt();
        assert_eq!(spec.targets[1].display(), "DAZN 2");
        assert_eq!(spec.targets[1].name, "DAZN ELEVEN 2 PORTUGAL");
    }
}
