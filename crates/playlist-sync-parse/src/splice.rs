// Destination splicing.
//
// Walks the destination document and rewrites only the payload line (and,
// in normalize mode, the metadata line) of records claimed by a selected
// target. Everything else is emitted exactly as it was read.

use std::collections::HashSet;

use playlist_sync_model::document::{clean_metadata, render_lines, Document, Entry};
use playlist_sync_model::profile::{MissingPolicy, RenderMode};
use playlist_sync_model::report::{SpliceAction, SpliceActionKind, SpliceOutcome};
use playlist_sync_model::selection::Selection;

use crate::matcher::Profile;

/// Splice a selection into a destination document.
///
/// The header is enforced at line 0. Each destination record is claimed by
/// at most one target (the first declared one whose destination pattern
/// matches). Targets absent from the selection leave their records alone.
/// With `MissingPolicy::Append`, selected targets with no destination record
/// are appended at the end under a separator comment.
pub fn splice(destination: &Document, selection: &Selection, profile: &Profile) -> SpliceOutcome {
    let mut doc = destination.clone();
    if doc.ensure_header() {
        tracing::debug!("Destination header was not on line 1; fixed");
    }

    let mut out: Vec<String> = Vec::with_capacity(doc.entries.len() * 2 + 4);
    let mut actions: Vec<SpliceAction> = Vec::new();
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut updates = 0usize;

    for entry in &doc.entries {
        let record = match entry {
            Entry::PassThrough(line) => {
                out.push(line.clone());
                continue;
            }
            Entry::Record(record) => record,
        };

        let pick = profile
            .destination_target(&record.metadata)
            .and_then(|t| selection.get(&t.name).map(|p| (t, p)));

        let Some((target, pick)) = pick else {
            out.push(record.metadata.clone());
            if let Some(payload) = &record.payload {
                out.push(payload.clone());
            }
            continue;
        };

        claimed.insert(target.name.as_str());

        let metadata = match profile.render {
            RenderMode::Strict => record.metadata.clone(),
            RenderMode::Normalize => clean_metadata(&target.display),
        };
        let metadata_changed = metadata != record.metadata;
        out.push(metadata);
        out.push(pick.payload.clone());

        let kind = match record.payload.as_deref() {
            None => SpliceActionKind::Inserted,
            Some(old) if old != pick.payload || metadata_changed => SpliceActionKind::Replaced,
            Some(_) => SpliceActionKind::Unchanged,
        };
        match kind {
            SpliceActionKind::Inserted => {
                tracing::info!(target = %target.name, "Inserted payload");
            }
            SpliceActionKind::Replaced => {
                tracing::info!(
                    target = %target.name,
                    old = record.payload.as_deref().unwrap_or_default(),
                    new = %pick.payload,
                    "Updated payload"
                );
            }
            _ => tracing::info!(target = %target.name, "Payload already up to date"),
        }
        if kind != SpliceActionKind::Unchanged {
            updates += 1;
        }
        actions.push(SpliceAction {
            target: target.name.clone(),
            kind,
            old_payload: record.payload.clone(),
            new_payload: pick.payload.clone(),
        });
    }

    if profile.on_missing == MissingPolicy::Append {
        for target in &profile.targets {
            if claimed.contains(target.name.as_str()) {
                continue;
            }
            let Some(pick) = selection.get(&target.name) else {
                continue;
            };
            if out.last().is_some_and(|l| !l.trim().is_empty()) {
                out.push(String::new());
            }
            out.push(format!("# --- {} ---", target.display));
            out.push(clean_metadata(&target.display));
            out.push(pick.payload.clone());
            updates += 1;
            tracing::info!(target = %target.name, "Appended new record");
            actions.push(SpliceAction {
                target: target.name.clone(),
                kind: SpliceActionKind::Appended,
                old_payload: None,
                new_payload: pick.payload.clone(),
            });
        }
    }

    SpliceOutcome {
        text: render_lines(out.iter().map(String::as_str)),
        updates,
        actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playlist_sync_model::selection::Pick;

    fn pick(target: &str, payload: &str) -> Pick {
        Pick {
            target: target.to_string(),
            payload: payload.to_string(),
            metadata: String::new(),
            score: 0,
        }
    }

    fn run(dest: &str, selection: &Selection, profile: &Profile) -> SpliceOutcome {
        splice(&Document::parse(dest), selection, profile)
    }

    const PL_DEST: &str = "#EXTM3U\n\
        #EXTINF:-1 group-title=\"UK\",TNT Sports 1\n\
        http://old\n\
        # keep me\n\
        #EXTINF:-1,Unrelated\n\
        http://unrelated\n\
        \n\
        #EXTINF:-1,Sky Sports Main Event\n\
        http://sky-old\n";

    #[test]
    fn test_replaces_payload_only() {
        let profile = Profile::builtin("premier-league").unwrap();
        let selection: Selection = [pick("TNT 1", "http://new")].into_iter().collect();
        let outcome = run(PL_DEST, &selection, &profile);

        assert_eq!(outcome.updates, 1);
        assert_eq!(outcome.text, PL_DEST.replace("http://old", "http://new"));
        assert_eq!(outcome.count(SpliceActionKind::Replaced), 1);
    }

    #[test]
    fn test_equal_payload_is_not_an_update() {
        let profile = Profile::builtin("premier-league").unwrap();
        let selection: Selection = [pick("TNT 1", "http://old")].into_iter().collect();
        let outcome = run(PL_DEST, &selection, &profile);

        assert_eq!(outcome.updates, 0);
        assert_eq!(outcome.text, PL_DEST);
        assert_eq!(outcome.actions[0].kind, SpliceActionKind::Unchanged);
    }

    #[test]
    fn test_inserts_missing_payload() {
        let profile = Profile::builtin("premier-league").unwrap();
        let dest = "#EXTM3U\n#EXTINF:-1,TNT 2\n# comment\n";
        let selection: Selection = [pick("TNT 2", "http://tnt2")].into_iter().collect();
        let outcome = run(dest, &selection, &profile);

        assert_eq!(outcome.updates, 1);
        assert_eq!(outcome.text, "#EXTM3U\n#EXTINF:-1,TNT 2\nhttp://tnt2\n# comment\n");
        assert_eq!(outcome.actions[0].kind, SpliceActionKind::Inserted);
    }

    #[test]
    fn test_empty_selection_leaves_document() {
        let profile = Profile::builtin("premier-league").unwrap();
        let outcome = run(PL_DEST, &Selection::new(), &profile);
        assert_eq!(outcome.updates, 0);
        assert_eq!(outcome.text, PL_DEST);
        assert!(outcome.actions.is_empty());
    }

    #[test]
    fn test_unselected_targets_untouched() {
        let profile = Profile::builtin("premier-league").unwrap();
        let selection: Selection = [pick("Sky Sports Main Event UK", "http://sky-new")]
            .into_iter()
            .collect();
        let outcome = run(PL_DEST, &selection, &profile);
        assert!(outcome.text.contains("http://old\n"));
        assert!(outcome.text.contains("http://sky-new\n"));
        assert!(!outcome.text.contains("http://sky-old"));
    }

    #[test]
    fn test_header_is_enforced() {
        let profile = Profile::builtin("premier-league").unwrap();
        let outcome = run("#EXTINF:-1,TNT 1\nhttp://old", &Selection::new(), &profile);
        assert_eq!(outcome.text, "#EXTM3U\n#EXTINF:-1,TNT 1\nhttp://old\n");

        let outcome = run("", &Selection::new(), &profile);
        assert_eq!(outcome.text, "#EXTM3U\n");
    }

    #[test]
    fn test_header_appears_once_at_top() {
        let profile = Profile::builtin("premier-league").unwrap();
        let selection: Selection = [pick("TNT 1", "http://new")].into_iter().collect();

        let outcome = run("\n#EXTM3U\n#EXTINF:-1,TNT 1\nhttp://old\n", &selection, &profile);
        assert_eq!(outcome.text, "#EXTM3U\n\n#EXTINF:-1,TNT 1\nhttp://new\n");

        let outcome = run("\u{feff}#EXTM3U\n#EXTINF:-1,TNT 1\nhttp://old\n", &selection, &profile);
        assert_eq!(outcome.text, "#EXTM3U\n#EXTINF:-1,TNT 1\nhttp://new\n");
        assert_eq!(outcome.text.matches("#EXTM3U").count(), 1);
    }

    #[test]
    fn test_idempotent() {
        let profile = Profile::builtin("premier-league").unwrap();
        let selection: Selection = [
            pick("TNT 1", "http://new"),
            pick("Sky Sports Main Event UK", "http://sky-new"),
        ]
        .into_iter()
        .collect();
        let first = run(PL_DEST, &selection, &profile);
        let second = run(&first.text, &selection, &profile);
        assert_eq!(first.updates, 2);
        assert_eq!(second.updates, 0);
        assert_eq!(second.text, first.text);
    }

    #[test]
    fn test_strict_mode_never_creates_records() {
        let profile = Profile::builtin("premier-league").unwrap();
        let selection: Selection = [pick("TNT 2", "http://tnt2")].into_iter().collect();
        let outcome = run(PL_DEST, &selection, &profile);
        assert_eq!(outcome.updates, 0);
        assert_eq!(outcome.text, PL_DEST);
    }

    #[test]
    fn test_append_mode_adds_missing_records() {
        let profile = Profile::builtin("match-football").unwrap();
        let dest = "#EXTM3U\n#EXTINF:-1,Other\nhttp://other\n";
        let selection: Selection = [pick("MATCH! FOOTBALL 2 RUSSIA", "http://m2")]
            .into_iter()
            .collect();
        let outcome = run(dest, &selection, &profile);

        assert_eq!(
            outcome.text,
            "#EXTM3U\n#EXTINF:-1,Other\nhttp://other\n\n\
             # --- MATCH! FOOTBALL 2 RUSSIA ---\n\
             #EXTINF:-1,MATCH! FOOTBALL 2 RUSSIA\n\
             http://m2\n"
        );
        assert_eq!(outcome.updates, 1);
        assert_eq!(outcome.actions[0].kind, SpliceActionKind::Appended);

        let again = run(&outcome.text, &selection, &profile);
        assert_eq!(again.updates, 0);
        assert_eq!(again.text, outcome.text);
    }

    #[test]
    fn test_normalize_mode_rewrites_metadata() {
        let profile = Profile::builtin("match-football").unwrap();
        let dest = "#EXTM3U\n#EXTINF:-1 tvg-logo=\"x\",Match! Football 1 Russia HD\nhttp://m1\n";
        let selection: Selection = [pick("MATCH! FOOTBALL 1 RUSSIA", "http://m1")]
            .into_iter()
            .collect();
        let outcome = run(dest, &selection, &profile);

        assert_eq!(outcome.text, "#EXTM3U\n#EXTINF:-1,MATCH! FOOTBALL 1 RUSSIA\nhttp://m1\n");
        assert_eq!(outcome.updates, 1);
        assert!(outcome.actions.iter().all(|a| a.kind != SpliceActionKind::Appended));
    }

    #[test]
    fn test_dazn_targets_only_touch_numbered_entries() {
        let profile = Profile::builtin("dazn-pt").unwrap();
        let dest = "#EXTM3U\n\
            #EXTINF:-1,DAZN 1\nhttp://d1\n\
            #EXTINF:-1,DAZN 4\nhttp://d4\n";
        let selection: Selection = [
            pick("DAZN ELEVEN 1 PORTUGAL", "http://new1"),
            pick("DAZN ELEVEN 3 PORTUGAL", "http://new3"),
        ]
        .into_iter()
        .collect();
        let outcome = run(dest, &selection, &profile);
        assert_eq!(
            outcome.text,
            "#EXTM3U\n#EXTINF:-1,DAZN 1\nhttp://new1\n#EXTINF:-1,DAZN 4\nhttp://d4\n"
        );
        assert_eq!(outcome.updates, 1);
    }
}
