use serde::{Deserialize, Serialize};

/// The payload chosen for one target, with the source line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub target: String,
    pub payload: String,
    /// Source metadata line of the winning candidate.
    pub metadata: String,
    pub score: i32,
}

/// Best payload per target for the current run, in target declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    picks: Vec<Pick>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pick, replacing any earlier pick for the same target.
    pub fn insert(&mut self, pick: Pick) {
        match self.picks.iter_mut().find(|p| p.target == pick.target) {
            Some(existing) => *existing = pick,
            None => self.picks.push(pick),
        }
    }

    pub fn get(&self, target: &str) -> Option<&Pick> {
        self.picks.iter().find(|p| p.target == target)
    }

    pub fn payload(&self, target: &str) -> Option<&str> {
        self.get(target).map(|p| p.payload.as_str())
    }

    pub fn contains(&self, target: &str) -> bool {
        self.get(target).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pick> {
        self.picks.iter()
    }
}

impl FromIterator<Pick> for Selection {
    fn from_iter<I: IntoIterator<Item = Pick>>(iter: I) -> Self {
        let mut selection = Selection::new();
        for pick in iter {
            selection.insert(pick);
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(target: &str, payload: &str) -> Pick {
        Pick {
            target: target.to_string(),
            payload: payload.to_string(),
            metadata: format!("#EXTINF:-1,{target}"),
            score: 0,
        }
    }

    #[test]
    fn test_insert_replaces_same_target() {
        let mut selection = Selection::new();
        selection.insert(pick("TNT 1", "http://a"));
        selection.insert(pick("TNT 2", "http://b"));
        selection.insert(pick("TNT 1", "http://c"));
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.payload("TNT 1"), Some("http://c"));
        let order: Vec<_> = selection.iter().map(|p| p.target.as_str()).collect();
        assert_eq!(order, vec!["TNT 1", "TNT 2"]);
    }

    #[test]
    fn test_empty() {
        let selection: Selection = std::iter::empty().collect();
        assert!(selection.is_empty());
        assert!(!selection.contains("TNT 1"));
    }
}
