use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::chart::{ActionFrequencyRecord, ActionKey, PatternId};
use crate::error::QuizError;
use crate::format::ActionGroup;

/// One flaggable cell: an action group of a given suitedness pattern.
///
/// Written as `<pattern code>-<group>`, e.g. `4-sb-response`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr,
)]
pub struct Selection {
    pub pattern: PatternId,
    pub group: ActionGroup,
}

impl Selection {
    pub fn new(pattern: PatternId, group: ActionGroup) -> Self {
        Self { pattern, group }
    }
}

impl Display for Selection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.pattern, self.group)
    }
}

impl FromStr for Selection {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || QuizError::InvalidSelection(s.to_string());
        let (pattern, group) = s.trim().split_once('-').ok_or_else(invalid)?;
        let pattern = pattern.parse::<PatternId>().map_err(|_| invalid())?;
        let group = group.parse::<ActionGroup>().map_err(|_| invalid())?;
        Ok(Self { pattern, group })
    }
}

/// Groups the user currently believes were altered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserSelectionSet(BTreeSet<Selection>);

impl UserSelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips a selection, returning whether it is now selected.
    pub fn toggle(&mut self, selection: Selection) -> bool {
        if self.0.remove(&selection) {
            false
        } else {
            self.0.insert(selection);
            true
        }
    }

    pub fn contains(&self, selection: &Selection) -> bool {
        self.0.contains(selection)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selection> + '_ {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<Selection> for UserSelectionSet {
    fn from_iter<T: IntoIterator<Item = Selection>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Mapping from each gradable action group to the record keys behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    groups: Vec<(ActionGroup, Vec<ActionKey>)>,
}

impl Taxonomy {
    pub fn new(groups: impl IntoIterator<Item = (ActionGroup, Vec<ActionKey>)>) -> Self {
        Self {
            groups: groups.into_iter().collect(),
        }
    }

    /// All four decision points with the keys they render.
    pub fn standard() -> Self {
        Self::new(
            ActionGroup::ALL
                .into_iter()
                .map(|group| (group, group.keys().to_vec())),
        )
    }

    pub fn groups(&self) -> impl Iterator<Item = (ActionGroup, &[ActionKey])> + '_ {
        self.groups
            .iter()
            .map(|(group, keys)| (*group, keys.as_slice()))
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDelta {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
}

/// Running score of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
}

impl ScoreState {
    pub fn apply(&mut self, delta: ScoreDelta) {
        self.correct += delta.correct;
        self.incorrect += delta.incorrect;
        self.total += delta.total;
    }

    pub fn accuracy(&self) -> Option<f64> {
        (self.total > 0).then(|| f64::from(self.correct) / f64::from(self.total))
    }
}

impl Display for ScoreState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.correct, self.total)
    }
}

/// Classification of the user's flags for one or more patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeResult {
    /// Altered and flagged.
    pub correct: BTreeSet<Selection>,
    /// Flagged but untouched.
    pub incorrect: BTreeSet<Selection>,
    /// Altered but not flagged.
    pub missed: BTreeSet<Selection>,
}

impl GradeResult {
    pub fn delta(&self) -> ScoreDelta {
        let correct = self.correct.len() as u32;
        let wrong = (self.incorrect.len() + self.missed.len()) as u32;
        ScoreDelta {
            correct,
            incorrect: wrong,
            total: correct + wrong,
        }
    }

    pub fn merge(&mut self, other: GradeResult) {
        self.correct.extend(other.correct);
        self.incorrect.extend(other.incorrect);
        self.missed.extend(other.missed);
    }

    pub fn is_perfect(&self) -> bool {
        self.incorrect.is_empty() && self.missed.is_empty()
    }
}

/// Whether any key of `keys` present in both records differs between them.
pub fn was_altered(canonical: &ActionFrequencyRecord, perturbed: &ActionFrequencyRecord, keys: &[ActionKey]) -> bool {
    keys.iter().any(|key| match (canonical.get(*key), perturbed.get(*key)) {
        (Some(truth), Some(shown)) => truth != shown,
        _ => false,
    })
}

/// Grades one pattern's records against the user's flags.
pub fn grade(
    pattern: PatternId,
    canonical: &ActionFrequencyRecord,
    perturbed: &ActionFrequencyRecord,
    taxonomy: &Taxonomy,
    flags: &UserSelectionSet,
) -> GradeResult {
    let mut result = GradeResult::default();
    for (group, keys) in taxonomy.groups() {
        let selection = Selection::new(pattern, group);
        let flagged = flags.contains(&selection);
        match (was_altered(canonical, perturbed, keys), flagged) {
            (true, true) => {
                result.correct.insert(selection);
            }
            (true, false) => {
                result.missed.insert(selection);
            }
            (false, true) => {
                result.incorrect.insert(selection);
            }
            (false, false) => {}
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_text_form() {
        let selection = Selection::new(PatternId::Double, ActionGroup::SbResponse);
        assert_eq!(selection.to_string(), "4-sb-response");
        assert_eq!("4-sb-response".parse::<Selection>().unwrap(), selection);
        assert!("9-sb-open".parse::<Selection>().is_err());
        assert!("4-sb-limp".parse::<Selection>().is_err());
        assert!("sb-open".parse::<Selection>().is_err());
    }

    #[test]
    fn toggle_flips_membership() {
        let mut flags = UserSelectionSet::new();
        let selection = Selection::new(PatternId::Mono, ActionGroup::BbAction);
        assert!(flags.toggle(selection));
        assert!(flags.contains(&selection));
        assert!(!flags.toggle(selection));
        assert!(flags.is_empty());
    }

    #[test]
    fn keys_missing_from_either_record_do_not_count() {
        let canonical = ActionFrequencyRecord::from_pairs([(ActionKey::BbCall, 40.0)]).unwrap();
        let perturbed = ActionFrequencyRecord::new();
        assert!(!was_altered(&canonical, &perturbed, &[ActionKey::BbCall]));
    }
}
