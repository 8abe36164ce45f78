use serde::{Deserialize, Serialize};

use crate::chart::{ActionFrequencyRecord, HandEntry, PatternId};
use crate::error::QuizError;
use crate::format::{PatternDisplay, format_pattern};
use crate::grade::{GradeResult, Taxonomy, UserSelectionSet, grade};
use crate::perturb::perturb;
use crate::random::RandomSource;

/// True and displayed frequencies of one suitedness pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizPattern {
    pub id: PatternId,
    pub canonical: Option<ActionFrequencyRecord>,
    pub perturbed: Option<ActionFrequencyRecord>,
}

/// One round of the quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizItem {
    pub hand: String,
    pub patterns: Vec<QuizPattern>,
}

/// Labels of one pattern as shown during the round and as revealed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternLabels {
    pub pattern: PatternId,
    pub name: String,
    pub displayed: PatternDisplay,
    pub canonical: PatternDisplay,
}

impl QuizItem {
    /// Perturbs every pattern of `hand`.
    pub fn build<S: RandomSource + ?Sized>(hand: &HandEntry, rng: &mut S) -> Result<Self, QuizError> {
        if !hand.has_patterns() {
            return Err(QuizError::NoPatternsAvailable {
                hand: hand.label.clone(),
            });
        }

        let patterns = hand
            .patterns
            .iter()
            .map(|pattern| QuizPattern {
                id: pattern.id,
                canonical: pattern.actions.clone(),
                perturbed: pattern.actions.as_ref().map(|actions| perturb(actions, rng)),
            })
            .collect();

        Ok(Self {
            hand: hand.label.clone(),
            patterns,
        })
    }

    pub fn pattern(&self, id: PatternId) -> Option<&QuizPattern> {
        self.patterns.iter().find(|pattern| pattern.id == id)
    }

    pub fn contains_pattern(&self, id: PatternId) -> bool {
        self.pattern(id).is_some()
    }

    pub fn display(&self) -> Vec<PatternLabels> {
        self.patterns
            .iter()
            .map(|pattern| PatternLabels {
                pattern: pattern.id,
                name: pattern.id.name().to_string(),
                displayed: format_pattern(pattern.perturbed.as_ref()),
                canonical: format_pattern(pattern.canonical.as_ref()),
            })
            .collect()
    }

    /// Grades every pattern and aggregates the classifications.
    pub fn grade(&self, flags: &UserSelectionSet, taxonomy: &Taxonomy) -> GradeResult {
        let mut result = GradeResult::default();
        for pattern in &self.patterns {
            if let (Some(canonical), Some(perturbed)) = (&pattern.canonical, &pattern.perturbed) {
                result.merge(grade(pattern.id, canonical, perturbed, taxonomy, flags));
            }
        }
        result
    }

    /// The flags a perfect answer would contain.
    pub fn answer_key(&self, taxonomy: &Taxonomy) -> UserSelectionSet {
        self.grade(&UserSelectionSet::new(), taxonomy)
            .missed
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ActionKey, SuitednessPattern};
    use crate::format::ActionGroup;
    use crate::grade::{ScoreDelta, Selection};
    use crate::perturb::tests::ScriptedSource;

    #[test]
    fn perturbed_open_is_caught_when_flagged() {
        let canonical = ActionFrequencyRecord::from_pairs([
            (ActionKey::SbOpen, 40.0),
            (ActionKey::SbFourBet, 10.0),
            (ActionKey::SbCallThreeBet, 20.0),
        ])
        .unwrap();
        let hand = HandEntry::new(
            "AKo",
            vec![SuitednessPattern {
                id: PatternId::Double,
                actions: Some(canonical),
            }],
        );
        // One key, the first one (SB open), moved by +25.
        let mut rng = ScriptedSource::new([1, 0, 25]);
        let item = QuizItem::build(&hand, &mut rng).unwrap();
        let shown = item.patterns[0].perturbed.as_ref().unwrap();
        assert_eq!(shown.get(ActionKey::SbOpen), Some(65.0));
        assert_eq!(shown.get(ActionKey::SbFourBet), Some(10.0));

        let selection = Selection::new(PatternId::Double, ActionGroup::SbOpen);
        let flags: UserSelectionSet = [selection].into_iter().collect();
        let taxonomy = Taxonomy::new([(ActionGroup::SbOpen, vec![ActionKey::SbOpen])]);
        let result = item.grade(&flags, &taxonomy);

        assert!(result.correct.contains(&selection));
        assert!(result.missed.is_empty());
        assert!(result.incorrect.is_empty());
        assert_eq!(
            result.delta(),
            ScoreDelta {
                correct: 1,
                incorrect: 0,
                total: 1
            }
        );
    }

    #[test]
    fn hand_without_patterns_cannot_be_quizzed() {
        let hand = HandEntry::new("32o", Vec::new());
        let mut rng = ScriptedSource::new(Vec::new());
        assert!(matches!(
            QuizItem::build(&hand, &mut rng),
            Err(QuizError::NoPatternsAvailable { .. })
        ));
    }

    #[test]
    fn display_keeps_pattern_order_and_missing_data() {
        let hand = HandEntry::new(
            "72o",
            vec![
                SuitednessPattern {
                    id: PatternId::Rainbow,
                    actions: Some(ActionFrequencyRecord::from_pairs([(ActionKey::SbOpen, 3.2)]).unwrap()),
                },
                SuitednessPattern {
                    id: PatternId::SingleLow,
                    actions: None,
                },
            ],
        );
        let mut rng = ScriptedSource::new([1, 0, 40]);
        let labels = QuizItem::build(&hand, &mut rng).unwrap().display();

        assert_eq!(labels[0].pattern, PatternId::SingleLow);
        assert_eq!(labels[0].displayed, PatternDisplay::NoData);
        assert_eq!(labels[1].name, "Rainbow");
        assert_eq!(labels[1].canonical.label(ActionGroup::SbOpen), "Raise[3%]");
        assert_eq!(labels[1].displayed.label(ActionGroup::SbOpen), "Raise[40%]");
    }
}
