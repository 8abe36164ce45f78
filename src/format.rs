//! Rendering of action frequencies into compact chart labels such as
//! `4bet[12%]/call[40%]/fold[48%]`.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::chart::{ActionFrequencyRecord, ActionKey};
use crate::error::QuizError;

/// Label shown for a pattern that carries no frequencies.
pub const NO_DATA_LABEL: &str = "No action data available";

/// Outcomes below this percentage are hidden in threshold groups.
pub const DISPLAY_THRESHOLD: f64 = 5.0;

/// Outcomes at or above this percentage are shown without a percentage.
pub const PURE_THRESHOLD: f64 = 99.0;

const DEFAULT_LABEL: &str = "Fold";

/// A decision point in the preflop tree, and the unit the user flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionGroup {
    /// Small blind first in: raise or fold.
    SbOpen,
    /// Small blind facing a 3bet.
    SbResponse,
    /// Big blind facing the open.
    BbAction,
    /// Big blind facing a 4bet.
    BbResponse,
}

impl ActionGroup {
    pub const ALL: [ActionGroup; 4] = [
        ActionGroup::SbOpen,
        ActionGroup::SbResponse,
        ActionGroup::BbAction,
        ActionGroup::BbResponse,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionGroup::SbOpen => "sb-open",
            ActionGroup::SbResponse => "sb-response",
            ActionGroup::BbAction => "bb-action",
            ActionGroup::BbResponse => "bb-response",
        }
    }

    /// Record keys whose frequencies feed this group.
    pub fn keys(self) -> &'static [ActionKey] {
        match self {
            ActionGroup::SbOpen => &[ActionKey::SbOpen],
            ActionGroup::SbResponse => &[ActionKey::SbFourBet, ActionKey::SbCallThreeBet],
            ActionGroup::BbAction => &[ActionKey::BbThreeBet, ActionKey::BbCall],
            ActionGroup::BbResponse => &[
                ActionKey::BbFiveBet,
                ActionKey::BbCallFourBet,
                ActionKey::BbFoldFourBet,
            ],
        }
    }

    pub fn definition(self) -> &'static GroupDefinition {
        match self {
            ActionGroup::SbOpen => &SB_OPEN,
            ActionGroup::SbResponse => &SB_RESPONSE,
            ActionGroup::BbAction => &BB_ACTION,
            ActionGroup::BbResponse => &BB_RESPONSE,
        }
    }
}

impl Display for ActionGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionGroup {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionGroup::ALL
            .into_iter()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| QuizError::InvalidSelection(s.to_string()))
    }
}

/// Where an outcome's percentage comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeSource {
    Key(ActionKey),
    /// `100 - sum` of the group's keyed outcomes.
    Remainder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub name: &'static str,
    pub source: OutcomeSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// One outcome against an implicit fold; shown whenever it is non-zero.
    Single,
    /// Every outcome at or above [`DISPLAY_THRESHOLD`], in declared order.
    Threshold,
    /// Only the largest outcome; exact ties show every tied outcome.
    Majority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDefinition {
    pub outcomes: &'static [Outcome],
    pub mode: RenderMode,
    pub default_label: &'static str,
}

const SB_OPEN: GroupDefinition = GroupDefinition {
    outcomes: &[Outcome {
        name: "Raise",
        source: OutcomeSource::Key(ActionKey::SbOpen),
    }],
    mode: RenderMode::Single,
    default_label: DEFAULT_LABEL,
};

const SB_RESPONSE: GroupDefinition = GroupDefinition {
    outcomes: &[
        Outcome {
            name: "4bet",
            source: OutcomeSource::Key(ActionKey::SbFourBet),
        },
        Outcome {
            name: "call",
            source: OutcomeSource::Key(ActionKey::SbCallThreeBet),
        },
        Outcome {
            name: "fold",
            source: OutcomeSource::Remainder,
        },
    ],
    mode: RenderMode::Threshold,
    default_label: DEFAULT_LABEL,
};

const BB_ACTION: GroupDefinition = GroupDefinition {
    outcomes: &[
        Outcome {
            name: "3bet",
            source: OutcomeSource::Key(ActionKey::BbThreeBet),
        },
        Outcome {
            name: "call",
            source: OutcomeSource::Key(ActionKey::BbCall),
        },
        Outcome {
            name: "fold",
            source: OutcomeSource::Remainder,
        },
    ],
    mode: RenderMode::Majority,
    default_label: DEFAULT_LABEL,
};

const BB_RESPONSE: GroupDefinition = GroupDefinition {
    outcomes: &[
        Outcome {
            name: "5bet",
            source: OutcomeSource::Key(ActionKey::BbFiveBet),
        },
        Outcome {
            name: "call",
            source: OutcomeSource::Key(ActionKey::BbCallFourBet),
        },
        Outcome {
            name: "fold",
            source: OutcomeSource::Key(ActionKey::BbFoldFourBet),
        },
    ],
    mode: RenderMode::Threshold,
    default_label: DEFAULT_LABEL,
};

/// Renders one decision point of `record` according to `definition`.
///
/// An empty record has nothing to render and yields [`NO_DATA_LABEL`].
pub fn format_action_group(record: &ActionFrequencyRecord, definition: &GroupDefinition) -> String {
    if record.is_empty() {
        return NO_DATA_LABEL.to_string();
    }
    let values = outcome_values(record, definition);

    match definition.mode {
        RenderMode::Single => match values.first() {
            Some((outcome, value)) if *value > 0.0 => outcome_label(outcome.name, *value),
            _ => definition.default_label.to_string(),
        },
        RenderMode::Threshold => {
            let shown: Vec<String> = values
                .iter()
                .filter(|(_, value)| *value >= DISPLAY_THRESHOLD)
                .map(|(outcome, value)| outcome_label(outcome.name, *value))
                .collect();
            if shown.is_empty() {
                definition.default_label.to_string()
            } else {
                shown.join("/")
            }
        }
        RenderMode::Majority => {
            let max = values
                .iter()
                .map(|(_, value)| *value)
                .fold(f64::NEG_INFINITY, f64::max);
            let leaders: Vec<&(Outcome, f64)> =
                values.iter().filter(|(_, value)| *value == max).collect();
            match leaders.as_slice() {
                [] => definition.default_label.to_string(),
                [(outcome, value)] => outcome_label(outcome.name, *value),
                tied => tied
                    .iter()
                    .map(|(outcome, value)| annotated(outcome.name, *value))
                    .join("/"),
            }
        }
    }
}

fn outcome_values(record: &ActionFrequencyRecord, definition: &GroupDefinition) -> Vec<(Outcome, f64)> {
    let keyed_total: f64 = definition
        .outcomes
        .iter()
        .filter_map(|outcome| match outcome.source {
            OutcomeSource::Key(key) => Some(record.value(key)),
            OutcomeSource::Remainder => None,
        })
        .sum();

    definition
        .outcomes
        .iter()
        .map(|outcome| {
            let value = match outcome.source {
                OutcomeSource::Key(key) => record.value(key),
                OutcomeSource::Remainder => 100.0 - keyed_total,
            };
            (*outcome, value)
        })
        .collect()
}

fn outcome_label(name: &str, value: f64) -> String {
    if value >= PURE_THRESHOLD {
        name.to_string()
    } else {
        annotated(name, value)
    }
}

fn annotated(name: &str, value: f64) -> String {
    format!("{name}[{}%]", round_half_up(value))
}

/// Rounds to the nearest integer, halves towards positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// All four labels of one suitedness pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternDisplay {
    NoData,
    Actions {
        sb_open: String,
        sb_response: String,
        bb_action: String,
        bb_response: String,
    },
}

impl PatternDisplay {
    pub fn label(&self, group: ActionGroup) -> &str {
        match self {
            PatternDisplay::NoData => NO_DATA_LABEL,
            PatternDisplay::Actions {
                sb_open,
                sb_response,
                bb_action,
                bb_response,
            } => match group {
                ActionGroup::SbOpen => sb_open,
                ActionGroup::SbResponse => sb_response,
                ActionGroup::BbAction => bb_action,
                ActionGroup::BbResponse => bb_response,
            },
        }
    }
}

impl Display for PatternDisplay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternDisplay::NoData => f.write_str(NO_DATA_LABEL),
            PatternDisplay::Actions {
                sb_open,
                sb_response,
                bb_action,
                bb_response,
            } => write!(f, "SB: {sb_open} | {sb_response}\nBB: {bb_action} | {bb_response}"),
        }
    }
}

/// Renders every group of a pattern. Missing or empty records yield [`PatternDisplay::NoData`].
pub fn format_pattern(record: Option<&ActionFrequencyRecord>) -> PatternDisplay {
    match record {
        Some(record) if !record.is_empty() => PatternDisplay::Actions {
            sb_open: format_action_group(record, ActionGroup::SbOpen.definition()),
            sb_response: format_action_group(record, ActionGroup::SbResponse.definition()),
            bb_action: format_action_group(record, ActionGroup::BbAction.definition()),
            bb_response: format_action_group(record, ActionGroup::BbResponse.definition()),
        },
        _ => PatternDisplay::NoData,
    }
}
