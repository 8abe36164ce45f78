use std::path::PathBuf;

use thiserror::Error;

use crate::chart::{ActionKey, PatternId};
use crate::grade::Selection;

/// Errors raised by the quiz engine and its session lifecycle.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("failed to read chart {path}: {source}")]
    ChartIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed chart data: {0}")]
    ChartJson(#[from] serde_json::Error),

    #[error("unknown action key `{0}`")]
    UnknownActionKey(String),

    #[error("frequency for {key} must be within 0..=100, got {value}")]
    InvalidFrequency { key: ActionKey, value: f64 },

    #[error("chart contains no hand with a suitedness pattern")]
    EmptyChart,

    #[error("hand {hand} has no suitedness patterns")]
    NoPatternsAvailable { hand: String },

    #[error("invalid selection `{0}`")]
    InvalidSelection(String),

    #[error("pattern {pattern} is not part of the current hand")]
    UnknownPattern { pattern: PatternId },

    #[error("selection {0} cannot change after answers were checked")]
    SelectionLocked(Selection),

    #[error("answers for this hand were already checked")]
    AlreadyChecked,

    #[error("answers for this hand have not been checked yet")]
    NotChecked,

    #[error("session is complete")]
    SessionComplete,
}
