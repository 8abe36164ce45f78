pub mod chart;
pub mod error;
pub mod format;
pub mod grade;
pub mod perturb;
pub mod quiz;
pub mod random;
pub mod session;
pub mod trainer;
pub mod web;

pub use chart::{ActionFrequencyRecord, ActionKey, Chart, HandEntry, PatternId, SuitednessPattern};
pub use error::QuizError;
pub use format::{ActionGroup, PatternDisplay, format_action_group, format_pattern};
pub use grade::{GradeResult, ScoreState, Selection, Taxonomy, UserSelectionSet, grade};
pub use perturb::perturb;
pub use quiz::QuizItem;
pub use random::RandomSource;
pub use session::{QuizSession, SessionConfig};
pub use trainer::{Trainer, TrainerConfig};
