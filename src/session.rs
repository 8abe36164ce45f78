use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chart::{Chart, PatternId};
use crate::error::QuizError;
use crate::format::PatternDisplay;
use crate::grade::{GradeResult, ScoreState, Selection, Taxonomy, UserSelectionSet};
use crate::quiz::QuizItem;

/// Configuration for a quiz session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub rounds: u32,
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rounds: 5,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    AwaitingAnswers,
    Reviewing,
    Completed,
}

/// One pattern as the player sees it. The true labels stay hidden until the
/// round is checked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatternView {
    pub pattern: PatternId,
    pub name: String,
    pub displayed: PatternDisplay,
    pub canonical: Option<PatternDisplay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: Uuid,
    pub round: u32,
    pub rounds: u32,
    pub hand: String,
    pub patterns: Vec<PatternView>,
    pub selections: UserSelectionSet,
    pub status: SessionStatus,
    pub score: ScoreState,
    pub last_result: Option<GradeResult>,
}

#[derive(Debug)]
enum Phase {
    Answering,
    Reviewed(GradeResult),
}

pub struct QuizSession {
    id: Uuid,
    rng: StdRng,
    config: SessionConfig,
    chart: Arc<Chart>,
    taxonomy: Taxonomy,
    item: QuizItem,
    selections: UserSelectionSet,
    score: ScoreState,
    round: u32,
    phase: Phase,
}

impl QuizSession {
    /// Starts a session and deals its first hand.
    pub fn new(chart: Arc<Chart>, mut config: SessionConfig) -> Result<Self, QuizError> {
        config.rounds = config.rounds.max(1);
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let item = deal(&chart, &mut rng)?;
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, seed, rounds = config.rounds, hand = %item.hand, "session started");

        Ok(Self {
            id,
            rng,
            config,
            chart,
            taxonomy: Taxonomy::standard(),
            item,
            selections: UserSelectionSet::new(),
            score: ScoreState::default(),
            round: 1,
            phase: Phase::Answering,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn item(&self) -> &QuizItem {
        &self.item
    }

    pub fn score(&self) -> ScoreState {
        self.score
    }

    pub fn selections(&self) -> &UserSelectionSet {
        &self.selections
    }

    pub fn status(&self) -> SessionStatus {
        match self.phase {
            Phase::Answering => SessionStatus::AwaitingAnswers,
            Phase::Reviewed(_) if self.round >= self.config.rounds => SessionStatus::Completed,
            Phase::Reviewed(_) => SessionStatus::Reviewing,
        }
    }

    /// Flags or unflags a group, returning whether it is now flagged.
    pub fn toggle(&mut self, selection: Selection) -> Result<bool, QuizError> {
        if matches!(self.phase, Phase::Reviewed(_)) {
            return Err(QuizError::SelectionLocked(selection));
        }
        if !self.item.contains_pattern(selection.pattern) {
            return Err(QuizError::UnknownPattern {
                pattern: selection.pattern,
            });
        }
        Ok(self.selections.toggle(selection))
    }

    /// Grades the current flags and adds the result to the running score.
    pub fn check(&mut self) -> Result<GradeResult, QuizError> {
        if matches!(self.phase, Phase::Reviewed(_)) {
            return Err(QuizError::AlreadyChecked);
        }

        let result = self.item.grade(&self.selections, &self.taxonomy);
        let delta = result.delta();
        self.score.apply(delta);
        tracing::info!(
            session = %self.id,
            round = self.round,
            hand = %self.item.hand,
            correct = delta.correct,
            incorrect = delta.incorrect,
            total = delta.total,
            "round checked"
        );
        self.phase = Phase::Reviewed(result.clone());
        Ok(result)
    }

    /// Clears the flags and deals the next hand.
    pub fn next_round(&mut self) -> Result<(), QuizError> {
        match self.status() {
            SessionStatus::AwaitingAnswers => return Err(QuizError::NotChecked),
            SessionStatus::Completed => return Err(QuizError::SessionComplete),
            SessionStatus::Reviewing => {}
        }

        self.item = deal(&self.chart, &mut self.rng)?;
        self.selections.clear();
        self.round += 1;
        self.phase = Phase::Answering;
        tracing::debug!(session = %self.id, round = self.round, hand = %self.item.hand, "dealt hand");
        Ok(())
    }

    /// The flags a perfect answer to the current hand would contain.
    pub fn answer_key(&self) -> UserSelectionSet {
        self.item.answer_key(&self.taxonomy)
    }

    pub fn snapshot(&self) -> SessionState {
        let revealed = matches!(self.phase, Phase::Reviewed(_));
        let patterns = self
            .item
            .display()
            .into_iter()
            .map(|labels| PatternView {
                pattern: labels.pattern,
                name: labels.name,
                displayed: labels.displayed,
                canonical: revealed.then_some(labels.canonical),
            })
            .collect();
        let last_result = match &self.phase {
            Phase::Answering => None,
            Phase::Reviewed(result) => Some(result.clone()),
        };

        SessionState {
            session_id: self.id,
            round: self.round,
            rounds: self.config.rounds,
            hand: self.item.hand.clone(),
            patterns,
            selections: self.selections.clone(),
            status: self.status(),
            score: self.score,
            last_result,
        }
    }
}

fn deal(chart: &Chart, rng: &mut StdRng) -> Result<QuizItem, QuizError> {
    let hand = chart.choose_hand(rng)?;
    QuizItem::build(hand, rng)
}
