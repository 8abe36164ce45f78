//! Typed model of a preflop chart: hands, suitedness patterns and the
//! action-frequency records attached to them.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::error::QuizError;
use crate::random::{RandomSource, index_below};

/// Key of a single frequency inside an [`ActionFrequencyRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionKey {
    #[serde(rename = "SB open")]
    SbOpen,
    #[serde(rename = "SB 4bet")]
    SbFourBet,
    #[serde(rename = "SB Cv3bet")]
    SbCallThreeBet,
    #[serde(rename = "BB 3bet")]
    BbThreeBet,
    #[serde(rename = "BB call")]
    BbCall,
    #[serde(rename = "BB 5bet")]
    BbFiveBet,
    #[serde(rename = "BB Cv4bet")]
    BbCallFourBet,
    #[serde(rename = "BB Fv4bet")]
    BbFoldFourBet,
}

impl ActionKey {
    pub const ALL: [ActionKey; 8] = [
        ActionKey::SbOpen,
        ActionKey::SbFourBet,
        ActionKey::SbCallThreeBet,
        ActionKey::BbThreeBet,
        ActionKey::BbCall,
        ActionKey::BbFiveBet,
        ActionKey::BbCallFourBet,
        ActionKey::BbFoldFourBet,
    ];

    /// Name used by the chart data files.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKey::SbOpen => "SB open",
            ActionKey::SbFourBet => "SB 4bet",
            ActionKey::SbCallThreeBet => "SB Cv3bet",
            ActionKey::BbThreeBet => "BB 3bet",
            ActionKey::BbCall => "BB call",
            ActionKey::BbFiveBet => "BB 5bet",
            ActionKey::BbCallFourBet => "BB Cv4bet",
            ActionKey::BbFoldFourBet => "BB Fv4bet",
        }
    }
}

impl Display for ActionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKey {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| QuizError::UnknownActionKey(s.to_string()))
    }
}

/// Mixed-strategy percentages for one hand and suitedness pattern.
///
/// Records may be partial; absent keys read as zero when rendered. A `null`
/// frequency in chart data is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Option<f64>>")]
pub struct ActionFrequencyRecord(BTreeMap<ActionKey, f64>);

impl ActionFrequencyRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from `(key, value)` pairs, rejecting values outside `0..=100`.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, QuizError>
    where
        I: IntoIterator<Item = (ActionKey, f64)>,
    {
        let mut record = Self::new();
        for (key, value) in pairs {
            record.set(key, value)?;
        }
        Ok(record)
    }

    pub fn set(&mut self, key: ActionKey, value: f64) -> Result<(), QuizError> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(QuizError::InvalidFrequency { key, value });
        }
        self.0.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: ActionKey) -> Option<f64> {
        self.0.get(&key).copied()
    }

    /// Frequency of `key`, zero when absent.
    pub fn value(&self, key: ActionKey) -> f64 {
        self.get(key).unwrap_or(0.0)
    }

    pub fn contains(&self, key: ActionKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = ActionKey> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActionKey, f64)> + '_ {
        self.0.iter().map(|(key, value)| (*key, *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrites a key the engine already validated.
    pub(crate) fn replace(&mut self, key: ActionKey, value: f64) {
        self.0.insert(key, value);
    }
}

impl TryFrom<BTreeMap<String, Option<f64>>> for ActionFrequencyRecord {
    type Error = QuizError;

    fn try_from(raw: BTreeMap<String, Option<f64>>) -> Result<Self, Self::Error> {
        let mut record = Self::new();
        for (name, value) in raw {
            match (name.parse::<ActionKey>(), value) {
                (Ok(key), Some(value)) => record.set(key, value)?,
                (Ok(_), None) => {}
                (Err(_), _) => tracing::warn!(key = %name, "ignoring unknown action key"),
            }
        }
        Ok(record)
    }
}

/// Suitedness category of a starting hand, identified by its chart code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr,
)]
pub enum PatternId {
    Mono,
    TripHigh,
    TripLow,
    Double,
    SingleHigh,
    SingleLow,
    Rainbow,
}

impl PatternId {
    /// Presentation order used for every hand.
    pub const DISPLAY_ORDER: [PatternId; 7] = [
        PatternId::Double,
        PatternId::SingleHigh,
        PatternId::SingleLow,
        PatternId::TripHigh,
        PatternId::TripLow,
        PatternId::Mono,
        PatternId::Rainbow,
    ];

    pub fn code(self) -> u8 {
        match self {
            PatternId::Mono => 1,
            PatternId::TripHigh => 2,
            PatternId::TripLow => 3,
            PatternId::Double => 4,
            PatternId::SingleHigh => 5,
            PatternId::SingleLow => 6,
            PatternId::Rainbow => 7,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(PatternId::Mono),
            2 => Some(PatternId::TripHigh),
            3 => Some(PatternId::TripLow),
            4 => Some(PatternId::Double),
            5 => Some(PatternId::SingleHigh),
            6 => Some(PatternId::SingleLow),
            7 => Some(PatternId::Rainbow),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PatternId::Mono => "Mono",
            PatternId::TripHigh => "Trip High",
            PatternId::TripLow => "Trip Low",
            PatternId::Double => "Double",
            PatternId::SingleHigh => "Single High",
            PatternId::SingleLow => "Single Low",
            PatternId::Rainbow => "Rainbow",
        }
    }

    pub fn display_rank(self) -> usize {
        Self::DISPLAY_ORDER
            .iter()
            .position(|id| *id == self)
            .unwrap_or(Self::DISPLAY_ORDER.len())
    }
}

impl Display for PatternId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for PatternId {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(PatternId::from_code)
            .ok_or_else(|| QuizError::InvalidSelection(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitednessPattern {
    pub id: PatternId,
    pub actions: Option<ActionFrequencyRecord>,
}

/// A starting hand and its patterns, kept in [`PatternId::DISPLAY_ORDER`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandEntry {
    pub label: String,
    pub patterns: Vec<SuitednessPattern>,
}

impl HandEntry {
    pub fn new(label: impl Into<String>, mut patterns: Vec<SuitednessPattern>) -> Self {
        patterns.sort_by_key(|pattern| pattern.id.display_rank());
        Self {
            label: label.into(),
            patterns,
        }
    }

    pub fn has_patterns(&self) -> bool {
        !self.patterns.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawChart {
    hands: BTreeMap<String, Option<BTreeMap<String, Option<ActionFrequencyRecord>>>>,
}

/// The full hand → pattern → record dataset.
#[derive(Debug, Clone, Default)]
pub struct Chart {
    hands: Vec<HandEntry>,
}

impl Chart {
    pub fn new(hands: Vec<HandEntry>) -> Self {
        Self { hands }
    }

    pub fn from_json_str(json: &str) -> Result<Self, QuizError> {
        let raw: RawChart = serde_json::from_str(json)?;
        let hands = raw
            .hands
            .into_iter()
            .map(|(label, patterns)| {
                // A `null` hand has no patterns and is never dealt.
                let patterns = patterns
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|(code, actions)| match code.parse::<PatternId>() {
                        Ok(id) => Some(SuitednessPattern { id, actions }),
                        Err(_) => {
                            tracing::warn!(hand = %label, code = %code, "skipping unknown pattern code");
                            None
                        }
                    })
                    .collect();
                HandEntry::new(label, patterns)
            })
            .collect();
        Ok(Self { hands })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuizError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| QuizError::ChartIo {
            path: path.to_path_buf(),
            source,
        })?;
        let chart = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            hands = chart.hands.len(),
            playable = chart.playable_hands().count(),
            "loaded chart"
        );
        Ok(chart)
    }

    pub fn hands(&self) -> &[HandEntry] {
        &self.hands
    }

    pub fn hand(&self, label: &str) -> Option<&HandEntry> {
        self.hands.iter().find(|hand| hand.label == label)
    }

    /// Hands with at least one suitedness pattern.
    pub fn playable_hands(&self) -> impl Iterator<Item = &HandEntry> + '_ {
        self.hands.iter().filter(|hand| hand.has_patterns())
    }

    /// Uniformly picks a playable hand.
    pub fn choose_hand<S: RandomSource + ?Sized>(&self, rng: &mut S) -> Result<&HandEntry, QuizError> {
        let playable: Vec<&HandEntry> = self.playable_hands().collect();
        if playable.is_empty() {
            return Err(QuizError::EmptyChart);
        }
        Ok(playable[index_below(rng, playable.len())])
    }
}
