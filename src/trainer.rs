use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};

use crate::chart::Chart;
use crate::format::ActionGroup;
use crate::grade::{GradeResult, ScoreState, Selection};
use crate::session::{QuizSession, SessionConfig, SessionState, SessionStatus};

pub const DEFAULT_CHART_PATH: &str = "data/sample_chart.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub rounds: u32,
    pub seed: Option<u64>,
    #[serde(default = "default_chart_path")]
    pub chart: PathBuf,
    #[serde(default)]
    pub no_color: bool,
}

fn default_chart_path() -> PathBuf {
    PathBuf::from(DEFAULT_CHART_PATH)
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            rounds: 5,
            seed: None,
            chart: default_chart_path(),
            no_color: false,
        }
    }
}

impl TrainerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("parsing config {}", path.display()))
    }
}

pub struct Trainer {
    config: TrainerConfig,
    session: QuizSession,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self> {
        let chart = Chart::load(&config.chart)?;
        Self::with_chart(Arc::new(chart), config)
    }

    pub fn with_chart(chart: Arc<Chart>, config: TrainerConfig) -> Result<Self> {
        let session = QuizSession::new(
            chart,
            SessionConfig {
                rounds: config.rounds,
                seed: config.seed,
            },
        )?;
        Ok(Self { config, session })
    }

    pub fn session_state(&self) -> SessionState {
        self.session.snapshot()
    }

    pub fn run(&mut self) -> Result<()> {
        let mut input = String::new();

        loop {
            let snapshot = self.session.snapshot();
            self.print_hand(&snapshot);

            loop {
                input.clear();
                print!("Flag cells (e.g. 1a 2c), c=check, h=help, q=quit: ");
                io::stdout().flush()?;
                if io::stdin().read_line(&mut input)? == 0 {
                    self.print_summary(&self.session.score());
                    return Ok(());
                }
                let trimmed = input.trim().to_lowercase();

                match trimmed.as_str() {
                    "q" => {
                        self.print_summary(&self.session.score());
                        return Ok(());
                    }
                    "h" => self.print_help(),
                    "c" => break,
                    "" => {}
                    tokens => {
                        for token in tokens.split_whitespace() {
                            match self.parse_cell(token) {
                                Ok(selection) => {
                                    let flagged = self.session.toggle(selection)?;
                                    let mark = if flagged { "flagged" } else { "cleared" };
                                    println!("{mark} {}", self.describe_cell(selection));
                                }
                                Err(err) => println!("{err}"),
                            }
                        }
                    }
                }
            }

            let result = self.session.check()?;
            self.print_review(&self.session.snapshot(), &result);

            if self.session.status() == SessionStatus::Completed {
                self.print_summary(&self.session.score());
                return Ok(());
            }

            print!("Press enter for the next hand (q=quit): ");
            io::stdout().flush()?;
            input.clear();
            if io::stdin().read_line(&mut input)? == 0 || input.trim().eq_ignore_ascii_case("q") {
                self.print_summary(&self.session.score());
                return Ok(());
            }
            self.session.next_round()?;
        }
    }

    /// Answers every hand perfectly. Used for smoke tests.
    pub fn autoplay_perfect(&mut self) -> Result<ScoreState> {
        loop {
            for selection in self.session.answer_key().iter() {
                self.session.toggle(*selection)?;
            }
            self.session.check()?;
            if self.session.status() == SessionStatus::Completed {
                return Ok(self.session.score());
            }
            self.session.next_round()?;
        }
    }

    /// Parses `<pattern number><group letter>`, numbering patterns as displayed.
    fn parse_cell(&self, token: &str) -> Result<Selection> {
        if !token.is_ascii() {
            bail!("`{token}` is not a cell like 1a");
        }
        let (number, letter) = token.split_at(token.len().saturating_sub(1));
        let index: usize = number
            .parse()
            .with_context(|| format!("`{token}` is not a cell like 1a"))?;
        let patterns = &self.session.item().patterns;
        let Some(pattern) = index.checked_sub(1).and_then(|i| patterns.get(i)) else {
            bail!("no pattern number {index} in this hand");
        };
        let group = match letter {
            "a" => ActionGroup::SbOpen,
            "b" => ActionGroup::SbResponse,
            "c" => ActionGroup::BbAction,
            "d" => ActionGroup::BbResponse,
            other => bail!("unknown group letter `{other}` (use a-d)"),
        };
        Ok(Selection::new(pattern.id, group))
    }

    fn describe_cell(&self, selection: Selection) -> String {
        format!("{} {}", selection.pattern.name(), selection.group)
    }

    fn print_hand(&self, snapshot: &SessionState) {
        if self.config.no_color {
            println!(
                "Hand {}/{} | {} | Score {}",
                snapshot.round, snapshot.rounds, snapshot.hand, snapshot.score
            );
        } else {
            println!(
                "{} {}/{} {} {}",
                "Hand".bold().cyan(),
                snapshot.round,
                snapshot.rounds,
                snapshot.hand.bold().yellow(),
                format!("Score {}", snapshot.score).bold().white()
            );
        }

        for (idx, view) in snapshot.patterns.iter().enumerate() {
            let cells = ActionGroup::ALL
                .iter()
                .zip(["a", "b", "c", "d"])
                .map(|(group, letter)| format!("{}{letter} {}", idx + 1, view.displayed.label(*group)))
                .collect::<Vec<_>>();
            if self.config.no_color {
                println!("  {:<12} SB: {} | {}", view.name, cells[0], cells[1]);
                println!("  {:<12} BB: {} | {}", "", cells[2], cells[3]);
            } else {
                println!("  {:<12} SB: {} | {}", view.name.bold().blue(), cells[0], cells[1]);
                println!("  {:<12} BB: {} | {}", "", cells[2], cells[3]);
            }
        }
    }

    fn print_review(&self, snapshot: &SessionState, result: &GradeResult) {
        for selection in &result.correct {
            self.print_verdict("correct", selection, true);
        }
        for selection in &result.incorrect {
            self.print_verdict("not altered", selection, false);
        }
        for selection in &result.missed {
            self.print_verdict("missed", selection, false);
        }

        println!("Correct actions:");
        for view in &snapshot.patterns {
            if let Some(canonical) = &view.canonical {
                println!("  {}", view.name);
                for line in canonical.to_string().lines() {
                    println!("    {line}");
                }
            }
        }
    }

    fn print_verdict(&self, verdict: &str, selection: &Selection, good: bool) {
        let cell = self.describe_cell(*selection);
        if self.config.no_color {
            println!("  {verdict}: {cell}");
        } else if good {
            println!("  {}: {cell}", verdict.bold().green());
        } else {
            println!("  {}: {cell}", verdict.bold().red());
        }
    }

    pub fn print_summary(&self, score: &ScoreState) {
        let accuracy = score.accuracy().map(|a| a * 100.0).unwrap_or_default();
        if self.config.no_color {
            println!(
                "Summary: score={}, incorrect={}, accuracy={accuracy:.0}%",
                score, score.incorrect
            );
        } else {
            println!(
                "{} {} {} {} {} {accuracy:.0}%",
                "Summary".bold().magenta(),
                score,
                "Incorrect".bold().white(),
                score.incorrect,
                "Accuracy".bold().white(),
            );
        }
    }

    fn print_help(&self) {
        println!("Some displayed frequencies were altered. Flag the cells you think are wrong.");
        println!("  Cells are <pattern number><letter>:");
        println!("    a = SB open, b = SB vs 3bet, c = BB vs open, d = BB vs 4bet");
        println!("  Entering a flagged cell again clears it.");
        println!("Type 'c' to check your answers, 'h' for this help, or 'q' to quit.");
    }
}
