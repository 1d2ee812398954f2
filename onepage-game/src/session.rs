//! Game sessions: resolve turns against a shared ruleset until a score track ends the game.
use rand::RngCore;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Duration;

use crate::constants::{CATEGORY_COUNT, STEP_CEILING};
use crate::dice::DiceStream;
use crate::ruleset::{RuleSet, RuleSetBuilder};

/// Score dimensions that reached their threshold on the same turn.
pub type ReachedSet = SmallVec<[usize; 4]>;

/// Lifecycle of a session. `Win` and `Lose` are terminal; `Invalid` is only
/// entered at construction and never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Ongoing,
    Win,
    Lose,
    Invalid,
}

impl GameStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Win | Self::Lose)
    }
}

/// How a call to [`GameSession::play`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayOutcome {
    Won { dimension: usize, turns: u32 },
    Lost { dimension: usize, turns: u32 },
    /// Halted by the step ceiling with no score track reached.
    Inconclusive { turns: u32 },
    /// The ruleset was not fully defined; nothing was played.
    Invalid,
}

impl PlayOutcome {
    /// Terminal score dimension, if the game ended on one.
    #[must_use]
    pub const fn dimension(self) -> Option<usize> {
        match self {
            Self::Won { dimension, .. } | Self::Lost { dimension, .. } => Some(dimension),
            Self::Inconclusive { .. } | Self::Invalid => None,
        }
    }

    /// `Some(true)` for a win, `Some(false)` for a loss, `None` otherwise.
    #[must_use]
    pub const fn did_win(self) -> Option<bool> {
        match self {
            Self::Won { .. } => Some(true),
            Self::Lost { .. } => Some(false),
            Self::Inconclusive { .. } | Self::Invalid => None,
        }
    }
}

/// Pacing and safety limits for [`GameSession::play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayConfig {
    #[serde(default = "PlayConfig::default_step_ceiling")]
    pub step_ceiling: u32,
    /// Real-time pause between turns, for human-paced play only.
    #[serde(default)]
    pub pause_ms: u64,
}

impl PlayConfig {
    const fn default_step_ceiling() -> u32 {
        STEP_CEILING
    }

    /// Human-paced play with a pause of `seconds` between turns.
    #[must_use]
    pub const fn paced(seconds: u64) -> Self {
        Self {
            step_ceiling: STEP_CEILING,
            pause_ms: seconds.saturating_mul(1000),
        }
    }

    #[must_use]
    pub const fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            step_ceiling: Self::default_step_ceiling(),
            pause_ms: 0,
        }
    }
}

/// Everything resolved during one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// 1-based turn number.
    pub turn: u32,
    pub category_roll: u32,
    /// Category slot selected by `category_roll mod 3`.
    pub category: usize,
    pub outcome_roll: u32,
    /// `"<category>: <outcome message>"`.
    pub description: String,
    pub deltas: SmallVec<[i32; 4]>,
    pub terminal_dimension: Option<usize>,
    pub status: GameStatus,
}

/// Hooks for narrating a game as it is played. All methods default to no-ops.
pub trait TurnObserver {
    fn on_start(&mut self, _rules: &RuleSet) {}

    fn on_turn(&mut self, _rules: &RuleSet, _record: &TurnRecord, _scores: &[i32]) {}

    fn on_finish(&mut self, _rules: &RuleSet, _outcome: PlayOutcome, _scores: &[i32]) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl TurnObserver for Silent {}

/// One game played against a shared ruleset.
#[derive(Debug, Clone)]
pub struct GameSession<R = ChaCha20Rng> {
    rules: Option<Arc<RuleSet>>,
    dice: DiceStream<R>,
    config: PlayConfig,
    initial_scores: Vec<i32>,
    scores: Vec<i32>,
    roll_history: Vec<u32>,
    step_count: u32,
    status: GameStatus,
    terminal_dimension: Option<usize>,
}

impl<R: RngCore> GameSession<R> {
    /// Fresh `Ongoing` session at the ruleset's starting scores.
    #[must_use]
    pub fn new(rules: Arc<RuleSet>, dice: DiceStream<R>) -> Self {
        let initial_scores = rules.starting_scores();
        Self {
            rules: Some(rules),
            dice,
            config: PlayConfig::default(),
            scores: initial_scores.clone(),
            initial_scores,
            roll_history: Vec::new(),
            step_count: 0,
            status: GameStatus::Ongoing,
            terminal_dimension: None,
        }
    }

    /// Session from a draft. A draft that is not fully defined yields an
    /// `Invalid` session that refuses to play.
    #[must_use]
    pub fn from_builder(builder: &RuleSetBuilder, dice: DiceStream<R>) -> Self {
        match builder.build() {
            Ok(rules) => Self::new(Arc::new(rules), dice),
            Err(err) => {
                log::warn!("ruleset is not fully defined, session is invalid: {err}");
                let initial_scores = builder.starting_scores().to_vec();
                Self {
                    rules: None,
                    dice,
                    config: PlayConfig::default(),
                    scores: initial_scores.clone(),
                    initial_scores,
                    roll_history: Vec::new(),
                    step_count: 0,
                    status: GameStatus::Invalid,
                    terminal_dimension: None,
                }
            }
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: PlayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_config(&mut self, config: PlayConfig) {
        self.config = config;
    }

    /// Resolve one turn.
    ///
    /// Draws the category roll and the outcome roll from the die, applies the
    /// outcome's deltas, then checks for termination. Returns `None` without
    /// touching any state unless the session is `Ongoing`.
    pub fn step(&mut self) -> Option<TurnRecord> {
        if self.status != GameStatus::Ongoing {
            return None;
        }
        let rules = Arc::clone(self.rules.as_ref()?);
        let die_size = rules.die_size();

        let category_roll = self.dice.roll(die_size);
        self.roll_history.push(category_roll);
        let category = usize::try_from(category_roll).unwrap_or(0) % CATEGORY_COUNT;
        let table = rules.table(category);

        let outcome_roll = self.dice.roll(die_size);
        self.roll_history.push(outcome_roll);
        let outcome = usize::try_from(outcome_roll).unwrap_or(0);
        let deltas: SmallVec<[i32; 4]> = table.score_updates(outcome).iter().copied().collect();
        for (score, delta) in self.scores.iter_mut().zip(&deltas) {
            *score = score.saturating_add(*delta);
        }

        if let Some(dimension) = self.is_game_done() {
            self.terminal_dimension = Some(dimension);
            self.status = match rules.track(dimension) {
                Some(track) if track.win_at_end => GameStatus::Win,
                _ => GameStatus::Lose,
            };
        }
        self.step_count = self.step_count.saturating_add(1);

        let record = TurnRecord {
            turn: self.step_count,
            category_roll,
            category,
            outcome_roll,
            description: table.description(outcome),
            deltas,
            terminal_dimension: self.terminal_dimension,
            status: self.status,
        };
        log::debug!(
            "turn {} rolled {}/{} -> {} scores {:?}",
            record.turn,
            category_roll,
            outcome_roll,
            record.description,
            self.scores
        );
        Some(record)
    }

    /// Every score dimension currently at or past its end threshold.
    #[must_use]
    pub fn reached_dimensions(&self) -> ReachedSet {
        let Some(rules) = self.rules.as_ref() else {
            return ReachedSet::new();
        };
        rules
            .tracks()
            .iter()
            .zip(&self.scores)
            .enumerate()
            .filter_map(|(idx, (track, &score))| track.is_reached(score).then_some(idx))
            .collect()
    }

    /// Terminal dimension for the current scores, or `None` while the game
    /// continues. Ties between several reached dimensions are broken uniformly
    /// at random from the session's dice.
    pub fn is_game_done(&mut self) -> Option<usize> {
        let reached = self.reached_dimensions();
        match reached.as_slice() {
            [] => None,
            [only] => Some(*only),
            many => self.dice.pick(many),
        }
    }

    /// Play until the game ends or the step ceiling is hit.
    pub fn play(&mut self) -> PlayOutcome {
        self.play_with(&mut Silent)
    }

    /// Play while reporting every turn to `observer`.
    pub fn play_with(&mut self, observer: &mut dyn TurnObserver) -> PlayOutcome {
        let Some(rules) = self.rules.clone() else {
            log::warn!("cannot play: the ruleset is not fully defined");
            return PlayOutcome::Invalid;
        };
        observer.on_start(&rules);
        let pause = self.config.pause();

        while self.status == GameStatus::Ongoing {
            if self.step_count >= self.config.step_ceiling {
                log::warn!(
                    "game halted after {} turns without reaching an ending",
                    self.step_count
                );
                break;
            }
            let Some(record) = self.step() else {
                break;
            };
            observer.on_turn(&rules, &record, &self.scores);
            if !pause.is_zero() {
                std::thread::sleep(pause);
            }
        }

        let outcome = self.outcome();
        observer.on_finish(&rules, outcome, &self.scores);
        outcome
    }

    /// Current result as a [`PlayOutcome`].
    #[must_use]
    pub fn outcome(&self) -> PlayOutcome {
        match (self.status, self.terminal_dimension) {
            (GameStatus::Invalid, _) => PlayOutcome::Invalid,
            (GameStatus::Win, Some(dimension)) => PlayOutcome::Won {
                dimension,
                turns: self.step_count,
            },
            (GameStatus::Lose, Some(dimension)) => PlayOutcome::Lost {
                dimension,
                turns: self.step_count,
            },
            _ => PlayOutcome::Inconclusive {
                turns: self.step_count,
            },
        }
    }

    /// Restore starting scores and clear history. An `Invalid` session stays `Invalid`.
    pub fn reset(&mut self) {
        self.scores.clone_from(&self.initial_scores);
        self.roll_history.clear();
        self.step_count = 0;
        self.terminal_dimension = None;
        if self.rules.is_some() {
            self.status = GameStatus::Ongoing;
        }
    }

    /// Current scores formatted by [`RuleSet::format_scores`]. Empty for an
    /// invalid session.
    #[must_use]
    pub fn score_line(&self) -> String {
        self.rules
            .as_ref()
            .map(|rules| rules.format_scores(&self.scores))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn rules(&self) -> Option<&Arc<RuleSet>> {
        self.rules.as_ref()
    }

    #[must_use]
    pub fn scores(&self) -> &[i32] {
        &self.scores
    }

    #[must_use]
    pub fn roll_history(&self) -> &[u32] {
        &self.roll_history
    }

    #[must_use]
    pub const fn step_count(&self) -> u32 {
        self.step_count
    }

    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    #[must_use]
    pub const fn terminal_dimension(&self) -> Option<usize> {
        self.terminal_dimension
    }

    #[must_use]
    pub const fn config(&self) -> &PlayConfig {
        &self.config
    }

    #[must_use]
    pub const fn dice(&self) -> &DiceStream<R> {
        &self.dice
    }
}
