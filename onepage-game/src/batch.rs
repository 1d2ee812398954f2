//! Monte Carlo batch runs: many independent games against one ruleset.
use rand::RngCore;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::constants::{DEFAULT_BATCH_RUNS, DEFAULT_SEED};
use crate::dice::DiceStream;
use crate::ruleset::RuleSet;
use crate::session::{GameSession, GameStatus, PlayConfig};

/// Upper bound on per-run storage reserved up front; larger batches grow as they go.
const PREALLOCATED_RUNS: usize = 1 << 16;

/// Batch size and seed for the shared random source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "BatchConfig::default_runs")]
    pub runs: usize,
    #[serde(default = "BatchConfig::default_seed")]
    pub seed: u64,
    #[serde(default = "BatchConfig::default_step_ceiling")]
    pub step_ceiling: u32,
}

impl BatchConfig {
    const fn default_runs() -> usize {
        DEFAULT_BATCH_RUNS
    }

    const fn default_seed() -> u64 {
        DEFAULT_SEED
    }

    fn default_step_ceiling() -> u32 {
        PlayConfig::default().step_ceiling
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            runs: Self::default_runs(),
            seed: Self::default_seed(),
            step_ceiling: Self::default_step_ceiling(),
        }
    }
}

/// Per-run view over the result arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    pub run: usize,
    pub turns: u32,
    pub did_win: Option<bool>,
    pub terminal_dimension: Option<usize>,
    pub final_scores: Vec<i32>,
}

/// Aggregates read from the per-run arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchStats {
    pub title: String,
    pub score_names: Vec<String>,
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub inconclusive: usize,
    /// Column sums of the one-hot terminal-dimension matrix.
    pub terminal_totals: Vec<u32>,
    /// Wins attributed to each terminal dimension.
    pub wins_by_dimension: Vec<u32>,
    /// Column means of the final-score matrix.
    pub mean_scores: Vec<f64>,
    pub mean_turns: f64,
    pub std_turns: f64,
}

impl BatchStats {
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        ratio(self.wins, self.games)
    }
}

/// Drives one reusable [`GameSession`] through `runs` games and keeps exact
/// per-run results.
#[derive(Debug, Clone)]
pub struct BatchRunner<R = ChaCha20Rng> {
    session: GameSession<R>,
    runs: usize,
    final_scores: Vec<Vec<i32>>,
    terminal_counts: Vec<Vec<u32>>,
    turn_counts: Vec<u32>,
    did_win: Vec<Option<bool>>,
    games: usize,
    wins: usize,
    losses: usize,
}

impl BatchRunner<ChaCha20Rng> {
    /// Runner over the default stream seeded from `config`.
    #[must_use]
    pub fn from_config(rules: Arc<RuleSet>, config: BatchConfig) -> Self {
        let mut runner = Self::new(rules, config.runs, DiceStream::from_seed(config.seed));
        runner.session.set_config(PlayConfig {
            step_ceiling: config.step_ceiling,
            pause_ms: 0,
        });
        runner
    }
}

impl<R: RngCore> BatchRunner<R> {
    #[must_use]
    pub fn new(rules: Arc<RuleSet>, runs: usize, dice: DiceStream<R>) -> Self {
        let session = GameSession::new(rules, dice).with_config(PlayConfig::default());
        let reserve = runs.min(PREALLOCATED_RUNS);
        Self {
            session,
            runs,
            final_scores: Vec::with_capacity(reserve),
            terminal_counts: Vec::with_capacity(reserve),
            turn_counts: Vec::with_capacity(reserve),
            did_win: Vec::with_capacity(reserve),
            games: 0,
            wins: 0,
            losses: 0,
        }
    }

    /// Play every game sequentially. Calling `run` again starts a fresh batch
    /// while the random stream keeps advancing.
    pub fn run(&mut self) {
        self.clear();
        let score_dim = self.session.scores().len();
        self.session.reset();

        for _ in 0..self.runs {
            self.session.play();

            self.final_scores.push(self.session.scores().to_vec());
            let mut one_hot = vec![0; score_dim];
            if let Some(slot) = self
                .session
                .terminal_dimension()
                .and_then(|dim| one_hot.get_mut(dim))
            {
                *slot = 1;
            }
            self.terminal_counts.push(one_hot);
            self.turn_counts.push(self.session.step_count());

            let did_win = match self.session.status() {
                GameStatus::Win => {
                    self.wins += 1;
                    Some(true)
                }
                GameStatus::Lose => {
                    self.losses += 1;
                    Some(false)
                }
                GameStatus::Ongoing | GameStatus::Invalid => None,
            };
            self.did_win.push(did_win);
            self.games += 1;

            self.session.reset();
        }

        log::info!(
            "batch finished: {} games, {} wins, {} losses",
            self.games,
            self.wins,
            self.losses
        );
    }

    /// Totals, column sums and means over the recorded runs.
    #[must_use]
    pub fn stats(&self) -> BatchStats {
        let rules = self.session.rules();
        let score_dim = self.session.scores().len();
        let mut terminal_totals = vec![0u32; score_dim];
        let mut wins_by_dimension = vec![0u32; score_dim];
        let mut score_sums = vec![0f64; score_dim];
        let mut turns = RunningStats::default();

        for (run, counts) in self.terminal_counts.iter().enumerate() {
            for (dim, &count) in counts.iter().enumerate() {
                terminal_totals[dim] += count;
                if count > 0 && self.did_win[run] == Some(true) {
                    wins_by_dimension[dim] += count;
                }
            }
        }
        for scores in &self.final_scores {
            for (sum, &score) in score_sums.iter_mut().zip(scores) {
                *sum += f64::from(score);
            }
        }
        for &count in &self.turn_counts {
            turns.add(f64::from(count));
        }

        let recorded = self.final_scores.len();
        BatchStats {
            title: rules.map(|r| r.title().to_string()).unwrap_or_default(),
            score_names: rules
                .map(|r| r.score_names().into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
            games: self.games,
            wins: self.wins,
            losses: self.losses,
            inconclusive: self.did_win.iter().filter(|w| w.is_none()).count(),
            terminal_totals,
            wins_by_dimension,
            mean_scores: score_sums
                .into_iter()
                .map(|sum| if recorded == 0 { 0.0 } else { sum / recorded as f64 })
                .collect(),
            mean_turns: turns.mean(),
            std_turns: turns.std_dev(),
        }
    }

    /// One record per completed run, in run order.
    #[must_use]
    pub fn run_records(&self) -> Vec<RunRecord> {
        (0..self.games)
            .map(|run| RunRecord {
                run,
                turns: self.turn_counts[run],
                did_win: self.did_win[run],
                terminal_dimension: self.terminal_counts[run].iter().position(|&c| c > 0),
                final_scores: self.final_scores[run].clone(),
            })
            .collect()
    }

    #[must_use]
    pub const fn runs(&self) -> usize {
        self.runs
    }

    #[must_use]
    pub const fn games(&self) -> usize {
        self.games
    }

    #[must_use]
    pub const fn wins(&self) -> usize {
        self.wins
    }

    #[must_use]
    pub const fn losses(&self) -> usize {
        self.losses
    }

    #[must_use]
    pub fn final_scores(&self) -> &[Vec<i32>] {
        &self.final_scores
    }

    #[must_use]
    pub fn terminal_counts(&self) -> &[Vec<u32>] {
        &self.terminal_counts
    }

    #[must_use]
    pub fn turn_counts(&self) -> &[u32] {
        &self.turn_counts
    }

    #[must_use]
    pub fn did_win(&self) -> &[Option<bool>] {
        &self.did_win
    }

    #[must_use]
    pub const fn session(&self) -> &GameSession<R> {
        &self.session
    }

    fn clear(&mut self) {
        self.final_scores.clear();
        self.terminal_counts.clear();
        self.turn_counts.clear();
        self.did_win.clear();
        self.games = 0;
        self.wins = 0;
        self.losses = 0;
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[derive(Debug, Default, Clone)]
struct RunningStats {
    count: u32,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    fn add(&mut self, value: f64) {
        self.count += 1;
        let count = f64::from(self.count);
        let delta = value - self.mean;
        self.mean += delta / count;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    const fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    fn variance(&self) -> f64 {
        if self.count > 1 {
            self.m2 / f64::from(self.count - 1)
        } else {
            0.0
        }
    }

    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}
