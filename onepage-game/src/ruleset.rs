//! Rulesets: three outcome tables plus the score tracks they move.
//!
//! A [`RuleSetBuilder`] collects tables and score metadata through setters that
//! report shape mismatches. Only [`RuleSetBuilder::build`] can produce a
//! [`RuleSet`], so holding one means every category slot carries a ready table.
use serde::{Deserialize, Serialize};

use crate::constants::{CATEGORY_COUNT, DEFAULT_DIE_SIZE, DEFAULT_SCORE_DIM, DEFAULT_SCORE_SIZE};
use crate::outcome::{OutcomeTable, RuleError};

/// One tracked score dimension with its thresholds and polarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTrack {
    pub name: String,
    pub start: i32,
    pub end: i32,
    /// Reaching `end` on this track wins the game; otherwise it loses.
    pub win_at_end: bool,
    pub ending_message: String,
}

impl ScoreTrack {
    /// Signed distance from start to end threshold.
    #[must_use]
    pub fn journey(&self) -> i64 {
        i64::from(self.end) - i64::from(self.start)
    }

    /// True when `score` sits on the end threshold or has passed it in the
    /// direction the track travels.
    #[must_use]
    pub fn is_reached(&self, score: i32) -> bool {
        let now = i64::from(score) - i64::from(self.end);
        now == 0 || now.signum() == self.journey().signum()
    }
}

/// Mutable ruleset draft assembled by a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSetBuilder {
    die_size: u32,
    score_dim: usize,
    slots: [Option<OutcomeTable>; CATEGORY_COUNT],
    score_names: Vec<String>,
    starting_scores: Vec<i32>,
    ending_scores: Vec<i32>,
    good_end: Vec<bool>,
    ending_messages: Vec<String>,
    title: String,
    description: String,
}

impl Default for RuleSetBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SCORE_DIM, DEFAULT_SCORE_SIZE, DEFAULT_DIE_SIZE)
    }
}

impl RuleSetBuilder {
    /// Draft with every score starting at 0 and ending at `score_size`.
    #[must_use]
    pub fn new(score_dim: usize, score_size: i32, die_size: u32) -> Self {
        Self {
            die_size,
            score_dim,
            slots: [None, None, None],
            score_names: vec![String::new(); score_dim],
            starting_scores: vec![0; score_dim],
            ending_scores: vec![score_size; score_dim],
            good_end: vec![false; score_dim],
            ending_messages: vec![String::new(); score_dim],
            title: String::new(),
            description: String::new(),
        }
    }

    /// Store a table in slot `selector mod 3`, replacing any previous one.
    pub fn set_rule(&mut self, selector: usize, table: OutcomeTable) {
        self.slots[selector % CATEGORY_COUNT] = Some(table);
    }

    /// Table in slot `selector mod 3`, or `None` if that slot was never set.
    #[must_use]
    pub fn rule(&self, selector: usize) -> Option<&OutcomeTable> {
        self.slots[selector % CATEGORY_COUNT].as_ref()
    }

    /// # Errors
    ///
    /// Returns [`RuleError::ScoreLength`] and leaves the draft unchanged when
    /// `scores` does not have one entry per score dimension.
    pub fn set_starting_scores(&mut self, scores: &[i32]) -> Result<(), RuleError> {
        self.expect_len("starting scores", scores.len())?;
        self.starting_scores = scores.to_vec();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`RuleError::ScoreLength`] and leaves the draft unchanged when
    /// either slice does not have one entry per score dimension.
    pub fn set_ending_scores(&mut self, scores: &[i32], win_at_end: &[bool]) -> Result<(), RuleError> {
        self.expect_len("ending scores", scores.len())?;
        self.expect_len("ending outcomes", win_at_end.len())?;
        self.ending_scores = scores.to_vec();
        self.good_end = win_at_end.to_vec();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`RuleError::ScoreLength`] and leaves the draft unchanged when
    /// either slice does not have one entry per score dimension.
    pub fn set_score_text<S: AsRef<str>>(
        &mut self,
        names: &[S],
        messages: &[S],
    ) -> Result<(), RuleError> {
        self.expect_len("score names", names.len())?;
        self.expect_len("ending messages", messages.len())?;
        self.score_names = names.iter().map(|n| n.as_ref().to_string()).collect();
        self.ending_messages = messages.iter().map(|m| m.as_ref().to_string()).collect();
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    #[must_use]
    pub const fn die_size(&self) -> u32 {
        self.die_size
    }

    #[must_use]
    pub const fn score_dim(&self) -> usize {
        self.score_dim
    }

    #[must_use]
    pub fn starting_scores(&self) -> &[i32] {
        &self.starting_scores
    }

    /// True when all three slots hold ready tables.
    #[must_use]
    pub fn is_fully_defined(&self) -> bool {
        self.check().is_ok()
    }

    /// First structural problem preventing [`RuleSetBuilder::build`], if any.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::EmptyDie`], [`RuleError::ZeroDimension`], or the
    /// missing, unready or mis-sized slot.
    pub fn check(&self) -> Result<(), RuleError> {
        if self.die_size == 0 {
            return Err(RuleError::EmptyDie);
        }
        if self.score_dim == 0 {
            return Err(RuleError::ZeroDimension);
        }
        for (slot, table) in self.slots.iter().enumerate() {
            let table = table.as_ref().ok_or(RuleError::MissingCategory { slot })?;
            if !table.is_ready() {
                return Err(RuleError::UnreadyCategory {
                    slot,
                    missing: table.missing_outcomes(),
                });
            }
            if table.score_dim() != self.score_dim {
                return Err(RuleError::TableDimension {
                    slot,
                    expected: self.score_dim,
                    got: table.score_dim(),
                });
            }
        }
        Ok(())
    }

    /// Freeze the draft into a playable [`RuleSet`].
    ///
    /// # Errors
    ///
    /// Returns the first structural problem reported by [`RuleSetBuilder::check`].
    pub fn build(&self) -> Result<RuleSet, RuleError> {
        self.check()?;
        let [first, second, third] = &self.slots;
        let (Some(first), Some(second), Some(third)) = (first, second, third) else {
            return Err(RuleError::MissingCategory {
                slot: self.slots.iter().position(Option::is_none).unwrap_or(0),
            });
        };

        let tracks = (0..self.score_dim)
            .map(|idx| ScoreTrack {
                name: self.score_names[idx].clone(),
                start: self.starting_scores[idx],
                end: self.ending_scores[idx],
                win_at_end: self.good_end[idx],
                ending_message: self.ending_messages[idx].clone(),
            })
            .collect();

        Ok(RuleSet {
            die_size: self.die_size,
            tables: [first.clone(), second.clone(), third.clone()],
            tracks,
            title: self.title.clone(),
            description: self.description.clone(),
        })
    }

    fn expect_len(&self, field: &'static str, got: usize) -> Result<(), RuleError> {
        if got == self.score_dim {
            Ok(())
        } else {
            let err = RuleError::ScoreLength {
                field,
                expected: self.score_dim,
                got,
            };
            log::warn!("{err}");
            Err(err)
        }
    }
}

/// Fully defined, immutable ruleset shared by every game played against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    die_size: u32,
    tables: [OutcomeTable; CATEGORY_COUNT],
    tracks: Vec<ScoreTrack>,
    title: String,
    description: String,
}

impl RuleSet {
    /// Table selected by `selector mod 3`.
    #[must_use]
    pub fn table(&self, selector: usize) -> &OutcomeTable {
        &self.tables[selector % CATEGORY_COUNT]
    }

    #[must_use]
    pub const fn die_size(&self) -> u32 {
        self.die_size
    }

    #[must_use]
    pub fn score_dim(&self) -> usize {
        self.tracks.len()
    }

    /// `(score_dim, die_size)`.
    #[must_use]
    pub fn dims(&self) -> (usize, u32) {
        (self.score_dim(), self.die_size)
    }

    #[must_use]
    pub fn tracks(&self) -> &[ScoreTrack] {
        &self.tracks
    }

    #[must_use]
    pub fn track(&self, dimension: usize) -> Option<&ScoreTrack> {
        self.tracks.get(dimension)
    }

    #[must_use]
    pub fn starting_scores(&self) -> Vec<i32> {
        self.tracks.iter().map(|t| t.start).collect()
    }

    #[must_use]
    pub fn score_names(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.name.as_str()).collect()
    }

    /// `"<name> : <value>"` for each score dimension, on one line.
    #[must_use]
    pub fn format_scores(&self, scores: &[i32]) -> String {
        self.tracks
            .iter()
            .zip(scores)
            .map(|(track, score)| format!("{} : {score}", track.name))
            .collect::<Vec<_>>()
            .join("       ")
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}
