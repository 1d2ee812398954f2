//! Outcome tables: one category's possible results and their score deltas.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DESCRIPTION_SEPARATOR;

/// Shape violations detected while a ruleset is being assembled.
///
/// The `Display` text doubles as the human-readable diagnostic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("expected {expected} {field} but received {got}")]
    ScoreLength {
        field: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("outcome index {index} is outside a table of {outcomes} outcomes")]
    OutcomeIndex { index: usize, outcomes: usize },
    #[error("no outcome table is set for category slot {slot}")]
    MissingCategory { slot: usize },
    #[error("outcome table in category slot {slot} is missing outcomes {missing:?}")]
    UnreadyCategory { slot: usize, missing: Vec<usize> },
    #[error("outcome table in category slot {slot} tracks {got} scores, ruleset tracks {expected}")]
    TableDimension {
        slot: usize,
        expected: usize,
        got: usize,
    },
    #[error("die size must be at least 1")]
    EmptyDie,
    #[error("a ruleset needs at least one score dimension")]
    ZeroDimension,
}

/// A category of outcomes. Created empty at a fixed size and filled through
/// [`OutcomeTable::set_outcome`]; it never shrinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTable {
    label: String,
    score_dim: usize,
    descriptions: Vec<String>,
    deltas: Vec<Vec<i32>>,
    entered: Vec<bool>,
}

impl OutcomeTable {
    /// Empty table with `outcomes` slots, each carrying a `score_dim` delta vector.
    #[must_use]
    pub fn new(outcomes: usize, score_dim: usize) -> Self {
        Self {
            label: String::new(),
            score_dim,
            descriptions: vec![String::new(); outcomes],
            deltas: vec![vec![0; score_dim]; outcomes],
            entered: vec![false; outcomes],
        }
    }

    /// Set the free-text category label.
    pub fn set_category(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Assign the delta vector and message for one outcome.
    ///
    /// A delta vector of the wrong length is applied best-effort: the first
    /// `min(len, score_dim)` entries are copied, the rest keep their previous
    /// value, and the outcome still counts as entered.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::OutcomeIndex`] (and changes nothing) when `index` is
    /// out of range, or [`RuleError::ScoreLength`] after the partial copy when
    /// the delta vector has the wrong length.
    pub fn set_outcome(
        &mut self,
        index: usize,
        deltas: &[i32],
        message: impl Into<String>,
    ) -> Result<(), RuleError> {
        let outcomes = self.outcome_count();
        let (Some(slot), Some(description)) =
            (self.deltas.get_mut(index), self.descriptions.get_mut(index))
        else {
            return Err(RuleError::OutcomeIndex { index, outcomes });
        };

        *description = message.into();
        let copied = deltas.len().min(self.score_dim);
        slot[..copied].copy_from_slice(&deltas[..copied]);
        self.entered[index] = true;

        if deltas.len() == self.score_dim {
            Ok(())
        } else {
            let err = RuleError::ScoreLength {
                field: "score changes",
                expected: self.score_dim,
                got: deltas.len(),
            };
            log::warn!("{err}");
            Err(err)
        }
    }

    /// `"<label>: <message>"` for the outcome, indexed modulo the table size.
    #[must_use]
    pub fn description(&self, outcome: usize) -> String {
        let message = self
            .wrap(outcome)
            .and_then(|idx| self.descriptions.get(idx))
            .map_or("", String::as_str);
        format!("{}{DESCRIPTION_SEPARATOR}{message}", self.label)
    }

    /// Delta vector for the outcome, indexed modulo the table size.
    #[must_use]
    pub fn score_updates(&self, outcome: usize) -> &[i32] {
        self.wrap(outcome)
            .and_then(|idx| self.deltas.get(idx))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True once every outcome has been entered. A table with no outcomes is never ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.entered.is_empty() && self.entered.iter().all(|&entered| entered)
    }

    /// Indices that have not been entered yet.
    #[must_use]
    pub fn missing_outcomes(&self) -> Vec<usize> {
        self.entered
            .iter()
            .enumerate()
            .filter_map(|(idx, &entered)| (!entered).then_some(idx))
            .collect()
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn outcome_count(&self) -> usize {
        self.entered.len()
    }

    #[must_use]
    pub const fn score_dim(&self) -> usize {
        self.score_dim
    }

    fn wrap(&self, outcome: usize) -> Option<usize> {
        outcome.checked_rem(self.outcome_count())
    }
}
