//! Rule definition documents and their conversion into a [`RuleSet`].
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::CATEGORY_COUNT;
use crate::outcome::{OutcomeTable, RuleError};
use crate::ruleset::{RuleSet, RuleSetBuilder};

/// Example ruleset bundled with the crate.
pub const BUILTIN_RULES: &str = include_str!("../data/harbor_run.json");

/// Count or divisibility problems found in a parsed document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("expected {expected} categories but found {found}")]
    CategoryCount { expected: usize, found: usize },
    #[error("{field} must be at least 1")]
    ZeroSized { field: &'static str },
    #[error("die size {die_size} is not a multiple of {outcomes} outcomes per category")]
    DieNotMultipleOfOutcomes { die_size: u32, outcomes: usize },
    #[error("die size {die_size} is not a multiple of {categories} categories")]
    DieNotMultipleOfCategories { die_size: u32, categories: usize },
    #[error("expected {expected} scores but found {found}")]
    ScoreCount { expected: usize, found: usize },
    #[error("category {category} has {found} outcomes, expected {expected}")]
    OutcomeCount {
        category: usize,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Failure to turn document text into a playable ruleset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The text is not a structurally valid document. Fatal.
    #[error("rule document could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    /// The document parsed but its counts do not line up. No ruleset is produced.
    #[error("rule document failed validation: {0}")]
    Invalid(#[from] ValidationError),
}

/// One outcome row within a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeDoc {
    pub message: String,
    pub score_changes: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDoc {
    pub name: String,
    pub outcomes: Vec<OutcomeDoc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDoc {
    pub name: String,
    pub ending_message: String,
    pub start: i32,
    pub end: i32,
    pub win_at_end: bool,
}

/// Persisted ruleset layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDocument {
    pub die_size: u32,
    pub no_outcomes_per_category: usize,
    pub no_scores: usize,
    pub categories: Vec<CategoryDoc>,
    pub scores: Vec<ScoreDoc>,
    #[serde(default)]
    pub full_title: String,
    #[serde(default)]
    pub full_description: String,
}

impl RuleDocument {
    /// Parse a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] when the text is not a valid document.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The bundled example document.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] only if the bundled asset is corrupt.
    pub fn builtin() -> Result<Self, LoadError> {
        Self::from_json(BUILTIN_RULES)
    }

    /// Check counts, then assemble a ruleset.
    ///
    /// Outcome rows with the wrong number of score changes are applied
    /// best-effort and logged rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Invalid`] on the first count or divisibility violation.
    pub fn to_rule_set(&self) -> Result<RuleSet, LoadError> {
        self.validate()?;
        let outcomes = self.no_outcomes_per_category;
        let score_dim = self.no_scores;

        let mut builder = RuleSetBuilder::new(score_dim, 0, self.die_size);
        let names: Vec<&str> = self.scores.iter().map(|s| s.name.as_str()).collect();
        let messages: Vec<&str> = self
            .scores
            .iter()
            .map(|s| s.ending_message.as_str())
            .collect();
        let starts: Vec<i32> = self.scores.iter().map(|s| s.start).collect();
        let ends: Vec<i32> = self.scores.iter().map(|s| s.end).collect();
        let wins: Vec<bool> = self.scores.iter().map(|s| s.win_at_end).collect();
        builder
            .set_starting_scores(&starts)
            .map_err(ValidationError::from)?;
        builder
            .set_ending_scores(&ends, &wins)
            .map_err(ValidationError::from)?;
        builder
            .set_score_text(&names, &messages)
            .map_err(ValidationError::from)?;

        for (slot, category) in self.categories.iter().enumerate() {
            let mut table = OutcomeTable::new(outcomes, score_dim);
            table.set_category(category.name.as_str());
            for (idx, outcome) in category.outcomes.iter().enumerate() {
                if let Err(err) =
                    table.set_outcome(idx, &outcome.score_changes, outcome.message.as_str())
                {
                    log::warn!("category '{}' outcome {idx}: {err}", category.name);
                }
            }
            builder.set_rule(slot, table);
        }

        builder.set_title(self.full_title.as_str());
        builder.set_description(self.full_description.as_str());
        let rules = builder.build().map_err(ValidationError::from)?;
        log::debug!(
            "loaded ruleset '{}' ({} scores, d{})",
            rules.title(),
            rules.score_dim(),
            rules.die_size()
        );
        Ok(rules)
    }

    /// Count and divisibility checks, in the order the loader applies them.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.categories.len() != CATEGORY_COUNT {
            return Err(ValidationError::CategoryCount {
                expected: CATEGORY_COUNT,
                found: self.categories.len(),
            });
        }
        if self.die_size == 0 {
            return Err(ValidationError::ZeroSized { field: "die_size" });
        }
        if self.no_outcomes_per_category == 0 {
            return Err(ValidationError::ZeroSized {
                field: "no_outcomes_per_category",
            });
        }
        if self.no_scores == 0 {
            return Err(ValidationError::ZeroSized { field: "no_scores" });
        }
        let die = usize::try_from(self.die_size).unwrap_or(usize::MAX);
        if die % self.no_outcomes_per_category != 0 {
            return Err(ValidationError::DieNotMultipleOfOutcomes {
                die_size: self.die_size,
                outcomes: self.no_outcomes_per_category,
            });
        }
        if die % CATEGORY_COUNT != 0 {
            return Err(ValidationError::DieNotMultipleOfCategories {
                die_size: self.die_size,
                categories: CATEGORY_COUNT,
            });
        }
        if self.scores.len() != self.no_scores {
            return Err(ValidationError::ScoreCount {
                expected: self.no_scores,
                found: self.scores.len(),
            });
        }
        for (category, doc) in self.categories.iter().enumerate() {
            if doc.outcomes.len() != self.no_outcomes_per_category {
                return Err(ValidationError::OutcomeCount {
                    category,
                    expected: self.no_outcomes_per_category,
                    found: doc.outcomes.len(),
                });
            }
        }
        Ok(())
    }
}

/// Parse and validate in one call.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] for malformed text and [`LoadError::Invalid`]
/// for documents whose counts do not line up.
pub fn load_rule_set(json: &str) -> Result<RuleSet, LoadError> {
    let document = RuleDocument::from_json(json)?;
    match document.to_rule_set() {
        Ok(rules) => Ok(rules),
        Err(err) => {
            log::warn!("{err}");
            Err(err)
        }
    }
}
