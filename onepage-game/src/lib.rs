//! One-Page RPG Rules Engine
//!
//! Platform-agnostic core for data-driven dice games: three outcome categories,
//! a fixed set of score tracks, sessions that roll until a track crosses its
//! threshold, and a batch runner for balance tuning.
//! This crate performs no file or terminal I/O.

pub mod batch;
pub mod constants;
pub mod dice;
pub mod document;
pub mod outcome;
pub mod ruleset;
pub mod session;

// Re-export commonly used types
pub use batch::{BatchConfig, BatchRunner, BatchStats, RunRecord};
pub use constants::{CATEGORY_COUNT, STEP_CEILING};
pub use dice::DiceStream;
pub use document::{
    BUILTIN_RULES, CategoryDoc, LoadError, OutcomeDoc, RuleDocument, ScoreDoc, ValidationError,
    load_rule_set,
};
pub use outcome::{OutcomeTable, RuleError};
pub use ruleset::{RuleSet, RuleSetBuilder, ScoreTrack};
pub use session::{
    GameSession, GameStatus, PlayConfig, PlayOutcome, ReachedSet, Silent, TurnObserver,
    TurnRecord,
};

use std::sync::Arc;

/// Trait for abstracting where rule documents come from.
/// Platform-specific implementations should provide this
pub trait RuleSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate a ruleset.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read, parsed or validated.
    fn load_rules(&self) -> Result<RuleSet, Self::Error>;

    /// Load a ruleset ready to be shared between sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read, parsed or validated.
    fn load_shared(&self) -> Result<Arc<RuleSet>, Self::Error> {
        self.load_rules().map(Arc::new)
    }
}

/// The example ruleset compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRules;

impl RuleSource for BuiltinRules {
    type Error = LoadError;

    fn load_rules(&self) -> Result<RuleSet, Self::Error> {
        load_rule_set(BUILTIN_RULES)
    }
}

/// Rules held as an in-memory JSON string.
#[derive(Debug, Clone, Default)]
pub struct JsonRules(pub String);

impl RuleSource for JsonRules {
    type Error = LoadError;

    fn load_rules(&self) -> Result<RuleSet, Self::Error> {
        load_rule_set(&self.0)
    }
}

/// Main engine entry point binding a rule source to session and batch construction.
pub struct RulesEngine<S: RuleSource> {
    source: S,
}

impl<S: RuleSource> RulesEngine<S> {
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Create a seeded session against freshly loaded rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules cannot be loaded.
    pub fn create_session(&self, seed: u64, config: PlayConfig) -> Result<GameSession, S::Error> {
        let rules = self.source.load_shared()?;
        Ok(GameSession::new(rules, DiceStream::from_seed(seed)).with_config(config))
    }

    /// Create a batch runner against freshly loaded rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules cannot be loaded.
    pub fn create_batch(&self, config: BatchConfig) -> Result<BatchRunner, S::Error> {
        let rules = self.source.load_shared()?;
        Ok(BatchRunner::from_config(rules, config))
    }
}
