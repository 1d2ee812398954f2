//! Centralized structural constants for the rules engine.
//!
//! The category count is fixed by the engine; everything else here is a
//! default that rule documents or configuration may override.

/// Number of outcome categories a ruleset carries. Selected by the first roll of a turn.
pub const CATEGORY_COUNT: usize = 3;

/// Hard ceiling on resolved turns for a single `play` call.
pub const STEP_CEILING: u32 = 100_000;

/// Default size of the resolution die.
pub const DEFAULT_DIE_SIZE: u32 = 6;

/// Default number of tracked score dimensions.
pub const DEFAULT_SCORE_DIM: usize = 3;

/// Default ending threshold applied to every score before one is configured.
pub const DEFAULT_SCORE_SIZE: i32 = 10;

/// Default number of games for a batch run.
pub const DEFAULT_BATCH_RUNS: usize = 10;

/// Default user-visible seed for the shared random source.
pub const DEFAULT_SEED: u64 = 1337;

/// Separator between a category label and an outcome message.
pub(crate) const DESCRIPTION_SEPARATOR: &str = ": ";
