//! Where the simulator takes its rules from.
use onepage_game::{BuiltinRules, LoadError, RuleSet, RuleSource};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulesFileError {
    #[error("failed to read rules file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("rules file {} could not be loaded", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
    #[error("bundled example rules are unusable")]
    Bundled(#[source] LoadError),
}

/// Rule document chosen on the command line: a JSON file on disk, or the
/// example bundled with the engine when no path is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesFile {
    Bundled,
    Path(PathBuf),
}

impl RulesFile {
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Bundled, Self::Path)
    }
}

impl RuleSource for RulesFile {
    type Error = RulesFileError;

    fn load_rules(&self) -> Result<RuleSet, Self::Error> {
        let path = match self {
            Self::Bundled => return BuiltinRules.load_rules().map_err(RulesFileError::Bundled),
            Self::Path(path) => path,
        };
        let text = std::fs::read_to_string(path).map_err(|source| RulesFileError::Read {
            path: path.clone(),
            source,
        })?;
        onepage_game::load_rule_set(&text).map_err(|source| RulesFileError::Load {
            path: path.clone(),
            source,
        })
    }
}
