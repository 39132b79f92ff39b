//! Error types for revet

use thiserror::Error;

use crate::render::RenderError;
use crate::rules::RuleCompileError;

/// Result type alias for revet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for revet operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested baseline does not resolve to a commit
    #[error("Baseline '{reference}' not found. Expected a branch, a commit range like 'main..HEAD', or 'working-tree'.")]
    BaselineNotFound {
        /// The baseline identifier as given by the caller
        reference: String,
    },

    /// The diff between baseline and working tree contains no changes
    #[error("No changes found for the requested baseline. Try widening the scope with --baseline.")]
    EmptyChangeSet,

    /// A rule failed to compile
    #[error(transparent)]
    Rule(#[from] RuleCompileError),

    /// Report rendering violated an internal invariant
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Underlying git operation failed
    #[error("Git error: {0}")]
    Git(String),
}

impl Error {
    /// Whether the caller can recover by widening the review scope
    /// instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::EmptyChangeSet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_changeset_is_recoverable() {
        assert!(Error::EmptyChangeSet.is_recoverable());
    }

    #[test]
    fn test_baseline_not_found_is_fatal() {
        let err = Error::BaselineNotFound {
            reference: "no-such-branch".to_string(),
        };
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("no-such-branch"));
    }
}
