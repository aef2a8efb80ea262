//! Error types for quoting and nesting runs.

use thiserror::Error;

/// Result type alias for solver operations.
pub type SolveResult<T> = Result<T, SolveError>;

/// Errors that abort a solve before any placement is attempted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolveError {
    /// No stock sheets were supplied.
    #[error("sheet inventory is empty")]
    EmptyInventory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SolveError::EmptyInventory;
        assert!(format!("{err}").contains("empty"));
    }
}
