//! Error types for Trellis.
//!
//! Structural contract violations (mismatched begin/end pairs, ranges that
//! break the transaction preconditions) are programmer errors and panic. The
//! errors here cover the conditions a caller can reasonably recover from.

/// Result type alias for Trellis operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised by data sources and configuration loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A row outside of the parent's current row range was requested.
    #[error("row {row} is out of range (row count {count})")]
    RowOutOfRange { row: usize, count: usize },

    /// A column outside of the parent's current column range was requested.
    #[error("column {column} is out of range (column count {count})")]
    ColumnOutOfRange { column: usize, count: usize },

    /// No tree node is registered under the given id.
    #[error("node {0} does not exist")]
    NodeNotFound(u64),

    /// A move request that cannot be applied to the current structure.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// Model configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ModelError {
    /// Create a row range error.
    pub fn row_out_of_range(row: usize, count: usize) -> Self {
        Self::RowOutOfRange { row, count }
    }

    /// Create a column range error.
    pub fn column_out_of_range(column: usize, count: usize) -> Self {
        Self::ColumnOutOfRange { column, count }
    }

    /// Create an invalid move error.
    pub fn invalid_move(message: impl Into<String>) -> Self {
        Self::InvalidMove(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
