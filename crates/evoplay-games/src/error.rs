//! Error types for the `evoplay-games` crate.
//!
//! Engines never return these from their public game operations; a
//! [`GameError`] raised while resolving a move becomes the `error` field of
//! the returned snapshot. They do surface from constructors that accept
//! caller-built boards.

/// Errors that can occur while building boards or resolving moves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// A cell coordinate lies outside the board.
    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },

    /// Rows passed to a board constructor have differing lengths.
    #[error("ragged rows: expected width {expected}, found {found}")]
    RaggedRows {
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },

    /// A board must have at least one row and one column.
    #[error("board dimensions must be non-zero ({width}x{height})")]
    EmptyBoard {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// A cell holds a value that is neither zero nor a power of two.
    #[error("cell value {0} is not zero or a power of two")]
    InvalidTile(u64),

    /// The chosen column has no empty cell, not even in the overflow row.
    #[error("Column {0} is full. Game over.")]
    ColumnFull(usize),

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow while resolving a move")]
    ArithmeticOverflow,
}
