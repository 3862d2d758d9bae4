use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T> = std::result::Result<T, ZSetError>;

/// Recoverable input-validation failures.
///
/// Anything else (index/skiplist divergence, malformed packed entries) is an
/// internal invariant break and panics instead of surfacing here.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ZSetError {
    /// The input score, or the result of an increment, is NaN.
    #[error("resulting score is not a number (NaN)")]
    NanScore,
    /// A score range bound did not parse as a float.
    #[error("min or max is not a float")]
    BadScoreRange,
    /// A lex range bound was not `-`, `+`, `(value` or `[value`.
    #[error("min or max not valid string range item")]
    BadLexRange,
}
