//! Error types for the witness-senses crate.

/// Errors raised while building sense tables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SenseError {
    /// A profile key does not name a verb or verb-and-subtype.
    #[error("unknown sense profile key: {0}")]
    UnknownProfileKey(String),
}
