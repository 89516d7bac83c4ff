//! Error types for the witness-rules crate.
//!
//! Registry construction and dice rolling are the only fallible operations
//! here; composition and the dice table are total.

use witness_types::Verb;

/// Errors raised while building registries or rolling dice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// Two definitions were supplied for the same verb.
    #[error("duplicate action definition for {0}")]
    DuplicateDefinition(Verb),

    /// A non-core verb has no effect template to render.
    #[error("{0} is a templated verb but has no effect template")]
    MissingTemplate(Verb),

    /// A per-subtype range names a subtype the verb does not have.
    #[error("{verb} has no subtype {subtype}")]
    UnknownSubtype {
        /// The verb the range was declared on.
        verb: Verb,
        /// The unrecognised subtype name.
        subtype: String,
    },

    /// A die with fewer than one face was requested.
    #[error("invalid die: d{0}")]
    InvalidDie(u32),

    /// A scripted roller ran out of values.
    #[error("scripted roller exhausted")]
    ScriptExhausted,
}
