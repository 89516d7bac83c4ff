//! Error types for the witness-types crate.
//!
//! These cover malformed input only: unknown verb names, bad subtypes, and
//! effects settled twice. Pipeline failures live in
//! [`ActionFailure`](crate::ActionFailure) instead, because they are part of
//! a result rather than a programming error.

use crate::enums::Verb;

/// Errors raised while constructing or updating model values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// A verb name did not match any known verb.
    #[error("unknown verb: {0}")]
    UnknownVerb(String),

    /// A subtype name is not valid for the verb.
    #[error("unknown subtype {subtype} for verb {verb}")]
    UnknownSubtype {
        /// The verb the subtype was given for.
        verb: Verb,
        /// The rejected subtype name.
        subtype: String,
    },

    /// The verb requires a subtype and none was given.
    #[error("verb {0} requires a subtype")]
    MissingSubtype(Verb),

    /// Core verbs have dedicated handlers and cannot use the template path.
    #[error("verb {0} has a dedicated handler and cannot be templated")]
    CoreVerbNotTemplated(Verb),

    /// An effect was already applied or failed.
    #[error("effect already settled")]
    EffectAlreadySettled,
}
