//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity the action core refers to has a strongly-typed ID so that an
//! actor reference can never be passed where an item or intent reference is
//! expected. All IDs use UUID v7 (time-ordered), which keeps intent IDs
//! sortable by creation time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Reference to any world entity: player, NPC, creature, or feature.
    ///
    /// Actors, targets, and observers all share this reference type because
    /// the same entity can play every role across different intents.
    EntityId
}

define_id! {
    /// Reference to an item held in a slot or inventory.
    ItemId
}

define_id! {
    /// Unique identifier for a submitted [`ActionIntent`](crate::ActionIntent).
    IntentId
}

define_id! {
    /// Unique identifier for an [`ActionEffect`](crate::ActionEffect).
    EffectId
}
