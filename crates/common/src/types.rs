use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a string-backed identifier newtype.
///
/// All identifiers in the ticket space are opaque strings; the newtypes only
/// exist so a concert id can never be passed where a ticket id is expected.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Unique identifier for a ticket.
    ///
    /// Uniqueness only holds within a single ticket space; two nodes that
    /// mint the same id independently will overwrite each other on replication.
    TicketId
}

string_id! {
    /// Identifier of the concert a ticket grants entry to.
    ConcertId
}

string_id! {
    /// Identifier of the user holding a ticket.
    UserId
}

string_id! {
    /// Identifier of a node in the replicated space.
    NodeId
}

impl TicketId {
    /// Creates a fresh random ticket ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}
