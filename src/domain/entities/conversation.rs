//! Conversation routing.

use std::fmt;

/// Where an outbound message has to be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationTarget {
    /// Direct message to a user.
    Private {
        /// Recipient user id.
        user_id: i64,
    },
    /// Message to a group.
    Group {
        /// Recipient group id.
        group_id: i64,
    },
}

impl ConversationTarget {
    /// Creates a private target.
    #[must_use]
    pub const fn private(user_id: i64) -> Self {
        Self::Private { user_id }
    }

    /// Creates a group target.
    #[must_use]
    pub const fn group(group_id: i64) -> Self {
        Self::Group { group_id }
    }
}

impl fmt::Display for ConversationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private { user_id } => write!(f, "private:{user_id}"),
            Self::Group { group_id } => write!(f, "group:{group_id}"),
        }
    }
}
