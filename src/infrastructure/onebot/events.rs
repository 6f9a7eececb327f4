use crate::domain::entities::MessageEvent;

#[derive(Debug, Clone)]
pub enum OneBotEventKind {
    Connected {
        url: String,
    },
    Disconnected {
        reason: String,
    },
    Reconnecting {
        attempt: u32,
    },
    Lifecycle {
        self_id: Option<i64>,
        sub_type: Option<String>,
    },
    Message(Box<MessageEvent>),
    Error {
        message: String,
        recoverable: bool,
    },
}

impl OneBotEventKind {
    #[must_use]
    pub const fn is_connection_event(&self) -> bool {
        matches!(
            self,
            Self::Connected { .. } | Self::Disconnected { .. } | Self::Reconnecting { .. }
        )
    }
}
