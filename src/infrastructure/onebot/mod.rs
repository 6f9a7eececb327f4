//! OneBot v11 client over a forward WebSocket.

mod client;
mod codec;
mod connection;
mod constants;
mod error;
mod events;
mod payloads;

pub use client::{OneBotClient, OneBotClientConfig};
pub use codec::{EventParser, InboundFrame, SegmentCodec};
pub use connection::{OneBotConnection, WebSocketConnection};
pub use error::{OneBotError, OneBotResult};
pub use events::OneBotEventKind;
pub use payloads::{ActionRequest, ActionResponse, EventPayload, MessageContent, SegmentPayload};
