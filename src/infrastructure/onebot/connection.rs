use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};

use super::codec::{EventParser, InboundFrame};
use super::constants::CONNECTION_TIMEOUT;
use super::error::{OneBotError, OneBotResult};
use crate::domain::entities::AccessToken;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, WsMessage>;
type WsReader = SplitStream<WsStream>;

#[async_trait]
pub trait OneBotConnection: Send + Sync {
    async fn connect(&mut self, url: &str, token: Option<&AccessToken>) -> OneBotResult<()>;
    async fn disconnect(&mut self) -> OneBotResult<()>;
    async fn send(&mut self, payload: String) -> OneBotResult<()>;
    async fn receive(&mut self) -> OneBotResult<InboundFrame>;
}

pub struct WebSocketConnection {
    writer: Option<WsWriter>,
    reader: Option<WsReader>,
}

impl WebSocketConnection {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            writer: None,
            reader: None,
        }
    }
}

impl Default for WebSocketConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OneBotConnection for WebSocketConnection {
    async fn connect(&mut self, url: &str, token: Option<&AccessToken>) -> OneBotResult<()> {
        let mut request = url
            .into_client_request()
            .map_err(|e| OneBotError::invalid_endpoint(e.to_string()))?;

        if let Some(token) = token {
            let value = HeaderValue::from_str(&token.bearer())
                .map_err(|_| OneBotError::invalid_endpoint("access token is not a valid header"))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        let (ws_stream, _) = timeout(CONNECTION_TIMEOUT, connect_async(request))
            .await
            .map_err(|_| OneBotError::timeout("connection"))?
            .map_err(|e| match e {
                WsError::Http(response)
                    if matches!(response.status().as_u16(), 401 | 403) =>
                {
                    OneBotError::authentication_failed(format!(
                        "endpoint answered {}",
                        response.status()
                    ))
                }
                WsError::Url(e) => OneBotError::invalid_endpoint(e.to_string()),
                other => OneBotError::connection_failed(other.to_string()),
            })?;

        let (writer, reader) = ws_stream.split();
        self.writer = Some(writer);
        self.reader = Some(reader);

        Ok(())
    }

    async fn disconnect(&mut self) -> OneBotResult<()> {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.close().await;
        }
        self.reader = None;
        debug!("WebSocket connection closed");
        Ok(())
    }

    async fn send(&mut self, payload: String) -> OneBotResult<()> {
        let writer = self.writer.as_mut().ok_or(OneBotError::NotConnected)?;

        writer
            .send(WsMessage::Text(payload.into()))
            .await
            .map_err(|e| OneBotError::websocket(e.to_string()))
    }

    async fn receive(&mut self) -> OneBotResult<InboundFrame> {
        let reader = self.reader.as_mut().ok_or(OneBotError::NotConnected)?;

        loop {
            let parsed = match reader.next().await {
                Some(Ok(WsMessage::Text(text))) => EventParser::parse_frame(&text),
                Some(Ok(WsMessage::Binary(data))) => match std::str::from_utf8(&data) {
                    Ok(text) => EventParser::parse_frame(text),
                    Err(e) => Err(OneBotError::protocol(e.to_string())),
                },
                Some(Ok(WsMessage::Close(frame))) => {
                    let (code, reason) = frame.map_or_else(
                        || (1000, "Normal closure".to_string()),
                        |f| (f.code.into(), f.reason.to_string()),
                    );

                    return Err(OneBotError::ConnectionClosed { code, reason });
                }
                Some(Ok(WsMessage::Ping(data))) => {
                    if let Some(writer) = self.writer.as_mut() {
                        let _ = writer.send(WsMessage::Pong(data)).await;
                    }
                    continue;
                }
                Some(Ok(WsMessage::Pong(_) | WsMessage::Frame(_))) => continue,
                Some(Err(e)) => return Err(OneBotError::websocket(e.to_string())),
                None => {
                    return Err(OneBotError::ConnectionClosed {
                        code: 1000,
                        reason: "Stream ended".to_string(),
                    });
                }
            };

            match parsed {
                Ok(frame) => return Ok(frame),
                Err(e) => warn!(error = %e, "Skipping undecodable frame"),
            }
        }
    }
}
