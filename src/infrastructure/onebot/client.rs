use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::FutureExt;
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, trace, warn};

use super::codec::{EventParser, InboundFrame, SegmentCodec};
use super::connection::{OneBotConnection, WebSocketConnection};
use super::constants::{
    ACTION_GET_IMAGE, ACTION_GET_MSG, ACTION_SEND_GROUP_MSG, ACTION_SEND_PRIVATE_MSG,
    ACTION_TIMEOUT, MAX_RECONNECT_ATTEMPTS, OUTBOUND_QUEUE_SIZE, RECONNECT_DELAY_BASE,
    RECONNECT_DELAY_MAX, RECONNECT_JITTER_MAX,
};
use super::error::{OneBotError, OneBotResult};
use super::events::OneBotEventKind;
use super::payloads::{
    ActionRequest, ActionResponse, EventPayload, GetImageData, GetMsgData, SendMsgData,
};
use crate::domain::entities::{AccessToken, MessageId, MessagePart, OutboundSegment};
use crate::domain::errors::BotApiError;
use crate::domain::ports::BotApiPort;
use crate::infrastructure::config::OneBotConfig;

#[derive(Debug, Clone)]
pub struct OneBotClientConfig {
    pub ws_url: String,
    pub access_token: Option<AccessToken>,
    pub action_timeout: Duration,
    pub auto_reconnect: bool,
    pub max_reconnect_attempts: u32,
}

impl Default for OneBotClientConfig {
    fn default() -> Self {
        Self {
            ws_url: OneBotConfig::default().ws_url,
            access_token: None,
            action_timeout: ACTION_TIMEOUT,
            auto_reconnect: true,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
        }
    }
}

impl OneBotClientConfig {
    #[must_use]
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_config(config: &OneBotConfig) -> Self {
        Self::new(config.ws_url.clone())
            .with_access_token(config.access_token())
            .with_action_timeout(Duration::from_secs(config.action_timeout_secs))
            .with_auto_reconnect(config.auto_reconnect)
            .with_max_reconnect_attempts(config.max_reconnect_attempts)
    }

    #[must_use]
    pub fn with_access_token(mut self, token: Option<AccessToken>) -> Self {
        self.access_token = token;
        self
    }

    #[must_use]
    pub const fn with_action_timeout(mut self, action_timeout: Duration) -> Self {
        self.action_timeout = action_timeout;
        self
    }

    #[must_use]
    pub const fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    #[must_use]
    pub const fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }
}

/// State shared between the client handle and the connection task.
#[derive(Default)]
struct ActionRouter {
    outbound: RwLock<Option<mpsc::Sender<String>>>,
    pending: Mutex<HashMap<String, oneshot::Sender<ActionResponse>>>,
}

impl ActionRouter {
    fn attach(&self, sender: mpsc::Sender<String>) {
        *self.outbound.write() = Some(sender);
    }

    /// Drops the outbound queue and fails every in-flight action.
    fn detach(&self) {
        *self.outbound.write() = None;
        let abandoned = {
            let mut pending = self.pending.lock();
            let count = pending.len();
            pending.clear();
            count
        };
        if abandoned > 0 {
            debug!(count = abandoned, "Abandoned in-flight actions");
        }
    }

    fn sender(&self) -> Option<mpsc::Sender<String>> {
        self.outbound.read().clone()
    }

    fn register(&self, echo: String) -> oneshot::Receiver<ActionResponse> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(echo, tx);
        rx
    }

    fn forget(&self, echo: &str) {
        self.pending.lock().remove(echo);
    }

    fn complete(&self, response: ActionResponse) {
        let Some(echo) = response.echo_str().map(str::to_owned) else {
            debug!("Response without echo");
            return;
        };

        let waiter = self.pending.lock().remove(&echo);
        match waiter {
            Some(tx) => {
                let _ = tx.send(response);
            }
            None => debug!(echo = %echo, "Response for unknown or expired action"),
        }
    }
}

pub struct OneBotClient {
    config: OneBotClientConfig,
    router: Arc<ActionRouter>,
    running: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
}

impl OneBotClient {
    #[must_use]
    pub fn new(config: OneBotClientConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            router: Arc::new(ActionRouter::default()),
            running: Arc::new(AtomicBool::new(false)),
            shutdown,
        }
    }

    /// Starts the connection task and returns the event stream.
    ///
    /// # Errors
    ///
    /// Returns `OneBotError::AlreadyRunning` if the task is already active.
    pub fn connect(&self) -> OneBotResult<mpsc::UnboundedReceiver<OneBotEventKind>> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(OneBotError::AlreadyRunning);
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        self.shutdown.send_replace(false);
        let shutdown_rx = self.shutdown.subscribe();
        let config = self.config.clone();
        let router = self.router.clone();
        let running = self.running.clone();

        tokio::spawn(async move {
            let result = std::panic::AssertUnwindSafe(run_client_loop(
                config,
                router.clone(),
                event_tx.clone(),
                running.clone(),
                shutdown_rx,
            ));

            if let Err(panic_info) = result.catch_unwind().await {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };

                error!(panic = %panic_msg, "OneBot task panicked");
                router.detach();
                running.store(false, Ordering::SeqCst);
                let _ = event_tx.send(OneBotEventKind::Error {
                    message: format!("OneBot task panicked: {panic_msg}"),
                    recoverable: false,
                });
            }
        });

        Ok(event_rx)
    }

    pub fn disconnect(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.send_replace(true);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Sends an action and waits for the response carrying the same echo.
    ///
    /// # Errors
    ///
    /// Fails when not connected, on timeout, when the connection drops while
    /// waiting, or when the endpoint reports a failure.
    pub async fn call_action(&self, action: &str, params: Value) -> OneBotResult<Value> {
        let request = ActionRequest::new(action, params);
        let echo = request.echo.clone();
        let payload = serde_json::to_string(&request)?;

        let sender = self.router.sender().ok_or(OneBotError::NotConnected)?;
        let response_rx = self.router.register(echo.clone());

        trace!(action, echo = %echo, "Sending action");
        if sender.send(payload).await.is_err() {
            self.router.forget(&echo);
            return Err(OneBotError::NotConnected);
        }

        let response = match timeout(self.config.action_timeout, response_rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(OneBotError::ChannelClosed),
            Err(_) => {
                self.router.forget(&echo);
                warn!(action, "Action timed out");
                return Err(OneBotError::timeout(action));
            }
        };

        if !response.is_ok() {
            return Err(OneBotError::action_failed(
                action,
                response.retcode,
                response.error_message(),
            ));
        }

        Ok(response.data)
    }

    async fn call_typed<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Value,
    ) -> Result<T, BotApiError> {
        let data = self.call_action(action, params).await?;
        serde_json::from_value(data).map_err(|e| BotApiError::invalid_response(action, e.to_string()))
    }
}

impl Drop for OneBotClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[async_trait]
impl BotApiPort for OneBotClient {
    async fn get_image(&self, file_id: &str) -> Result<PathBuf, BotApiError> {
        let data: GetImageData = self
            .call_typed(
                ACTION_GET_IMAGE,
                json!({ "file": file_id, "file_id": file_id }),
            )
            .await?;

        if data.file.is_empty() {
            return Err(BotApiError::invalid_response(
                ACTION_GET_IMAGE,
                "empty file path",
            ));
        }

        Ok(PathBuf::from(data.file))
    }

    async fn get_msg(&self, message_id: MessageId) -> Result<Vec<MessagePart>, BotApiError> {
        let data: GetMsgData = self
            .call_typed(ACTION_GET_MSG, json!({ "message_id": message_id.as_i64() }))
            .await?;

        Ok(SegmentCodec::decode_content(&data.message))
    }

    async fn send_private_msg(
        &self,
        user_id: i64,
        message: Vec<OutboundSegment>,
    ) -> Result<Option<MessageId>, BotApiError> {
        let data: Option<SendMsgData> = self
            .call_typed(
                ACTION_SEND_PRIVATE_MSG,
                json!({ "user_id": user_id, "message": message }),
            )
            .await?;

        Ok(data.and_then(|d| d.message_id).map(MessageId))
    }

    async fn send_group_msg(
        &self,
        group_id: i64,
        message: Vec<OutboundSegment>,
    ) -> Result<Option<MessageId>, BotApiError> {
        let data: Option<SendMsgData> = self
            .call_typed(
                ACTION_SEND_GROUP_MSG,
                json!({ "group_id": group_id, "message": message }),
            )
            .await?;

        Ok(data.and_then(|d| d.message_id).map(MessageId))
    }
}

async fn run_client_loop(
    config: OneBotClientConfig,
    router: Arc<ActionRouter>,
    event_tx: mpsc::UnboundedSender<OneBotEventKind>,
    running: Arc<AtomicBool>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut reconnect_attempts: u32 = 0;

    while running.load(Ordering::SeqCst) {
        let mut connection: Box<dyn OneBotConnection> = Box::new(WebSocketConnection::new());

        match connection
            .connect(&config.ws_url, config.access_token.as_ref())
            .await
        {
            Ok(()) => {
                info!(url = %config.ws_url, "Connected to OneBot endpoint");
                reconnect_attempts = 0;
                let _ = event_tx.send(OneBotEventKind::Connected {
                    url: config.ws_url.clone(),
                });

                let result =
                    run_connection(connection.as_mut(), &router, &event_tx, &mut shutdown_rx)
                        .await;

                router.detach();
                let _ = connection.disconnect().await;

                match result {
                    Ok(()) => break,
                    Err(e) => {
                        if !report_session_error(&e, &event_tx) {
                            break;
                        }
                        reconnect_attempts += 1;
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to connect to OneBot endpoint");

                let _ = event_tx.send(OneBotEventKind::Error {
                    message: e.to_string(),
                    recoverable: e.should_reconnect(),
                });

                if !e.should_reconnect() {
                    break;
                }
                reconnect_attempts += 1;
            }
        }

        if !running.load(Ordering::SeqCst) || *shutdown_rx.borrow() {
            break;
        }

        if !config.auto_reconnect {
            let _ = event_tx.send(OneBotEventKind::Error {
                message: "Connection lost and reconnecting is disabled".to_string(),
                recoverable: false,
            });
            break;
        }

        if reconnect_attempts >= config.max_reconnect_attempts {
            error!(
                attempts = reconnect_attempts,
                "Max reconnection attempts exceeded"
            );
            let _ = event_tx.send(OneBotEventKind::Error {
                message: format!(
                    "Max reconnection attempts ({}) exceeded",
                    config.max_reconnect_attempts
                ),
                recoverable: false,
            });
            break;
        }

        let delay = calculate_backoff_delay(reconnect_attempts);
        info!(
            attempt = reconnect_attempts,
            delay_ms = delay.as_millis(),
            "Reconnecting to OneBot endpoint"
        );

        let _ = event_tx.send(OneBotEventKind::Reconnecting {
            attempt: reconnect_attempts,
        });

        tokio::select! {
            () = sleep(delay) => {}
            _ = shutdown_rx.changed() => break,
        }
    }

    router.detach();
    running.store(false, Ordering::SeqCst);
    info!("OneBot client loop terminated");
}

/// Reports a dropped session and returns whether reconnecting can help.
fn report_session_error(
    e: &OneBotError,
    event_tx: &mpsc::UnboundedSender<OneBotEventKind>,
) -> bool {
    warn!(error = %e, "Connection error");
    let _ = event_tx.send(OneBotEventKind::Disconnected {
        reason: e.to_string(),
    });

    if e.should_reconnect() {
        return true;
    }

    error!(error = %e, "Connection error is not recoverable");
    let _ = event_tx.send(OneBotEventKind::Error {
        message: e.to_string(),
        recoverable: false,
    });
    false
}

async fn run_connection(
    connection: &mut dyn OneBotConnection,
    router: &ActionRouter,
    event_tx: &mpsc::UnboundedSender<OneBotEventKind>,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> OneBotResult<()> {
    let (outbound_tx, mut outbound_rx) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
    router.attach(outbound_tx);

    loop {
        tokio::select! {
            frame = connection.receive() => dispatch_frame(frame?, router, event_tx),

            Some(payload) = outbound_rx.recv() => connection.send(payload).await?,

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    return Ok(());
                }
            }
        }
    }
}

fn dispatch_frame(
    frame: InboundFrame,
    router: &ActionRouter,
    event_tx: &mpsc::UnboundedSender<OneBotEventKind>,
) {
    match frame {
        InboundFrame::Response(response) => router.complete(response),
        InboundFrame::Event(EventPayload::Message(payload)) => {
            match EventParser::message_event(payload) {
                Some(event) => {
                    debug!(
                        message_id = %event.message_id,
                        user_id = event.user_id,
                        "Message received"
                    );
                    let _ = event_tx.send(OneBotEventKind::Message(Box::new(event)));
                }
                None => trace!("Ignoring message from unsupported conversation kind"),
            }
        }
        InboundFrame::Event(EventPayload::MetaEvent(meta)) => {
            if meta.meta_event_type == "lifecycle" {
                info!(self_id = ?meta.self_id, sub_type = ?meta.sub_type, "Lifecycle event");
                let _ = event_tx.send(OneBotEventKind::Lifecycle {
                    self_id: meta.self_id,
                    sub_type: meta.sub_type,
                });
            } else {
                trace!(kind = %meta.meta_event_type, "Meta event");
            }
        }
        InboundFrame::Event(EventPayload::MessageSent(_) | EventPayload::Other) => {
            trace!("Ignoring event");
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn calculate_backoff_delay(attempt: u32) -> Duration {
    let base_delay = RECONNECT_DELAY_BASE.as_millis() as u64;
    let max_delay = RECONNECT_DELAY_MAX.as_millis() as u64;
    let jitter_max = RECONNECT_JITTER_MAX.as_millis() as u64;

    let exponential_delay = base_delay.saturating_mul(2_u64.saturating_pow(attempt.min(6)));
    let capped_delay = exponential_delay.min(max_delay);

    Duration::from_millis(capped_delay.saturating_add(rand_jitter(jitter_max)))
}

fn rand_jitter(max: u64) -> u64 {
    use std::time::SystemTime;

    if max == 0 {
        return 0;
    }

    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_nanos()))
        .unwrap_or(0);

    nanos % max
}
