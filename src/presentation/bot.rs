use std::sync::Arc;

use color_eyre::eyre::eyre;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::events::EventResult;
use crate::application::dto::{ConvertOutcome, ConvertRequest};
use crate::application::services::CommandMatcher;
use crate::application::use_cases::ConvertStickerUseCase;
use crate::domain::entities::MessageEvent;
use crate::infrastructure::onebot::OneBotEventKind;

/// Dispatches conversion commands from the event stream.
///
/// Every accepted command runs in its own task.
pub struct StickerBot {
    use_case: Arc<ConvertStickerUseCase>,
    matcher: CommandMatcher,
}

impl StickerBot {
    /// Creates a bot around the conversion use case.
    #[must_use]
    pub fn new(use_case: ConvertStickerUseCase, matcher: CommandMatcher) -> Self {
        Self {
            use_case: Arc::new(use_case),
            matcher,
        }
    }

    /// Builds a conversion request if `event` invokes the command.
    #[must_use]
    pub fn accept(&self, event: MessageEvent) -> Option<ConvertRequest> {
        if event.is_from_self() {
            return None;
        }

        if !self
            .matcher
            .matches_in(&event.plain_text(), event.message_type)
        {
            return None;
        }

        info!(
            message_id = %event.message_id,
            user_id = event.user_id,
            sent_at = ?event.time,
            raw = %event.raw_message,
            "Command received"
        );

        let message_id = event.message_id;
        let request = ConvertRequest::from_event(event);
        if request.is_none() {
            warn!(message_id = %message_id, "Command message has no routable conversation");
        }
        request
    }

    /// Maps one protocol event to what the bot should do next.
    #[must_use]
    pub fn handle_event(&self, event: OneBotEventKind) -> EventResult {
        match event {
            OneBotEventKind::Message(message) => self
                .accept(*message)
                .map_or(EventResult::Continue, EventResult::Convert),
            OneBotEventKind::Connected { url } => {
                info!(url = %url, keyword = self.matcher.keyword(), "Listening for commands");
                EventResult::Continue
            }
            OneBotEventKind::Lifecycle { self_id, .. } => {
                debug!(self_id = ?self_id, "Bot account online");
                EventResult::Continue
            }
            OneBotEventKind::Disconnected { reason } => {
                warn!(reason = %reason, "Disconnected from OneBot endpoint");
                EventResult::Continue
            }
            OneBotEventKind::Reconnecting { attempt } => {
                debug!(attempt, "Waiting to reconnect");
                EventResult::Continue
            }
            OneBotEventKind::Error {
                message,
                recoverable: true,
            } => {
                warn!(error = %message, "Recoverable connection error");
                EventResult::Continue
            }
            OneBotEventKind::Error {
                message,
                recoverable: false,
            } => EventResult::Exit { reason: message },
        }
    }

    /// Processes events until the stream ends or fails for good.
    ///
    /// In-flight conversions are awaited before returning.
    ///
    /// # Errors
    /// Returns error if the connection failed without a way to recover.
    pub async fn run(
        &self,
        mut events: mpsc::UnboundedReceiver<OneBotEventKind>,
    ) -> color_eyre::Result<()> {
        let mut tasks = JoinSet::new();
        let mut fatal = None;

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        debug!("Event stream closed");
                        break;
                    };

                    match self.handle_event(event) {
                        EventResult::Continue => {}
                        EventResult::Convert(request) => {
                            tasks.spawn(convert(self.use_case.clone(), request));
                        }
                        EventResult::Exit { reason } => {
                            fatal = Some(reason);
                            break;
                        }
                    }
                }

                Some(joined) = tasks.join_next() => log_join(joined),
            }
        }

        if !tasks.is_empty() {
            info!(count = tasks.len(), "Waiting for running conversions");
        }
        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }

        match fatal {
            Some(reason) => Err(eyre!("OneBot connection failed: {reason}")),
            None => Ok(()),
        }
    }
}

async fn convert(use_case: Arc<ConvertStickerUseCase>, request: ConvertRequest) {
    let message_id = request.message_id;
    let target = request.target;

    match use_case.execute(request).await {
        Ok(ConvertOutcome::Sent { filename }) => {
            info!(message_id = %message_id, target = %target, filename = %filename, "Conversion complete");
        }
        Ok(ConvertOutcome::FailureReported { reply }) => {
            info!(message_id = %message_id, target = %target, reply, "Conversion failed, user notified");
        }
        Ok(ConvertOutcome::NothingToConvert) => {
            debug!(message_id = %message_id, "Nothing to convert");
        }
        Err(e) => {
            error!(message_id = %message_id, target = %target, error = %e, "Conversion failed");
        }
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "Conversion task aborted");
    }
}
