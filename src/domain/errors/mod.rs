//! Domain error types.

mod bot_api_error;
mod convert_error;

pub use bot_api_error::BotApiError;
pub use convert_error::{ConvertError, DOWNLOAD_FAILED_REPLY, FetchError, LOOKUP_FAILED_REPLY};
