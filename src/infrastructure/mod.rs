//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// HTTP image download.
pub mod fetch;
/// OneBot v11 protocol client.
pub mod onebot;

pub use config::{AppConfig, CliArgs, LogLevel, StorageManager};
pub use fetch::HttpImageFetcher;
pub use onebot::{OneBotClient, OneBotClientConfig, OneBotEventKind};
