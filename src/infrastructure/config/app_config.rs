//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::entities::AccessToken;

use super::args::CliArgs;

pub(crate) const APP_NAME: &str = "qface-relay";
pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "linuxmobile";

const DOWNLOAD_DIR_NAME: &str = "downloaded_files";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from TOML and overridden by CLI.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// OneBot connection settings.
    #[serde(default)]
    pub onebot: OneBotConfig,

    /// Command trigger settings.
    #[serde(default)]
    pub command: CommandConfig,

    /// Download settings.
    #[serde(default)]
    pub download: DownloadConfig,
}

/// OneBot v11 forward WebSocket settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneBotConfig {
    /// WebSocket endpoint of the OneBot implementation.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    /// Access token sent as a bearer header.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Seconds to wait for an action response.
    #[serde(default = "default_action_timeout_secs")]
    pub action_timeout_secs: u64,

    /// Reconnect after the connection drops.
    #[serde(default = "default_true")]
    pub auto_reconnect: bool,

    /// Consecutive failed attempts before giving up.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
}

impl OneBotConfig {
    /// Returns the configured access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<AccessToken> {
        self.access_token.as_deref().and_then(AccessToken::new)
    }
}

impl Default for OneBotConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            access_token: None,
            action_timeout_secs: default_action_timeout_secs(),
            auto_reconnect: true,
            max_reconnect_attempts: default_max_reconnect_attempts(),
        }
    }
}

/// Command trigger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Command keyword.
    #[serde(default = "default_keyword")]
    pub keyword: String,

    /// Accepted prefixes in front of the keyword. `""` allows the bare keyword.
    #[serde(default = "default_wake_prefixes")]
    pub wake_prefixes: Vec<String>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            keyword: default_keyword(),
            wake_prefixes: default_wake_prefixes(),
        }
    }
}

/// Download configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory for downloaded hosted stickers.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_ws_url() -> String {
    "ws://127.0.0.1:3001".to_string()
}

fn default_action_timeout_secs() -> u64 {
    30
}

fn default_max_reconnect_attempts() -> u32 {
    10
}

fn default_keyword() -> String {
    "转换".to_string()
}

fn default_wake_prefixes() -> Vec<String> {
    vec!["/".to_string()]
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(ws_url) = args.ws_url {
            self.onebot.ws_url = ws_url;
        }
        if let Some(access_token) = args.access_token {
            self.onebot.access_token = Some(access_token);
        }
        if let Some(download_dir) = args.download_dir {
            self.download.dir = Some(download_dir);
        }
    }

    /// Returns default download directory.
    #[must_use]
    pub fn default_download_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join(DOWNLOAD_DIR_NAME))
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("qface-relay.log"))
    }

    /// Returns effective download directory.
    ///
    /// Falls back to `downloaded_files` in the working directory when no
    /// platform data directory exists.
    #[must_use]
    pub fn effective_download_dir(&self) -> PathBuf {
        self.download
            .dir
            .clone()
            .or_else(Self::default_download_dir)
            .unwrap_or_else(|| PathBuf::from(DOWNLOAD_DIR_NAME))
    }

    /// Returns effective log path. `None` logs to stderr.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
            log_level = "debug"

            [onebot]
            ws_url = "ws://10.0.0.2:6700"
            access_token = "secret"

            [command]
            wake_prefixes = ["/", ""]
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.onebot.ws_url, "ws://10.0.0.2:6700");
        assert_eq!(config.onebot.access_token().unwrap().as_str(), "secret");
        assert_eq!(config.onebot.action_timeout_secs, 30);
        assert!(config.onebot.auto_reconnect);
        assert_eq!(config.command.keyword, "转换");
        assert_eq!(config.command.wake_prefixes, vec!["/", ""]);
        assert!(config.download.dir.is_none());
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.onebot.ws_url, "ws://127.0.0.1:3001");
        assert!(config.onebot.access_token().is_none());
        assert_eq!(config.command.keyword, "转换");
        assert_eq!(config.command.wake_prefixes, vec!["/"]);
    }

    #[test]
    fn test_blank_access_token_is_ignored() {
        let mut config = AppConfig::default();
        config.onebot.access_token = Some("  ".to_string());
        assert!(config.onebot.access_token().is_none());
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let mut config = AppConfig::default();
        let args = CliArgs {
            config: None,
            log_path: Some(PathBuf::from("/tmp/bot.log")),
            log_level: Some(LogLevel::Trace),
            ws_url: Some("ws://remote:3001".to_string()),
            access_token: Some("token".to_string()),
            download_dir: Some(PathBuf::from("/srv/stickers")),
        };

        config.merge_with_args(args);

        assert_eq!(config.log_level, LogLevel::Trace);
        assert_eq!(config.onebot.ws_url, "ws://remote:3001");
        assert_eq!(config.onebot.access_token.as_deref(), Some("token"));
        assert_eq!(config.effective_download_dir(), PathBuf::from("/srv/stickers"));
        assert_eq!(config.effective_log_path(), Some(PathBuf::from("/tmp/bot.log")));
    }
}
