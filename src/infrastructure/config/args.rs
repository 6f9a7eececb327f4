use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "qface-relay",
    version,
    about = "Turns QQ stickers into downloadable image files",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stderr when unset.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// OneBot WebSocket endpoint.
    #[arg(long, env = "ONEBOT_WS_URL", value_name = "URL")]
    pub ws_url: Option<String>,

    /// OneBot access token.
    #[arg(long, env = "ONEBOT_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Directory for downloaded hosted stickers.
    #[arg(long, value_name = "PATH")]
    pub download_dir: Option<PathBuf>,
}
