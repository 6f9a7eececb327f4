use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use qface_relay::application::{CommandMatcher, ConvertStickerUseCase};
use qface_relay::infrastructure::{
    AppConfig, CliArgs, HttpImageFetcher, OneBotClient, OneBotClientConfig, StorageManager,
};
use qface_relay::presentation::StickerBot;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config() -> Result<AppConfig> {
    let args = CliArgs::parse();

    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_logging(&config)?;

    info!(version = qface_relay::VERSION, "Starting {}", qface_relay::NAME);

    let client = Arc::new(OneBotClient::new(OneBotClientConfig::from_config(
        &config.onebot,
    )));
    let fetcher = Arc::new(HttpImageFetcher::new()?);

    let use_case =
        ConvertStickerUseCase::new(client.clone(), fetcher, config.effective_download_dir());
    info!(path = %use_case.download_dir().display(), "Download directory");

    let matcher = CommandMatcher::new(
        config.command.keyword.clone(),
        config.command.wake_prefixes.clone(),
    );
    let bot = StickerBot::new(use_case, matcher);

    let events = client.connect()?;

    let result = tokio::select! {
        result = bot.run(events) => result,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown requested");
            Ok(())
        }
    };

    client.disconnect();
    info!("Exiting");

    result
}
