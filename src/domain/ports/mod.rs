mod bot_api_port;
mod image_fetch_port;

pub use bot_api_port::BotApiPort;
pub use image_fetch_port::ImageFetchPort;
