use std::time::Duration;

pub const RECONNECT_DELAY_BASE: Duration = Duration::from_secs(1);
pub const RECONNECT_DELAY_MAX: Duration = Duration::from_secs(60);
pub const RECONNECT_JITTER_MAX: Duration = Duration::from_millis(500);
pub const MAX_RECONNECT_ATTEMPTS: u32 = 10;

pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
pub const ACTION_TIMEOUT: Duration = Duration::from_secs(30);

pub const OUTBOUND_QUEUE_SIZE: usize = 32;

pub const STATUS_OK: &str = "ok";

pub const ACTION_GET_IMAGE: &str = "get_image";
pub const ACTION_GET_MSG: &str = "get_msg";
pub const ACTION_SEND_PRIVATE_MSG: &str = "send_private_msg";
pub const ACTION_SEND_GROUP_MSG: &str = "send_group_msg";
