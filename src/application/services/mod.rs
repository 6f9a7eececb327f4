//! Application services.

/// Command trigger matching.
pub mod command_matcher;
/// Message part scanning.
pub mod message_scanner;
/// Per-invocation download files.
pub mod scratch_file;

pub use command_matcher::CommandMatcher;
pub use message_scanner::MessageScanner;
pub use scratch_file::create_scratch_file;
