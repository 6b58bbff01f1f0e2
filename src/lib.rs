use std::time::Duration;

pub mod cli;
pub mod downloader;
pub mod error;
pub mod init_tracing;
pub mod models;
pub mod sampler;
pub mod session;
pub mod utils;

pub use error::{ConfigError, Error, TransferError};

pub const PROGRAM_NAME: &str = "dsp";
pub const USER_AGENT: &str = concat!("dsp (Download SPeed tester)/", env!("CARGO_PKG_VERSION"));
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);
pub const MAX_REDIRECTS: usize = 10;

pub const SECONDS_IN_DAY: u64 = 86_400;
pub const SECONDS_IN_HOUR: u64 = 3_600;
pub const SECONDS_IN_MINUTE: u64 = 60;

/// Shown in the report for any value that was never established.
pub const UNKNOWN_DISPLAY: &str = "(unknown)";
