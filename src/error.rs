use std::process::ExitCode;

use thiserror::Error;

/// Conflicting or malformed command-line selections, caught before any
/// network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`-b'/`--bit' and `-B'/`--byte' are mutually exclusive")]
    BitAndByte,

    #[error("`-m'/`--metric' and `-i'/`--binary' are mutually exclusive")]
    MetricAndBinary,

    #[error("{0} and {1} are mutually exclusive")]
    ConflictingTiers(&'static str, &'static str),

    #[error("{0} and `-u'/`--url' are mutually exclusive")]
    TierAndUrl(&'static str),

    #[error("`{url}' is not a valid download URL: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("`{0}' is not a valid argument for `-n'/`--unit'")]
    InvalidUnit(String),
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to initialize transfer: {0}")]
    Init(String),

    #[error("{0}")]
    Runtime(String),

    #[error("transfer aborted by progress hook")]
    Aborted,
}

impl From<reqwest::Error> for TransferError {
    fn from(err: reqwest::Error) -> Self {
        let message = error_chain(&err);
        if err.is_builder() {
            TransferError::Init(message)
        } else {
            TransferError::Runtime(message)
        }
    }
}

/// Joins an error and all of its sources with `": "`.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl Error {
    pub fn exit_status(&self) -> u8 {
        match self {
            Error::Config(_) => 2,
            Error::Transfer(_) => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}
