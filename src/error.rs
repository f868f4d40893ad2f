// Library-level errors. The binary wraps these in `anyhow` with context.
use std::fmt;

#[derive(Debug)]
pub enum DuelError {
    /// A configuration value is missing, malformed or out of range.
    Config(String),
    /// The terminal could not be drawn to or read from.
    Terminal(std::io::Error),
}

impl fmt::Display for DuelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuelError::Config(msg) => write!(f, "invalid configuration: {msg}"),
            DuelError::Terminal(err) => write!(f, "terminal error: {err}"),
        }
    }
}

impl std::error::Error for DuelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DuelError::Config(_) => None,
            DuelError::Terminal(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for DuelError {
    fn from(err: std::io::Error) -> Self {
        DuelError::Terminal(err)
    }
}

pub type Result<T> = std::result::Result<T, DuelError>;
