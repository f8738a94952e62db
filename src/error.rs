//! Error types for GatiBase

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// GatiBase error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Actuator fault reported by a hardware driver
    #[error("Actuator fault: {0}")]
    Actuator(String),

    /// Encoder fault reported by a hardware driver
    #[error("Encoder fault: {0}")]
    Encoder(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
