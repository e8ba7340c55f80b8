/// Result alias that carries the custom [`WavyLineError`] type.
pub type Result<T> = std::result::Result<T, WavyLineError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum WavyLineError {
    /// The renderer was initialised without an `el` surface id.
    #[error("no surface element was defined, pass one through with `el: \"canvasId\"`")]
    MissingSurface,
    /// The configured surface id is not known to the host.
    #[error("surface `{0}` is not registered with the host")]
    UnknownSurface(String),
    /// The shared configuration was read while an update held it.
    #[error("shared render configuration is already borrowed")]
    ConfigBorrowed,
    /// Free-form message for the application layer.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration files that failed to parse.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl WavyLineError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for WavyLineError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for WavyLineError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
