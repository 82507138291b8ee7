use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("unknown remote event '{0}'")]
    UnknownEvent(String),
    #[error("malformed payload for '{event}': {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed event line: {0}")]
    Line(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("key delivery channel is disconnected")]
    Disconnected,
    #[error("key delivery rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
