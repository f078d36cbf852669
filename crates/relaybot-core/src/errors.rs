use std::time::Duration;

/// Core error type for the relay.
///
/// Adapter crates map their transport errors into `External` so the dispatcher
/// can treat every failed send the same way (log, notify, move on).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("external error: {0}")]
    External(String),

    #[error("outbound send timed out after {0:?}")]
    Timeout(Duration),

    #[error("message has no sender")]
    MissingSender,
}

impl Error {
    /// True for failures of the outbound transport (send errors and timeouts).
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::External(_) | Error::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
