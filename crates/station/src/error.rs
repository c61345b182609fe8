use std::time::Duration;

/// Errors surfaced by station controllers.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    #[error("I/O error talking to the station: {0}")]
    Io(#[from] std::io::Error),

    #[error("No complete frame from the station within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Station frame exceeded the {limit} byte buffer")]
    Oversized { limit: usize },

    #[error("Could not parse station frame")]
    Parse { raw: String },

    #[error("Station disconnected")]
    Disconnected,

    #[error("Controller is not started")]
    NotStarted,
}

impl StationError {
    /// Whether the telemetry loop may log this error and keep polling.
    ///
    /// A malformed frame is recoverable (the link is still up and the next
    /// frame may well parse), and so is a disconnect (the station redials
    /// and the controller accepts again). Everything else means the link or
    /// the controller lifecycle is broken.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StationError::Parse { .. } | StationError::Disconnected
        )
    }
}
