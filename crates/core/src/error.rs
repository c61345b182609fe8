use crate::state::{Command, SummaryState};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Command {command} not allowed in state {state}")]
    NotAllowed {
        command: Command,
        state: SummaryState,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
