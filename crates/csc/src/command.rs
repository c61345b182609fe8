//! Command plumbing between remotes and the CSC task.
//!
//! Commands travel over an mpsc channel as ([`Command`], ack) pairs; the ack
//! is a oneshot resolved when the command completes or is rejected. A
//! [`Remote`] is the sending half with one method per command, mirroring how
//! operators drive a component.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use wst_core::{Command, SummaryState};

/// Why a command did not complete.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[serde(tag = "ack", rename_all = "snake_case")]
pub enum AckError {
    #[error("Command {command} not allowed in state {state}")]
    NotAllowed {
        command: String,
        state: SummaryState,
    },

    #[error("Command failed: {reason}")]
    Failed { reason: String },

    /// The CSC task is gone (shut down or crashed).
    #[error("Component is not running")]
    Closed,
}

/// A command paired with its ack channel.
#[derive(Debug)]
pub struct CommandRequest {
    pub command: Command,
    pub ack: oneshot::Sender<Result<(), AckError>>,
}

/// Cloneable handle for sending commands to a running [`Csc`](crate::Csc).
#[derive(Clone)]
pub struct Remote {
    tx: mpsc::Sender<CommandRequest>,
}

impl Remote {
    pub(crate) fn new(tx: mpsc::Sender<CommandRequest>) -> Self {
        Self { tx }
    }

    /// Send one command and wait for its ack.
    pub async fn send(&self, command: Command) -> Result<(), AckError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(CommandRequest {
                command,
                ack: ack_tx,
            })
            .await
            .map_err(|_| AckError::Closed)?;
        ack_rx.await.map_err(|_| AckError::Closed)?
    }

    pub async fn enter_control(&self) -> Result<(), AckError> {
        self.send(Command::EnterControl).await
    }

    /// Apply the named settings profile and go STANDBY → DISABLED.
    pub async fn start(&self, settings: &str) -> Result<(), AckError> {
        self.send(Command::Start {
            settings: settings.to_string(),
        })
        .await
    }

    pub async fn enable(&self) -> Result<(), AckError> {
        self.send(Command::Enable).await
    }

    pub async fn disable(&self) -> Result<(), AckError> {
        self.send(Command::Disable).await
    }

    pub async fn standby(&self) -> Result<(), AckError> {
        self.send(Command::Standby).await
    }

    pub async fn exit_control(&self) -> Result<(), AckError> {
        self.send(Command::ExitControl).await
    }
}

/// Create the command channel, returning the remote and the receiving half.
pub(crate) fn channel(capacity: usize) -> (Remote, mpsc::Receiver<CommandRequest>) {
    let (tx, rx) = mpsc::channel(capacity);
    (Remote::new(tx), rx)
}
