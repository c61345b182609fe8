//! Summary-state machine for the weather station CSC.
//!
//! The component walks the standard observatory control states:
//!
//! ```text
//! OFFLINE --enter_control--> STANDBY --start--> DISABLED --enable--> ENABLED
//!    ^                          |  ^                |  ^                |
//!    +------exit_control--------+  +----standby-----+  +----disable-----+
//! ```
//!
//! FAULT is entered internally (never by command) and is left with
//! `standby`. Transition checking is pure: the CSC applies side effects
//! (controller start/stop, telemetry loop) around [`transition`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Summary state of the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryState {
    Offline,
    Standby,
    Disabled,
    Enabled,
    Fault,
}

impl fmt::Display for SummaryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SummaryState::Offline => "OFFLINE",
            SummaryState::Standby => "STANDBY",
            SummaryState::Disabled => "DISABLED",
            SummaryState::Enabled => "ENABLED",
            SummaryState::Fault => "FAULT",
        };
        f.write_str(name)
    }
}

/// External command accepted by the component.
///
/// `start` carries the settings label naming the configuration profile to
/// apply while going from STANDBY to DISABLED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    EnterControl,
    Start {
        #[serde(default)]
        settings: String,
    },
    Enable,
    Disable,
    Standby,
    ExitControl,
}

impl Command {
    /// Canonical command name, as used in acks and log messages.
    pub fn name(&self) -> &'static str {
        match self {
            Command::EnterControl => "enter_control",
            Command::Start { .. } => "start",
            Command::Enable => "enable",
            Command::Disable => "disable",
            Command::Standby => "standby",
            Command::ExitControl => "exit_control",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compute the state a command moves the component to.
///
/// Returns [`CoreError::NotAllowed`] when the command is not legal in the
/// current state. FAULT is deliberately unreachable through here.
pub fn transition(state: SummaryState, command: &Command) -> Result<SummaryState, CoreError> {
    use SummaryState::*;

    let next = match (state, command) {
        (Offline, Command::EnterControl) => Standby,
        (Standby, Command::Start { .. }) => Disabled,
        (Disabled, Command::Enable) => Enabled,
        (Enabled, Command::Disable) => Disabled,
        (Disabled, Command::Standby) => Standby,
        (Fault, Command::Standby) => Standby,
        (Standby, Command::ExitControl) => Offline,
        _ => {
            return Err(CoreError::NotAllowed {
                command: command.clone(),
                state,
            })
        }
    };
    Ok(next)
}
