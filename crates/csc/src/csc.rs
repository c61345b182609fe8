//! The CSC task: state machine, telemetry loop, heartbeat, fault path.
//!
//! [`Csc::run`] owns the component. It serializes command handling (one
//! command at a time, acked when its side effects are done), publishes a
//! heartbeat in every state, and reacts to faults raised by the telemetry
//! loop. The telemetry loop runs as a separate task so a slow station read
//! never blocks command handling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use wst_core::config::StationConfig;
use wst_core::error_codes::{CONTROLLER_START_ERROR, CONTROLLER_STOP_ERROR, TELEMETRY_LOOP_ERROR};
use wst_core::state::{transition, Command, SummaryState};
use wst_events::{CscEvent, EventBus, LogLevel, TelemetryFrame};

use crate::command::{channel, AckError, CommandRequest, Remote};
use crate::config::CscConfig;
use crate::model::Model;

/// Interval of the `heartbeat` event, and the unit of the loop-stop grace
/// period.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);

/// How many heartbeat intervals to wait for the telemetry loop to stop on
/// its own before aborting it.
const LOOP_DIE_GRACE: u32 = 5;

/// Commands queued behind the one currently executing.
const COMMAND_QUEUE_DEPTH: usize = 16;

/// Fault raised by a background task, delivered to the command loop.
struct FaultReport {
    code: i32,
    report: String,
    traceback: String,
}

pub struct Csc {
    state: SummaryState,
    config: CscConfig,
    model: Arc<Mutex<Model>>,
    bus: Arc<EventBus>,
    commands: mpsc::Receiver<CommandRequest>,
    faults: mpsc::Receiver<FaultReport>,
    fault_tx: mpsc::Sender<FaultReport>,
    telemetry_task: Option<(CancellationToken, JoinHandle<()>)>,
}

impl Csc {
    /// Build a CSC in STANDBY, returning it with a command [`Remote`].
    pub fn new(config: CscConfig, bus: Arc<EventBus>) -> (Self, Remote) {
        let (remote, commands) = channel(COMMAND_QUEUE_DEPTH);
        let (fault_tx, faults) = mpsc::channel(4);
        let csc = Self {
            state: SummaryState::Standby,
            config,
            model: Arc::new(Mutex::new(Model::new())),
            bus,
            commands,
            faults,
            fault_tx,
            telemetry_task: None,
        };
        (csc, remote)
    }

    pub fn summary_state(&self) -> SummaryState {
        self.state
    }

    /// Run until `exit_control` (or until every remote is dropped).
    pub async fn run(mut self) {
        tracing::info!(state = %self.state, "Component started");
        self.publish_state();

        // The beacon runs on its own task; command handling (including the
        // telemetry loop stop grace) does not pace it.
        let heartbeat_cancel = CancellationToken::new();
        let heartbeat = tokio::spawn(heartbeat_loop(
            Arc::clone(&self.bus),
            heartbeat_cancel.clone(),
        ));

        loop {
            tokio::select! {
                Some(fault) = self.faults.recv() => {
                    self.fault(fault.code, &fault.report, &fault.traceback).await;
                }
                request = self.commands.recv() => match request {
                    Some(request) => {
                        if self.handle_command(request).await {
                            break;
                        }
                    }
                    // Every remote dropped; nothing can command us anymore.
                    None => break,
                },
            }
        }

        self.shutdown().await;
        heartbeat_cancel.cancel();
        let _ = heartbeat.await;
    }

    /// Execute one command. Returns true when the component should exit.
    async fn handle_command(&mut self, request: CommandRequest) -> bool {
        let CommandRequest { command, ack } = request;

        let next = match transition(self.state, &command) {
            Ok(next) => next,
            Err(_) => {
                tracing::warn!(command = command.name(), state = %self.state, "Command rejected");
                let _ = ack.send(Err(AckError::NotAllowed {
                    command: command.name().to_string(),
                    state: self.state,
                }));
                return false;
            }
        };

        let result = match &command {
            Command::Start { settings } => self.do_start(settings).await,
            Command::Enable => self.do_enable().await,
            Command::Disable => self.do_disable().await,
            Command::Standby => self.do_standby().await,
            Command::EnterControl | Command::ExitControl => Ok(()),
        };

        match result {
            Ok(()) => {
                self.state = next;
                tracing::info!(command = command.name(), state = %self.state, "Command complete");
                self.publish_state();
                let _ = ack.send(Ok(()));
                matches!(command, Command::ExitControl)
            }
            Err(reason) => {
                tracing::warn!(command = command.name(), reason, "Command failed");
                let _ = ack.send(Err(AckError::Failed { reason }));
                false
            }
        }
    }

    /// STANDBY → DISABLED: load and apply the settings profile.
    async fn do_start(&mut self, settings: &str) -> Result<(), String> {
        let profile = StationConfig::load_profile(&self.config.config_dir, settings)
            .map_err(|e| e.to_string())?;
        self.model
            .lock()
            .await
            .setup(&profile, self.config.simulation_mode);
        Ok(())
    }

    /// DISABLED → ENABLED: bring the station link up, start the loop.
    async fn do_enable(&mut self) -> Result<(), String> {
        let start_result = self.model.lock().await.start_controller().await;
        if let Err(e) = start_result {
            self.fault(
                CONTROLLER_START_ERROR,
                "Error starting station controller",
                &e.to_string(),
            )
            .await;
            return Err(format!("Starting station controller failed: {e}"));
        }
        self.spawn_telemetry_loop();
        Ok(())
    }

    /// ENABLED → DISABLED: stop the loop, tear the station link down.
    async fn do_disable(&mut self) -> Result<(), String> {
        self.stop_telemetry_loop().await;
        let stop_result = self.model.lock().await.stop_controller().await;
        if let Err(e) = stop_result {
            self.fault(
                CONTROLLER_STOP_ERROR,
                "Error stopping station controller",
                &e.to_string(),
            )
            .await;
            return Err(format!("Stopping station controller failed: {e}"));
        }
        Ok(())
    }

    /// DISABLED or FAULT → STANDBY: surface diagnostics, drop the controller.
    async fn do_standby(&mut self) -> Result<(), String> {
        let mut model = self.model.lock().await;
        if self.state == SummaryState::Fault {
            let report = model.error_report();
            if !report.is_empty() {
                tracing::error!(report, "Error report from controller");
            }
            model.clear_error();
        }
        model.unset();
        Ok(())
    }

    /// Enter FAULT: stop everything, publish `errorCode`, keep accepting
    /// commands (only `standby` will be allowed).
    async fn fault(&mut self, code: i32, report: &str, traceback: &str) {
        tracing::error!(code, report, traceback, "Entering FAULT");
        self.stop_telemetry_loop().await;

        {
            let mut model = self.model.lock().await;
            if let Err(e) = model.stop_controller().await {
                tracing::error!(error = %e, "Error stopping station controller on the way to FAULT");
            }
            let controller_report = model.error_report();
            if !controller_report.is_empty() {
                tracing::error!(report = controller_report, "Error report from controller");
            }
        }

        self.bus
            .publish_event(CscEvent::error_code(code, report, traceback));
        self.state = SummaryState::Fault;
        self.publish_state();
    }

    fn spawn_telemetry_loop(&mut self) {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(telemetry_loop(
            Arc::clone(&self.model),
            Arc::clone(&self.bus),
            self.config.telemetry_interval,
            cancel.clone(),
            self.fault_tx.clone(),
        ));
        self.telemetry_task = Some((cancel, handle));
    }

    /// Ask the telemetry loop to stop and wait up to the grace period.
    async fn stop_telemetry_loop(&mut self) {
        let Some((cancel, mut handle)) = self.telemetry_task.take() else {
            return;
        };
        cancel.cancel();

        let grace = HEARTBEAT_INTERVAL * LOOP_DIE_GRACE;
        match tokio::time::timeout(grace, &mut handle).await {
            Ok(Ok(())) => tracing::debug!("Telemetry loop stopped"),
            Ok(Err(e)) => tracing::error!(error = %e, "Telemetry loop task failed"),
            Err(_) => {
                tracing::warn!("Telemetry loop did not stop within the grace period, aborting");
                handle.abort();
            }
        }
    }

    async fn shutdown(&mut self) {
        self.stop_telemetry_loop().await;
        if let Err(e) = self.model.lock().await.stop_controller().await {
            tracing::error!(error = %e, "Error stopping station controller at shutdown");
        }
        tracing::info!("Component stopped");
    }

    fn publish_state(&self) {
        self.bus.publish_event(CscEvent::summary_state(self.state));
    }
}

/// Publish a `heartbeat` event every [`HEARTBEAT_INTERVAL`] until cancelled.
async fn heartbeat_loop(bus: Arc<EventBus>, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => bus.publish_event(CscEvent::heartbeat()),
        }
    }
}

/// Acquire-and-publish loop, one iteration per interval tick.
///
/// Recoverable acquisition failures (bad frame, station redial) skip the
/// cycle with a warning; anything else raises a fault and ends the loop.
async fn telemetry_loop(
    model: Arc<Mutex<Model>>,
    bus: Arc<EventBus>,
    interval: Duration,
    cancel: CancellationToken,
    fault_tx: mpsc::Sender<FaultReport>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let mut guard = model.lock().await;
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = guard.acquire() => result,
        };

        match result {
            Ok(report) => {
                drop(guard);
                tracing::debug!(acquired_at = %report.acquired_at, "Publishing weather report");
                for frame in TelemetryFrame::from_report(&report) {
                    bus.publish_telemetry(frame);
                }
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, report = guard.error_report(), "No report this cycle");
            }
            Err(e) => {
                drop(guard);
                let _ = fault_tx
                    .send(FaultReport {
                        code: TELEMETRY_LOOP_ERROR,
                        report: "Error in the telemetry loop".to_string(),
                        traceback: e.to_string(),
                    })
                    .await;
                break;
            }
        }
    }

    bus.publish_event(CscEvent::log_message(
        LogLevel::Info,
        "Telemetry loop exiting",
    ));
}
