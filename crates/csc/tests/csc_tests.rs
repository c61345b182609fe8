//! Integration tests for the CSC.
//!
//! A [`Harness`] spawns the component and drives it through its command
//! remote while following the event stream, the way an operator console
//! would.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use tokio::sync::broadcast;
use tokio::time::timeout;

use wst_core::config::{ControllerKind, StationConfig};
use wst_core::SummaryState;
use wst_csc::{server, AckError, Csc, CscConfig, Remote};
use wst_events::{CscEvent, EventBus, EventDetail, TelemetryFrame};

/// Standard command timeout.
const STD_TIMEOUT: Duration = Duration::from_secs(2);
/// Time limit for events that involve station I/O or fault detection.
const LONG_TIMEOUT: Duration = Duration::from_secs(20);

struct Harness {
    remote: Remote,
    bus: Arc<EventBus>,
    events: broadcast::Receiver<CscEvent>,
    handle: tokio::task::JoinHandle<()>,
    _config_dir: tempfile::TempDir,
}

impl Harness {
    /// Spawn a CSC with a `default` profile in a temp config directory.
    fn new(simulation_mode: u8) -> Self {
        Self::with_profile(
            simulation_mode,
            StationConfig {
                kind: ControllerKind::Aws310,
                host: "127.0.0.1".into(),
                port: 0,
                buffer_size: 16384,
                timeout_secs: 1,
            },
        )
    }

    /// Same, writing the given station profile as `default`.
    fn with_profile(simulation_mode: u8, profile: StationConfig) -> Self {
        let config_dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            config_dir.path().join("default.json"),
            serde_json::to_string(&profile).unwrap(),
        )
        .unwrap();

        let config = CscConfig {
            command_host: "127.0.0.1".into(),
            command_port: 0,
            config_dir: config_dir.path().to_path_buf(),
            telemetry_interval: Duration::from_millis(50),
            simulation_mode,
        };

        let bus = Arc::new(EventBus::default());
        let events = bus.subscribe_events();
        let (csc, remote) = Csc::new(config, Arc::clone(&bus));
        let handle = tokio::spawn(csc.run());

        Self {
            remote,
            bus,
            events,
            handle,
            _config_dir: config_dir,
        }
    }

    /// Next `summaryState` event, skipping heartbeats and log messages.
    async fn next_state(&mut self) -> SummaryState {
        loop {
            let event = timeout(LONG_TIMEOUT, self.events.recv())
                .await
                .expect("timed out waiting for a summaryState event")
                .expect("event bus closed");
            if let EventDetail::SummaryState { state } = event.detail {
                return state;
            }
        }
    }

    /// Next `errorCode` event.
    async fn next_error_code(&mut self) -> i32 {
        loop {
            let event = timeout(LONG_TIMEOUT, self.events.recv())
                .await
                .expect("timed out waiting for an errorCode event")
                .expect("event bus closed");
            if let EventDetail::ErrorCode { code, .. } = event.detail {
                return code;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Standard state transitions
// ---------------------------------------------------------------------------

/// The standard command chain walks STANDBY → DISABLED → ENABLED →
/// DISABLED → STANDBY → OFFLINE, publishing a summaryState event at each
/// step, and the component exits on exit_control.
#[tokio::test]
async fn standard_state_transitions() {
    let mut harness = Harness::new(1);

    assert_eq!(harness.next_state().await, SummaryState::Standby);

    harness.remote.start("default").await.expect("start");
    assert_eq!(harness.next_state().await, SummaryState::Disabled);

    harness.remote.enable().await.expect("enable");
    assert_eq!(harness.next_state().await, SummaryState::Enabled);

    harness.remote.disable().await.expect("disable");
    assert_eq!(harness.next_state().await, SummaryState::Disabled);

    harness.remote.standby().await.expect("standby");
    assert_eq!(harness.next_state().await, SummaryState::Standby);

    harness.remote.exit_control().await.expect("exit_control");
    assert_eq!(harness.next_state().await, SummaryState::Offline);

    timeout(STD_TIMEOUT, harness.handle)
        .await
        .expect("component should exit after exit_control")
        .expect("component task should not panic");
}

#[tokio::test]
async fn commands_rejected_in_wrong_state() {
    let mut harness = Harness::new(1);
    assert_eq!(harness.next_state().await, SummaryState::Standby);

    assert_matches!(
        harness.remote.enable().await,
        Err(AckError::NotAllowed {
            state: SummaryState::Standby,
            ..
        })
    );
    assert_matches!(
        harness.remote.disable().await,
        Err(AckError::NotAllowed { .. })
    );

    // The rejection left the component usable.
    harness.remote.start("default").await.expect("start");
    assert_eq!(harness.next_state().await, SummaryState::Disabled);
}

#[tokio::test]
async fn start_with_unknown_profile_fails_and_state_holds() {
    let mut harness = Harness::new(1);
    assert_eq!(harness.next_state().await, SummaryState::Standby);

    assert_matches!(
        harness.remote.start("no-such-profile").await,
        Err(AckError::Failed { .. })
    );

    // Still in STANDBY: a proper start succeeds.
    harness.remote.start("default").await.expect("start");
    assert_eq!(harness.next_state().await, SummaryState::Disabled);
}

// ---------------------------------------------------------------------------
// Telemetry publishing
// ---------------------------------------------------------------------------

/// Enabled in simulation mode, the component publishes the full topic set
/// with the values of the simulated station's capture.
#[tokio::test]
async fn telemetry_published_while_enabled() {
    let mut harness = Harness::new(1);
    assert_eq!(harness.next_state().await, SummaryState::Standby);

    let mut telemetry = harness.bus.subscribe_telemetry();

    harness.remote.start("default").await.expect("start");
    harness.remote.enable().await.expect("enable");
    assert_eq!(harness.next_state().await, SummaryState::Disabled);
    assert_eq!(harness.next_state().await, SummaryState::Enabled);

    let mut seen_weather = false;
    let mut seen_wind_speed = false;
    let deadline = tokio::time::Instant::now() + LONG_TIMEOUT;
    while !(seen_weather && seen_wind_speed) {
        let frame = tokio::time::timeout_at(deadline, telemetry.recv())
            .await
            .expect("timed out waiting for telemetry")
            .expect("telemetry stream closed");
        match frame {
            TelemetryFrame::Weather(weather) => {
                assert!((weather.ambient_temp - 22.15).abs() < 1e-9);
                assert!((weather.humidity - 59.0).abs() < 1e-9);
                assert!((weather.pressure - 1002.35).abs() < 1e-9);
                seen_weather = true;
            }
            TelemetryFrame::WindSpeed(wind) => {
                assert!(wind.value >= 0.0);
                seen_wind_speed = true;
            }
            _ => {}
        }
    }

    harness.remote.disable().await.expect("disable");
    assert_eq!(harness.next_state().await, SummaryState::Disabled);
}

// ---------------------------------------------------------------------------
// Fault handling
// ---------------------------------------------------------------------------

/// With a real (non-simulated) controller and no station dialing in, the
/// telemetry loop times out, the component publishes errorCode 7801 and
/// goes to FAULT, and standby recovers it.
#[tokio::test]
async fn telemetry_timeout_faults_and_standby_recovers() {
    let mut harness = Harness::new(0);
    assert_eq!(harness.next_state().await, SummaryState::Standby);

    harness.remote.start("default").await.expect("start");
    harness.remote.enable().await.expect("enable");
    assert_eq!(harness.next_state().await, SummaryState::Disabled);
    assert_eq!(harness.next_state().await, SummaryState::Enabled);

    // No station connects; the 1 s acquisition timeout fires.
    assert_eq!(
        harness.next_error_code().await,
        wst_core::error_codes::TELEMETRY_LOOP_ERROR
    );
    assert_eq!(harness.next_state().await, SummaryState::Fault);

    harness.remote.standby().await.expect("standby from FAULT");
    assert_eq!(harness.next_state().await, SummaryState::Standby);
}

/// When the controller cannot bring the station link up, `enable` is acked
/// as failed and the component publishes errorCode 7802 and goes to FAULT.
#[tokio::test]
async fn controller_start_failure_faults_with_7802() {
    // Occupy the profile's port so the controller's bind fails.
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();

    let mut harness = Harness::with_profile(
        0,
        StationConfig {
            kind: ControllerKind::Aws310,
            host: "127.0.0.1".into(),
            port,
            buffer_size: 16384,
            timeout_secs: 1,
        },
    );
    assert_eq!(harness.next_state().await, SummaryState::Standby);

    harness.remote.start("default").await.expect("start");
    assert_eq!(harness.next_state().await, SummaryState::Disabled);

    assert_matches!(
        harness.remote.enable().await,
        Err(AckError::Failed { .. })
    );
    assert_eq!(
        harness.next_error_code().await,
        wst_core::error_codes::CONTROLLER_START_ERROR
    );
    assert_eq!(harness.next_state().await, SummaryState::Fault);

    harness.remote.standby().await.expect("standby from FAULT");
    assert_eq!(harness.next_state().await, SummaryState::Standby);
}

// ---------------------------------------------------------------------------
// Heartbeat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn heartbeat_published_in_standby() {
    let mut harness = Harness::new(1);
    assert_eq!(harness.next_state().await, SummaryState::Standby);

    let deadline = tokio::time::Instant::now() + LONG_TIMEOUT;
    loop {
        let event = tokio::time::timeout_at(deadline, harness.events.recv())
            .await
            .expect("timed out waiting for a heartbeat")
            .expect("event bus closed");
        if matches!(event.detail, EventDetail::Heartbeat) {
            break;
        }
    }
}

/// The beacon keeps beating while commands execute and states change.
#[tokio::test]
async fn heartbeat_survives_command_activity() {
    let mut harness = Harness::new(1);
    assert_eq!(harness.next_state().await, SummaryState::Standby);

    harness.remote.start("default").await.expect("start");
    harness.remote.enable().await.expect("enable");
    harness.remote.disable().await.expect("disable");

    let mut beats = 0;
    let deadline = tokio::time::Instant::now() + LONG_TIMEOUT;
    while beats < 2 {
        let event = tokio::time::timeout_at(deadline, harness.events.recv())
            .await
            .expect("timed out waiting for a heartbeat")
            .expect("event bus closed");
        if matches!(event.detail, EventDetail::Heartbeat) {
            beats += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Command listener
// ---------------------------------------------------------------------------

/// Send one command line and read back its ack.
async fn ask(
    writer: &mut tokio::net::tcp::OwnedWriteHalf,
    replies: &mut tokio::io::Lines<tokio::io::BufReader<tokio::net::tcp::OwnedReadHalf>>,
    line: &str,
) -> serde_json::Value {
    use tokio::io::AsyncWriteExt;

    writer.write_all(format!("{line}\n").as_bytes()).await.unwrap();
    let reply = timeout(STD_TIMEOUT, replies.next_line())
        .await
        .expect("timed out waiting for an ack")
        .unwrap()
        .expect("connection closed");
    serde_json::from_str(&reply).expect("ack is JSON")
}

/// The JSON-lines listener acks commands and survives malformed input.
#[tokio::test]
async fn command_listener_round_trip() {
    use tokio::io::{AsyncBufReadExt, BufReader};

    let mut harness = Harness::new(1);
    assert_eq!(harness.next_state().await, SummaryState::Standby);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, harness.remote.clone()));

    let socket = tokio::net::TcpStream::connect(addr).await.unwrap();
    let (reader, mut writer) = socket.into_split();
    let mut replies = BufReader::new(reader).lines();

    // Not allowed yet: enable before start.
    let reply = ask(&mut writer, &mut replies, r#"{"command":"enable"}"#).await;
    assert_eq!(reply["ack"], "not_allowed");
    assert_eq!(reply["state"], "STANDBY");

    let reply = ask(
        &mut writer,
        &mut replies,
        r#"{"command":"start","settings":"default"}"#,
    )
    .await;
    assert_eq!(reply["ack"], "complete");

    let reply = ask(&mut writer, &mut replies, r#"{"command":"enable"}"#).await;
    assert_eq!(reply["ack"], "complete");

    // Malformed input is answered, not fatal.
    let reply = ask(&mut writer, &mut replies, "this is not json").await;
    assert_eq!(reply["ack"], "failed");

    let reply = ask(&mut writer, &mut replies, r#"{"command":"disable"}"#).await;
    assert_eq!(reply["ack"], "complete");
}
