//! Controller for the Vaisala AWS310 weather station.
//!
//! The AWS310 is the dialing side: the controller binds a TCP listener on
//! the configured address and the station connects to it, then pushes one
//! ASCII frame per reporting interval. Frames are delimited by `(` and `)`
//! (see [`crate::wire`]).
//!
//! Each acquisition is bounded by the configured timeout, covering both the
//! initial accept and the frame read. A disconnect is recoverable: the
//! controller drops the dead connection and accepts a redial on the next
//! acquisition.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{AsyncReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use wst_core::config::StationConfig;
use wst_core::topics::WeatherReport;

use crate::controller::StationController;
use crate::error::StationError;
use crate::wire;

pub struct Aws310Controller {
    config: StationConfig,
    listener: Option<TcpListener>,
    stream: Option<BufReader<TcpStream>>,
    last_error: String,
}

impl Aws310Controller {
    pub fn new(config: StationConfig) -> Self {
        Self {
            config,
            listener: None,
            stream: None,
            last_error: String::new(),
        }
    }

    /// Address the listener is bound to, once started.
    ///
    /// Useful when the profile binds port 0 (tests).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Accept the station connection if none is live.
    async fn ensure_connected(&mut self) -> Result<(), StationError> {
        if self.stream.is_some() {
            return Ok(());
        }
        let listener = self.listener.as_ref().ok_or(StationError::NotStarted)?;
        let (socket, peer) = listener.accept().await?;
        tracing::info!(%peer, "Station connected");
        self.stream = Some(BufReader::new(socket));
        Ok(())
    }

    /// Read one complete frame payload (the text between `(` and `)`).
    async fn read_frame(&mut self) -> Result<String, StationError> {
        self.ensure_connected().await?;
        // Taken out so error paths can drop the dead connection.
        let mut stream = self.stream.take().ok_or(StationError::NotStarted)?;

        let mut payload = String::new();
        let mut in_frame = false;

        loop {
            let byte = match stream.read_u8().await {
                Ok(b) => b,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    tracing::warn!("Station closed the connection");
                    self.last_error = "Station closed the connection".to_string();
                    return Err(StationError::Disconnected);
                }
                Err(e) => return Err(StationError::Io(e)),
            };

            match byte {
                b'(' if !in_frame => in_frame = true,
                b')' if in_frame => {
                    self.stream = Some(stream);
                    return Ok(payload);
                }
                b'\r' | b'\n' => {}
                _ if in_frame => {
                    if payload.len() >= self.config.buffer_size {
                        self.last_error = payload;
                        return Err(StationError::Oversized {
                            limit: self.config.buffer_size,
                        });
                    }
                    payload.push(byte as char);
                }
                // Bytes outside a frame (checksum of the previous frame,
                // keep-alives) are discarded.
                _ => {}
            }
        }
    }
}

#[async_trait]
impl StationController for Aws310Controller {
    fn kind(&self) -> &'static str {
        "aws310"
    }

    async fn start(&mut self) -> Result<(), StationError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "Listening for the station");
        self.listener = Some(listener);
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), StationError> {
        self.stream = None;
        self.listener = None;
        Ok(())
    }

    async fn acquire(&mut self) -> Result<WeatherReport, StationError> {
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let payload = tokio::time::timeout(timeout, self.read_frame())
            .await
            .map_err(|_| StationError::Timeout(timeout))??;

        let records = wire::parse_frame(&payload).map_err(|e| {
            self.last_error = format!("Could not parse frame: [START]{}[END]", e.raw);
            StationError::Parse { raw: e.raw }
        })?;

        Ok(wire::build_report(&records, Utc::now()))
    }

    fn error_report(&self) -> &str {
        &self.last_error
    }

    fn clear_error(&mut self) {
        self.last_error.clear();
    }
}
