//! JSON-lines TCP command listener.
//!
//! Each line received is one tagged command object, e.g.
//! `{"command":"start","settings":"site"}`; each reply is one tagged ack,
//! `{"ack":"complete"}` or `{"ack":"failed","reason":...}`. Malformed lines
//! are answered and logged, never fatal to the connection. Multiple consoles
//! may be connected at once; the CSC serializes their commands.

use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use wst_core::Command;

use crate::command::Remote;

/// Accept console connections until the process exits.
pub async fn serve(listener: TcpListener, remote: Remote) {
    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                tracing::info!(%peer, "Console connected");
                tokio::spawn(handle_connection(socket, remote.clone()));
            }
            Err(e) => {
                tracing::error!(error = %e, "Accept failed");
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            }
        }
    }
}

/// Serve one console: a command per line, an ack per command.
async fn handle_connection(socket: TcpStream, remote: Remote) {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<Command>(line) {
            Ok(command) => {
                tracing::debug!(command = command.name(), "Console command");
                match remote.send(command).await {
                    Ok(()) => json!({"ack": "complete"}),
                    Err(e) => serde_json::to_value(&e)
                        .unwrap_or_else(|_| json!({"ack": "failed", "reason": "internal"})),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, raw = line, "Malformed console command");
                json!({"ack": "failed", "reason": format!("Malformed command: {e}")})
            }
        };

        let mut out = reply.to_string();
        out.push('\n');
        if writer.write_all(out.as_bytes()).await.is_err() {
            break;
        }
    }

    tracing::info!("Console disconnected");
}
