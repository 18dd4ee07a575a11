//! IPC server for pomoclock.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - One JSON request and one JSON response per connection
//! - Dispatch of every control command to the [`TimerEngine`]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{Mutex, Notify};
use tokio::time::{timeout, Duration};

use crate::types::{IpcRequest, IpcResponse, OverlayAction, OverlayPosition, ResponseData};

use super::timer::TimerEngine;

// ============================================================================
// Constants
// ============================================================================

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// The client closed the connection without sending a request
    #[error("Connection closed by client")]
    ConnectionClosed,

    /// The request is not valid JSON or names an unknown command
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,
}

impl IpcError {
    /// Returns true if the client should be told what went wrong.
    pub fn is_client_error(&self) -> bool {
        matches!(self, IpcError::InvalidRequest(_) | IpcError::RequestTooLarge)
    }
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        tracing::info!(path = %socket_path.display(), "Control socket listening");
        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest, IpcError> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE + 1];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string())),
            Err(_) => return Err(IpcError::Timeout),
        };

        if n == 0 {
            return Err(IpcError::ConnectionClosed);
        }
        if n > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge);
        }

        serde_json::from_slice(&buffer[..n]).map_err(|e| IpcError::InvalidRequest(e.to_string()))
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the [`TimerEngine`].
pub struct RequestHandler {
    /// Shared reference to the timer engine
    engine: Arc<Mutex<TimerEngine>>,
    /// Signalled by the quit command
    shutdown: Arc<Notify>,
}

impl RequestHandler {
    /// Creates a new request handler with the given timer engine.
    pub fn new(engine: Arc<Mutex<TimerEngine>>, shutdown: Arc<Notify>) -> Self {
        Self { engine, shutdown }
    }

    /// Reads one request from `stream`, handles it and writes the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails before a response is sent.
    pub async fn handle_connection(&self, mut stream: UnixStream) -> Result<()> {
        let response = match IpcServer::receive_request(&mut stream).await {
            Ok(request) => {
                tracing::debug!(?request, "IPC request received");
                self.handle(request).await
            }
            Err(e) if e.is_client_error() => IpcResponse::error(e.to_string()),
            Err(e) => return Err(e.into()),
        };
        IpcServer::send_response(&mut stream, &response).await
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        let result = match request {
            IpcRequest::Start => engine.start().map(|started| {
                if started {
                    "Timer started"
                } else {
                    "Timer is already running"
                }
                .to_string()
            }),
            IpcRequest::Pause => engine.pause().map(|paused| {
                if paused {
                    "Timer paused"
                } else {
                    "Timer is already paused"
                }
                .to_string()
            }),
            IpcRequest::Reset => engine.reset().map(|()| "Timer reset".to_string()),
            IpcRequest::Status => Ok("Status retrieved".to_string()),
            IpcRequest::Settings {
                work_minutes,
                break_minutes,
            } => engine
                .set_durations(work_minutes, break_minutes)
                .map(|()| "Settings saved".to_string()),
            IpcRequest::Palette => engine.toggle_palette().map(|dark| {
                if dark {
                    "Dark palette enabled"
                } else {
                    "Light palette enabled"
                }
                .to_string()
            }),
            IpcRequest::AutoLock { enabled } => engine.set_auto_lock(enabled).map(|()| {
                if enabled {
                    "Auto-lock enabled"
                } else {
                    "Auto-lock disabled"
                }
                .to_string()
            }),
            IpcRequest::Volume { percent } => engine
                .set_volume(percent)
                .map(|()| format!("Volume set to {}%", percent)),
            IpcRequest::Overlay { action } => Self::apply_overlay(&mut engine, action),
            IpcRequest::Session { label } => {
                engine.set_session_theme(&label).map(|theme| match theme {
                    Some(theme) => format!("Session theme saved: {}", theme),
                    None => "Session theme cleared".to_string(),
                })
            }
            IpcRequest::Quit => {
                self.shutdown.notify_one();
                Ok("Shutting down".to_string())
            }
        };

        match result {
            Ok(message) => IpcResponse::success(
                message,
                Some(ResponseData::from_snapshot(&engine.snapshot())),
            ),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    fn apply_overlay(engine: &mut TimerEngine, action: OverlayAction) -> Result<String> {
        match action {
            OverlayAction::Toggle => engine.toggle_overlay().map(|visible| {
                if visible {
                    "Overlay shown"
                } else {
                    "Overlay hidden"
                }
                .to_string()
            }),
            OverlayAction::Reset => engine
                .reset_overlay_position()
                .map(|()| "Overlay moved to its default position".to_string()),
            OverlayAction::Move { x, y } => engine
                .move_overlay(OverlayPosition { x, y })
                .map(|()| format!("Overlay moved to ({}, {})", x, y)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
