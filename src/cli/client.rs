//! IPC client for controlling a running `pomoclock run`.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic
//! - Timeout handling

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::cli::commands::{OverlayCommand, SettingsArgs};
use crate::config;
use crate::types::{IpcRequest, IpcResponse, OverlayAction};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: usize = 65536;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for the control socket.
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
}

impl IpcClient {
    /// Creates a client for the socket in the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be determined.
    pub fn new() -> Result<Self> {
        let socket_path = config::socket_path()?;
        Ok(Self::with_socket_path(socket_path))
    }

    /// Creates a new IPC client with a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &PathBuf {
        &self.socket_path
    }

    pub async fn start(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Start).await
    }

    pub async fn pause(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Pause).await
    }

    pub async fn reset(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Reset).await
    }

    pub async fn status(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Status).await
    }

    /// Sends new phase durations in minutes.
    pub async fn settings(&self, args: &SettingsArgs) -> Result<IpcResponse> {
        self.request(&IpcRequest::Settings {
            work_minutes: args.work,
            break_minutes: args.break_time,
        })
        .await
    }

    pub async fn palette(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Palette).await
    }

    pub async fn auto_lock(&self, enabled: bool) -> Result<IpcResponse> {
        self.request(&IpcRequest::AutoLock { enabled }).await
    }

    pub async fn volume(&self, percent: u32) -> Result<IpcResponse> {
        self.request(&IpcRequest::Volume { percent }).await
    }

    pub async fn overlay(&self, command: &OverlayCommand) -> Result<IpcResponse> {
        let action = match *command {
            OverlayCommand::Toggle => OverlayAction::Toggle,
            OverlayCommand::Reset => OverlayAction::Reset,
            OverlayCommand::Move { x, y } => OverlayAction::Move { x, y },
        };
        self.request(&IpcRequest::Overlay { action }).await
    }

    /// Sets the session theme. An empty label clears it.
    pub async fn session(&self, label: &str) -> Result<IpcResponse> {
        self.request(&IpcRequest::Session {
            label: label.to_string(),
        })
        .await
    }

    pub async fn quit(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Quit).await
    }

    /// Sends a request and turns an error response into an error.
    async fn request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let response = self.send_request_with_retry(request).await?;
        if response.is_error() {
            anyhow::bail!("{}", response.message);
        }
        Ok(response)
    }

    /// Sends a request with retry logic.
    ///
    /// Only transport failures are retried; an error response is returned as is.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match self.send_request(request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!("Request failed (attempt {}/{}): {:#}", attempt, MAX_RETRIES, e);
                    last_error = Some(e);

                    if attempt < MAX_RETRIES {
                        let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Request was not sent")))
    }

    /// Sends a single request.
    async fn send_request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut stream = timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("Connection timed out")?
            .with_context(|| {
                format!(
                    "Cannot connect to {}. Is `pomoclock run` running?",
                    self.socket_path.display()
                )
            })?;

        let request_json =
            serde_json::to_string(request).context("Failed to serialize request")?;

        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.write_all(request_json.as_bytes()),
        )
        .await
        .context("Write timed out")?
        .context("Failed to send request")?;

        timeout(Duration::from_secs(IO_TIMEOUT_SECS), stream.flush())
            .await
            .context("Flush timed out")?
            .context("Failed to flush request")?;

        // Shutdown write side to signal end of request
        stream
            .shutdown()
            .await
            .context("Failed to shut down write side")?;

        let mut buffer = Vec::new();
        let n = timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            (&mut stream)
                .take(MAX_RESPONSE_SIZE as u64)
                .read_to_end(&mut buffer),
        )
        .await
        .context("Read timed out")?
        .context("Failed to receive response")?;

        if n == 0 {
            anyhow::bail!("No response from the timer");
        }

        serde_json::from_slice(&buffer).context("Failed to parse response")
    }
}

// ============================================================================
// Tests
// ============================================================================
