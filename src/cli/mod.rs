//! CLI module for pomoclock.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `client`: IPC client for the control socket
//! - `display`: Output formatting and display logic

pub mod client;
pub mod commands;
pub mod display;

pub use client::IpcClient;
pub use commands::{
    Cli, Commands, ConfigCommand, ExportArgs, OverlayCommand, RunArgs, SessionCommand,
    SettingsArgs, Switch,
};
pub use display::Display;
