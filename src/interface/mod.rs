//! # Interface Layer
//!
//! Front ends (console, TCP server) and the slash-command handlers they share.

pub mod commands;
pub mod console;
pub mod server;
