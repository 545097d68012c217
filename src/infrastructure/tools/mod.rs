//! # Tools Module
//!
//! In-process filesystem tools backing approved actions and slash commands.

pub mod executor;
