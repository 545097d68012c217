//! # Application Layer
//!
//! Core logic of the agent action protocol: parsing model output, the approval gate,
//! executing approved batches and routing operator input.

pub mod approval;
pub mod executor;
pub mod operations;
pub mod parsing;
pub mod router;
pub mod state;
