//! # Infrastructure Layer
//!
//! Concrete implementations of the domain traits: the model runtime client,
//! filesystem tools, the trash and logging setup.

pub mod llm;
pub mod logging;
pub mod tools;
pub mod trash;
