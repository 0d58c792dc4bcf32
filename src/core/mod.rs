//! Core: intent resolution, configuration, mutation, and orchestration.

pub mod intent;
pub mod mutator;
pub mod orchestrator;
pub mod settings;
pub mod types;
