//! Sembrar — intent-driven Terraform composition and lifecycle driving.
//!
//! Natural-language or structured requests resolve to typed intents; intents
//! compose Terraform configs on disk; the lifecycle runner drives the
//! Terraform binary over them and reports what happened.

pub mod cli;
pub mod codegen;
pub mod compose;
pub mod core;
pub mod lifecycle;
