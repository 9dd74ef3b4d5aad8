//! gitask — ask an AI service for git commands, run them, get a summary.
//!
//! This library exposes the pipeline and its collaborators for integration
//! testing and programmatic use. The binary entrypoint is in `main.rs`.

pub mod approval;
pub mod auth;
pub mod chat;
pub mod cli;
pub mod config;
pub mod pipeline;
