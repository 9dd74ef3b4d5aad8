//! Types for the execution approval flow.

use crate::pipeline::extract::UntrustedCommand;
use std::path::PathBuf;

/// A command waiting for a go/no-go before it runs.
#[derive(Debug, Clone)]
pub struct ApprovalRequest {
    pub command: UntrustedCommand,
    /// Where the command will run
    pub working_dir: PathBuf,
    /// The question that produced the command
    pub question: String,
}

/// Response from the reviewer.
#[derive(Debug, Clone)]
pub struct ApprovalResponse {
    pub approved: bool,
    /// Who approved it (e.g., "terminal", "auto")
    pub approved_by: Option<String>,
}
