pub mod terminal;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;

pub use terminal::{AutoApproval, AutoDeny, TerminalApproval};
pub use types::{ApprovalRequest, ApprovalResponse};

/// Decides whether an extracted command may run.
/// Implementations can prompt on the terminal, approve everything, etc.
#[async_trait]
pub trait ApprovalHandler {
    async fn request_approval(&self, request: &ApprovalRequest) -> Result<ApprovalResponse>;
}
