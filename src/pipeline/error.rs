//! Error taxonomy for a pipeline run.
//!
//! Any of these halts the run. A command that exits non-zero is *not* an
//! error: the executor turns it into text and the summary explains it.

use std::fmt;
use thiserror::Error;

/// Which chat call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStage {
    /// The request that asks for a command.
    Initial,
    /// The request that asks for a summary of the execution result.
    FollowUp,
}

impl fmt::Display for ServiceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStage::Initial => write!(f, "chat request"),
            ServiceStage::FollowUp => write!(f, "follow-up request"),
        }
    }
}

/// The AI response did not contain a usable command block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("no command block found in the response")]
    NoCommandBlock,
    #[error("the command block is empty")]
    EmptyCommand,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("authentication failed during {step}: {detail}")]
    Authentication { step: String, detail: String },

    #[error("{stage} failed: {detail}")]
    ServiceCall { stage: ServiceStage, detail: String },

    #[error("{source}\n\nThe service replied:\n{response}")]
    Extraction {
        #[source]
        source: ExtractionError,
        /// The AI response, clipped for display.
        response: String,
    },

    #[error("command was not approved for execution")]
    Declined,

    #[error("approval prompt failed: {0}")]
    Approval(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn authentication(step: impl Into<String>, detail: impl fmt::Display) -> Self {
        PipelineError::Authentication {
            step: step.into(),
            detail: detail.to_string(),
        }
    }

    pub fn service_call(stage: ServiceStage, detail: impl fmt::Display) -> Self {
        PipelineError::ServiceCall {
            stage,
            detail: detail.to_string(),
        }
    }
}
