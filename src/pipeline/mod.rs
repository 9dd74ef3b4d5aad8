//! The question → command → execution → summary pipeline.
//!
//! Steps run strictly in order and the first error stops the run:
//! 1. Build the initial prompt
//! 2. Get credentials
//! 3. Ask the chat service for a command
//! 4. Extract the command block
//! 5. Ask the approval handler
//! 6. Run the command in the repository
//! 7. Clip the output
//! 8. Ask the chat service for a summary

pub mod error;
pub mod executor;
pub mod extract;
pub mod prompts;
pub mod truncate;

use crate::approval::{ApprovalHandler, ApprovalRequest};
use crate::auth::CredentialProvider;
use crate::chat::ChatService;
use crate::config::Config;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Instrument;

pub use error::{ExtractionError, PipelineError, ServiceStage};
pub use executor::{ExecutionOutcome, ExecutorConfig, EXECUTION_ERROR_MARKER};
pub use extract::{extract_command, UntrustedCommand};
pub use truncate::truncate_output;

/// Approximate input ceiling of the chat service.
const SERVICE_INPUT_CEILING: usize = 7000;

/// How much of an unparseable response to show the user.
const RESPONSE_PREVIEW_CHARS: usize = 800;

/// Per-run settings taken from [`Config`].
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub repo_path: PathBuf,
    pub extra_path: Vec<PathBuf>,
    pub max_output_chars: usize,
    /// Stop after extraction without running anything.
    pub dry_run: bool,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            repo_path: config.repo_path.clone(),
            extra_path: config.extra_path.clone(),
            max_output_chars: config.max_output_chars,
            dry_run: false,
        }
    }
}

/// Progress notifications, one per step.
#[derive(Debug)]
pub enum PipelineEvent<'a> {
    Authenticating,
    Asking,
    CommandExtracted(&'a UntrustedCommand),
    Executing,
    Executed {
        outcome: &'a ExecutionOutcome,
        truncated: bool,
    },
    Summarizing,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub run_id: String,
    pub question: String,
    pub command: UntrustedCommand,
    /// `None` on a dry run.
    pub outcome: Option<ExecutionOutcome>,
    /// The (possibly clipped) output embedded in the follow-up prompt.
    pub forwarded_output: Option<String>,
    pub summary: Option<String>,
}

pub struct Pipeline {
    settings: PipelineSettings,
    credentials: Arc<dyn CredentialProvider + Send + Sync>,
    chat: Arc<dyn ChatService + Send + Sync>,
    approval: Arc<dyn ApprovalHandler + Send + Sync>,
}

impl Pipeline {
    pub fn new(
        settings: PipelineSettings,
        credentials: Arc<dyn CredentialProvider + Send + Sync>,
        chat: Arc<dyn ChatService + Send + Sync>,
        approval: Arc<dyn ApprovalHandler + Send + Sync>,
    ) -> Self {
        Self {
            settings,
            credentials,
            chat,
            approval,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run the whole pipeline for one question.
    pub async fn run(
        &self,
        question: &str,
        progress: &mut dyn FnMut(PipelineEvent<'_>),
    ) -> Result<PipelineReport, PipelineError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let short_id = &run_id[..8];
        let span = tracing::info_span!("run", run_id = %short_id);
        self.run_inner(run_id.clone(), question, progress)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &self,
        run_id: String,
        question: &str,
        progress: &mut dyn FnMut(PipelineEvent<'_>),
    ) -> Result<PipelineReport, PipelineError> {
        let prompt = prompts::initial_prompt(&self.settings.repo_path, question);
        tracing::debug!("Initial prompt is {} chars", prompt.chars().count());

        progress(PipelineEvent::Authenticating);
        let credentials = self.credentials.credentials().await?;
        if credentials.is_expired(Utc::now()) {
            return Err(PipelineError::authentication(
                "credential check",
                "provider returned expired credentials",
            ));
        }
        tracing::info!("Obtained credentials for {}", credentials.access_key_id);

        progress(PipelineEvent::Asking);
        let response = self
            .chat
            .chat_sync(&credentials, &prompt)
            .await
            .map_err(|e| PipelineError::service_call(ServiceStage::Initial, format!("{:#}", e)))?;
        tracing::debug!("Service replied with {} chars", response.chars().count());

        let command = extract_command(&response).map_err(|source| PipelineError::Extraction {
            source,
            response: truncate_output(&response, RESPONSE_PREVIEW_CHARS).to_string(),
        })?;
        tracing::info!("Extracted a {}-line command", command.line_count());
        progress(PipelineEvent::CommandExtracted(&command));

        if self.settings.dry_run {
            return Ok(PipelineReport {
                run_id,
                question: question.to_string(),
                command,
                outcome: None,
                forwarded_output: None,
                summary: None,
            });
        }

        let approval = self
            .approval
            .request_approval(&ApprovalRequest {
                command: command.clone(),
                working_dir: self.settings.repo_path.clone(),
                question: question.to_string(),
            })
            .await
            .map_err(|e| PipelineError::Approval(format!("{:#}", e)))?;
        if !approval.approved {
            tracing::info!("Command was not approved");
            return Err(PipelineError::Declined);
        }

        progress(PipelineEvent::Executing);
        let outcome = self.execute(&command).await;
        let forwarded = truncate_output(&outcome.output, self.settings.max_output_chars).to_string();
        let truncated = forwarded.len() < outcome.output.len();
        if truncated {
            tracing::info!(
                "Clipped command output to {} chars",
                self.settings.max_output_chars
            );
        }
        progress(PipelineEvent::Executed {
            outcome: &outcome,
            truncated,
        });

        progress(PipelineEvent::Summarizing);
        let follow_up = prompts::follow_up_prompt(question, &command, &forwarded, outcome.success);
        let follow_up_len = follow_up.chars().count();
        if follow_up_len > SERVICE_INPUT_CEILING {
            tracing::warn!(
                "Follow-up prompt is {} chars, above the service's ~{} limit",
                follow_up_len,
                SERVICE_INPUT_CEILING
            );
        }
        let summary = self
            .chat
            .chat_sync(&credentials, &follow_up)
            .await
            .map_err(|e| PipelineError::service_call(ServiceStage::FollowUp, format!("{:#}", e)))?;

        Ok(PipelineReport {
            run_id,
            question: question.to_string(),
            command,
            outcome: Some(outcome),
            forwarded_output: Some(forwarded),
            summary: Some(summary),
        })
    }

    /// Run the command on a blocking thread.
    async fn execute(&self, command: &UntrustedCommand) -> ExecutionOutcome {
        let config = ExecutorConfig::new(&self.settings.repo_path)
            .with_extra_path(self.settings.extra_path.clone());
        let command = command.clone();

        match tokio::task::spawn_blocking(move || executor::execute_command(&config, &command))
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => ExecutionOutcome {
                output: format!("{}: executor task failed: {}", EXECUTION_ERROR_MARKER, e),
                success: false,
                exit_code: None,
            },
        }
    }
}
