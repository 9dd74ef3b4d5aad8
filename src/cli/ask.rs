//! `gitask ask` — the main command.
//!
//! 1. Load the config (and apply flag/env overrides)
//! 2. Build the credential provider, chat client and approval handler
//! 3. Run the pipeline, printing each step
//! 4. Print the command, its output and the summary

use crate::approval::{ApprovalHandler, AutoApproval, TerminalApproval};
use crate::auth;
use crate::chat::HttpChatService;
use crate::cli::load_config;
use crate::pipeline::{Pipeline, PipelineEvent, PipelineReport, PipelineSettings};
use anyhow::{bail, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

/// Options for the `gitask ask` command.
#[derive(Debug, Default)]
pub struct AskOptions {
    pub question: String,
    /// Explicit config file (default: discovered)
    pub config_path: Option<PathBuf>,
    /// Overrides `repo_path`
    pub repo: Option<PathBuf>,
    /// Overrides `service.application_id`
    pub application_id: Option<String>,
    /// Ask before running the command
    pub confirm: bool,
    /// Only show the command
    pub dry_run: bool,
}

/// Run the `gitask ask` command.
pub async fn run_ask(options: AskOptions) -> Result<()> {
    let question = options.question.trim();
    if question.is_empty() {
        bail!("Ask a question, e.g. gitask ask \"add a hello world script\"");
    }

    let (config_path, mut config) = load_config(options.config_path.as_deref())?;
    if let Some(repo) = options.repo {
        config.repo_path = repo;
    }
    if let Some(app_id) = options.application_id {
        config.service.application_id = app_id;
    }
    if !config.repo_path.is_dir() {
        bail!(
            "Repository path {} does not exist or is not a directory",
            config.repo_path.display()
        );
    }

    println!();
    println!(
        "  {} gitask v{}",
        "»".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "  Config:  {}",
        config_path.display().to_string().dimmed()
    );
    println!("  Repo:    {}", config.repo_path.display().to_string().cyan());
    println!("  App:     {}", config.service.application_id.cyan());
    println!();

    let credentials = auth::provider_from_config(&config.auth)?;
    let chat = Arc::new(HttpChatService::new(
        config.service.endpoint.clone(),
        config.service.application_id.clone(),
    ));
    let approval: Arc<dyn ApprovalHandler + Send + Sync> =
        if options.confirm || config.confirm_before_execute {
            Arc::new(TerminalApproval::new())
        } else {
            Arc::new(AutoApproval)
        };

    let mut settings = PipelineSettings::from_config(&config);
    settings.dry_run = options.dry_run;
    let pipeline = Pipeline::new(settings, credentials, chat, approval);

    let mut progress = print_event;
    let report = pipeline.run(question, &mut progress).await?;
    print_report(&report);
    Ok(())
}

fn print_event(event: PipelineEvent<'_>) {
    match event {
        PipelineEvent::Authenticating => step("Authenticating..."),
        PipelineEvent::Asking => step("Asking for a command..."),
        PipelineEvent::CommandExtracted(command) => {
            println!();
            println!("  {}", "Command:".bold());
            println!("{}", code_block(command.as_str()));
        }
        PipelineEvent::Executing => step("Running the command..."),
        PipelineEvent::Executed { outcome, truncated } => {
            if outcome.success {
                println!("  {} Command finished", "✓".green());
            } else {
                println!("  {} Command failed", "✗".red());
            }
            if !outcome.output.trim().is_empty() {
                println!();
                for line in outcome.output.lines() {
                    println!("    {}", line.dimmed());
                }
                println!();
            }
            if truncated {
                println!(
                    "  {} Output was clipped before asking for the summary",
                    "ℹ".blue()
                );
            }
        }
        PipelineEvent::Summarizing => step("Summarizing..."),
    }
}

fn step(message: &str) {
    println!("  {} {}", "▶".cyan(), message);
}

fn print_report(report: &PipelineReport) {
    match &report.summary {
        Some(summary) => {
            println!();
            println!("  {}", "Summary:".bold());
            println!();
            for line in summary.lines() {
                println!("  {}", line);
            }
            println!();
        }
        None => {
            println!();
            println!(
                "  {} Dry run: nothing was executed.",
                "ℹ".blue()
            );
            println!();
        }
    }
}

/// Render a command as a fenced shell block.
pub fn code_block(command: &str) -> String {
    format!("```bash\n{}\n```", command)
}
