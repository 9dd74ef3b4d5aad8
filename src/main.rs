//! gitask — ask a git question, run the answer, read the summary.
//!
//! Quick start:
//!   gitask init                              # write .gitask.yaml
//!   gitask ask "add a hello world script"    # ask, run, summarize
//!   gitask check                             # validate the config
//!
//! For more info: gitask --help

use clap::{Parser, Subcommand};
use colored::Colorize;
use gitask::cli;
use gitask::config;
use std::path::PathBuf;

/// gitask — turn a git question into commands, run them, and summarize.
///
/// The commands come from an AI service and run unsandboxed in your
/// repository. Use --confirm to review each one first.
#[derive(Parser)]
#[command(
    name = "gitask",
    version,
    about = "Ask an AI service for git commands, run them, get a summary",
    long_about = "gitask sends your question to a conversational AI service, runs the\n\
                  git/glab commands it answers with in your repository, and asks the\n\
                  service to summarize what happened.\n\n\
                  Quick start:\n  \
                  gitask init                             # create a config\n  \
                  gitask ask \"add a hello world script\"   # ask, run, summarize"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question and run the command the service proposes
    Ask {
        /// The question (words are joined with spaces)
        #[arg(required = true)]
        question: Vec<String>,

        /// Config file to use
        #[arg(short, long, env = "GITASK_CONFIG")]
        config: Option<PathBuf>,

        /// Repository to run commands in (overrides repo_path)
        #[arg(short, long, env = "GITASK_REPO")]
        repo: Option<PathBuf>,

        /// Application identifier (overrides service.application_id)
        #[arg(long, env = "GITASK_APPLICATION_ID")]
        application_id: Option<String>,

        /// Review the command before it runs
        #[arg(long)]
        confirm: bool,

        /// Show the command without running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the command block from an AI response read on stdin
    Extract,

    /// Validate a config file
    Check {
        /// Path to config file
        #[arg(default_value = config::parser::CONFIG_FILE_NAME)]
        config: PathBuf,
    },

    /// Create a starter config file
    Init {
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    // Only show logs at RUST_LOG=debug level to keep output clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gitask=warn".parse().expect("static directive is valid")),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        None => show_status(),

        Some(Commands::Ask {
            question,
            config,
            repo,
            application_id,
            confirm,
            dry_run,
        }) => {
            let options = cli::ask::AskOptions {
                question: question.join(" "),
                config_path: config,
                repo,
                application_id,
                confirm,
                dry_run,
            };
            cli::ask::run_ask(options).await
        }

        Some(Commands::Extract) => cli::extract::run_extract(),

        Some(Commands::Check { config }) => cli::check::run_check(&config),

        Some(Commands::Init { output, force }) => cli::init::run_init(output.as_deref(), force),
    };

    if let Err(e) = result {
        eprintln!();
        eprintln!("  {} {}", "✗".red().bold(), e);
        for cause in e.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }
        eprintln!();
        std::process::exit(1);
    }
}

/// When the user just types `gitask`:
/// - No config? → point at `gitask init`
/// - Has config? → show what it is set up for
fn show_status() -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let Some(path) = config::discover_config(None, &cwd) else {
        println!();
        println!("  {} No config found.", "ℹ".blue());
        println!("  Create one with {}", "gitask init".bold());
        println!();
        return Ok(());
    };

    let config = config::parse_config_file(&path)?;

    println!();
    println!("  {}  {}", "gitask".bold(), "— ready".green());
    println!(
        "  {}",
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".dimmed()
    );
    println!();
    println!("  Repo:   {}", config.repo_path.display().to_string().cyan());
    println!("  App:    {}", config.service.application_id.cyan());
    println!("  Auth:   {}", config.auth.mode_name());
    println!("  File:   {}", path.display().to_string().dimmed());
    println!();
    println!("  {}", "Commands:".dimmed());
    println!(
        "    {}   ask, run, summarize",
        "gitask ask \"...\"".bold()
    );
    println!(
        "    {}     validate your config",
        "gitask check".bold()
    );
    println!();

    Ok(())
}
