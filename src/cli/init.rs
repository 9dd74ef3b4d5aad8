//! `gitask init` — write a starter config file.
//!
//! Creates `.gitask.yaml` in the current directory, pointing `repo_path` at
//! the enclosing git checkout when there is one.

use crate::config::defaults;
use crate::config::parser::CONFIG_FILE_NAME;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Nearest directory at or above `start` that contains `.git`.
fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if dir.join(".git").exists() {
            return Some(dir);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Run the `gitask init` command.
pub fn run_init(output_path: Option<&Path>, force: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let output_file = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.join(CONFIG_FILE_NAME));

    if output_file.exists() && !force {
        println!(
            "{} A config file already exists at {}",
            "⚠".yellow(),
            output_file.display()
        );
        println!("  Use --force to overwrite it, or edit it directly.");
        return Ok(());
    }

    let repo = find_git_root(&cwd).unwrap_or_else(|| cwd.clone());
    let yaml = defaults::starter_config(&repo.display().to_string());

    if let Some(parent) = output_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(&output_file, yaml)
        .with_context(|| format!("Failed to write config file: {}", output_file.display()))?;

    println!();
    println!(
        "  {} Created {}",
        "✓".green().bold(),
        output_file.display().to_string().cyan()
    );
    println!("  Repo: {}", repo.display());
    println!();
    println!("  Next steps:");
    println!("    1. Set {} in the file", "service.application_id".bold());
    println!("    2. Export your credentials (or switch auth to federated)");
    println!("    3. {}", "gitask ask \"what branch am I on?\"".bold());
    println!();

    Ok(())
}
