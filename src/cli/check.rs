//! `gitask check` — validate a config file.

use crate::config::{self, AuthConfig};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

/// Run the `gitask check` command.
pub fn run_check(config_path: &Path) -> Result<()> {
    let config = config::parse_config_file(config_path)?;

    println!();
    println!("  {} Config is valid!", "✓".green().bold());
    println!("  Repo:        {}", config.repo_path.display().to_string().cyan());
    println!("  Endpoint:    {}", config.service.endpoint);
    println!("  Application: {}", config.service.application_id);
    println!("  Auth:        {}", config.auth.mode_name());
    println!("  Output cap:  {} chars", config.max_output_chars);
    if !config.extra_path.is_empty() {
        let joined: Vec<String> = config
            .extra_path
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        println!("  Extra PATH:  {}", joined.join(", "));
    }

    let warnings = lint(&config);
    println!();
    if warnings.is_empty() {
        println!("  {} No issues found.", "✓".green());
    } else {
        for warning in &warnings {
            println!("  {} {}", "⚠".yellow(), warning);
        }
    }
    println!();

    Ok(())
}

/// Problems that do not make the file invalid but will bite at run time.
pub fn lint(config: &config::Config) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.repo_path.is_dir() {
        warnings.push(format!(
            "repo_path {} is not a directory on this machine",
            config.repo_path.display()
        ));
    } else if !config.repo_path.join(".git").exists() {
        warnings.push(format!(
            "repo_path {} is not a git checkout",
            config.repo_path.display()
        ));
    }

    if config.service.application_id.starts_with("REPLACE_WITH") {
        warnings.push("service.application_id still has the placeholder value".to_string());
    }

    if config.max_output_chars > config::DEFAULT_MAX_OUTPUT_CHARS {
        warnings.push(format!(
            "max_output_chars {} leaves little room under the service's ~7000 character input limit",
            config.max_output_chars
        ));
    }

    match &config.auth {
        AuthConfig::Static {
            access_key_id_env,
            secret_access_key_env,
            session_token_env,
        } => {
            for var in [access_key_id_env, secret_access_key_env, session_token_env] {
                if std::env::var_os(var).is_none() {
                    warnings.push(format!("{} is not set in this shell", var));
                }
            }
        }
        AuthConfig::Federated(federated) => {
            if std::env::var_os(&federated.password_env).is_none() {
                warnings.push(format!(
                    "{} (auth.password_env) is not set in this shell",
                    federated.password_env
                ));
            }
        }
    }

    if !config.confirm_before_execute {
        warnings.push(
            "commands from the service run without review (confirm_before_execute: false)"
                .to_string(),
        );
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lint_flags_placeholder_and_missing_repo() {
        let yaml = r#"
repo_path: /definitely/not/here
service:
  endpoint: https://chat.example.com
  application_id: REPLACE_WITH_APPLICATION_ID
"#;
        let config = config::parse_config_str(yaml).unwrap();
        let warnings = lint(&config);
        assert!(warnings.iter().any(|w| w.contains("not a directory")));
        assert!(warnings.iter().any(|w| w.contains("placeholder")));
    }

    #[test]
    fn test_lint_flags_non_git_dir() {
        let tmp = TempDir::new().unwrap();
        let yaml = format!(
            "repo_path: {}\nconfirm_before_execute: true\nservice:\n  endpoint: https://chat.example.com\n  application_id: app\n",
            tmp.path().display()
        );
        let config = config::parse_config_str(&yaml).unwrap();
        let warnings = lint(&config);
        assert!(warnings.iter().any(|w| w.contains("not a git checkout")));
        assert!(!warnings.iter().any(|w| w.contains("without review")));
    }
}
