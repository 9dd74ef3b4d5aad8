//! YAML config parser for gitask.
//!
//! # Example config file:
//! ```yaml
//! repo_path: /home/me/projects/project1
//! extra_path: /opt/homebrew/bin
//! service:
//!   endpoint: https://qbusiness.us-east-1.amazonaws.com
//!   application_id: 0123abcd
//! auth:
//!   mode: static
//! ```

use crate::config::types::*;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name looked for when walking up from the current directory.
pub const CONFIG_FILE_NAME: &str = ".gitask.yaml";

/// Raw YAML representation before validation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    repo_path: PathBuf,
    #[serde(default)]
    extra_path: Option<StringOrVec>,
    #[serde(default)]
    max_output_chars: Option<usize>,
    #[serde(default)]
    confirm_before_execute: bool,
    service: ServiceConfig,
    #[serde(default)]
    auth: Option<AuthConfig>,
}

/// `extra_path: /opt/bin` and `extra_path: [/opt/bin, /usr/local/bin]` both work.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrVec {
    Single(String),
    Multiple(Vec<String>),
}

impl StringOrVec {
    fn into_vec(self) -> Vec<String> {
        match self {
            StringOrVec::Single(s) => vec![s],
            StringOrVec::Multiple(v) => v,
        }
    }
}

/// Parse a YAML config file from a file path.
pub fn parse_config_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse a YAML config string into a validated Config.
pub fn parse_config_str(yaml: &str) -> Result<Config> {
    let raw: RawConfig = serde_yaml::from_str(yaml).context("Invalid YAML syntax in config file")?;

    if raw.repo_path.as_os_str().is_empty() {
        bail!("Config must have a non-empty 'repo_path'");
    }

    let max_output_chars = raw.max_output_chars.unwrap_or(DEFAULT_MAX_OUTPUT_CHARS);
    if max_output_chars == 0 {
        bail!("'max_output_chars' must be greater than zero");
    }

    validate_service(&raw.service)?;

    let auth = raw.auth.unwrap_or_default();
    if let AuthConfig::Federated(ref federated) = auth {
        validate_federated(federated)?;
    }

    let extra_path = raw
        .extra_path
        .map(|s| s.into_vec())
        .unwrap_or_default()
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .collect();

    Ok(Config {
        repo_path: raw.repo_path,
        extra_path,
        max_output_chars,
        confirm_before_execute: raw.confirm_before_execute,
        service: raw.service,
        auth,
    })
}

fn validate_service(service: &ServiceConfig) -> Result<()> {
    if service.application_id.trim().is_empty() {
        bail!("'service.application_id' must not be empty");
    }
    validate_url("service.endpoint", &service.endpoint)
}

fn validate_federated(auth: &FederatedAuthConfig) -> Result<()> {
    validate_url("auth.identity_endpoint", &auth.identity_endpoint)?;
    validate_url("auth.token_endpoint", &auth.token_endpoint)?;
    validate_url("auth.role_endpoint", &auth.role_endpoint)?;

    for (field, value) in [
        ("auth.identity_client_id", &auth.identity_client_id),
        ("auth.username", &auth.username),
        ("auth.password_env", &auth.password_env),
        ("auth.token_client_id", &auth.token_client_id),
        ("auth.role_arn", &auth.role_arn),
        ("auth.role_session_name", &auth.role_session_name),
    ] {
        if value.trim().is_empty() {
            bail!("'{}' must not be empty", field);
        }
    }
    Ok(())
}

fn validate_url(field: &str, value: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(value)
        .with_context(|| format!("'{}' is not a valid URL: {}", field, value))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("'{}' must use http or https, got '{}'", field, other),
    }
}

/// Find a config file: explicit path first, then `.gitask.yaml` walking up
/// from `start`, then `~/.gitask/config.yaml`.
pub fn discover_config(explicit: Option<&Path>, start: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }

    let global = dirs::home_dir()?.join(".gitask").join("config.yaml");
    global.exists().then_some(global)
}
