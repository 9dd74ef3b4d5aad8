//! Core configuration types for gitask.
//!
//! Everything that used to be a process-wide constant (repository path,
//! service identifiers, endpoints) lives here and is passed explicitly into
//! each component.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default cap on captured command output. The chat service rejects inputs
/// over roughly 7,000 characters, and the follow-up prompt needs room for
/// the question, the command and its own instructions.
pub const DEFAULT_MAX_OUTPUT_CHARS: usize = 6740;

/// Default environment variable holding the federated login password.
pub const DEFAULT_PASSWORD_ENV: &str = "GITASK_PASSWORD";

/// Fully validated configuration for one gitask installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Local checkout the generated commands run against.
    pub repo_path: PathBuf,

    /// Directories appended to `PATH` for the command's shell only
    /// (e.g. where `glab` is installed).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_path: Vec<PathBuf>,

    /// Maximum number of characters of command output forwarded to the
    /// summary request.
    pub max_output_chars: usize,

    /// Ask on the terminal before running the extracted command.
    pub confirm_before_execute: bool,

    /// Conversational service settings.
    pub service: ServiceConfig,

    /// How delegated credentials are obtained.
    pub auth: AuthConfig,
}

/// Where the conversational service lives and which application to talk to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL, e.g. `https://qbusiness.us-east-1.amazonaws.com`
    pub endpoint: String,
    /// Application identifier sent with every chat request.
    pub application_id: String,
}

/// Credential source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AuthConfig {
    /// Credentials are already in the environment.
    Static {
        #[serde(default = "default_access_key_env")]
        access_key_id_env: String,
        #[serde(default = "default_secret_key_env")]
        secret_access_key_env: String,
        #[serde(default = "default_session_token_env")]
        session_token_env: String,
    },
    /// User login, token exchange and role assumption.
    Federated(FederatedAuthConfig),
}

/// Settings for the three-step federated credential chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedAuthConfig {
    /// User pool login endpoint.
    pub identity_endpoint: String,
    /// User pool app client id.
    pub identity_client_id: String,
    pub username: String,
    /// Environment variable the password is read from.
    #[serde(default = "default_password_env")]
    pub password_env: String,

    /// Token exchange endpoint.
    pub token_endpoint: String,
    /// Identity Center application the JWT is exchanged against.
    pub token_client_id: String,

    /// Role assumption endpoint.
    pub role_endpoint: String,
    pub role_arn: String,
    #[serde(default = "default_role_session_name")]
    pub role_session_name: String,
}

impl AuthConfig {
    /// Short name for status output.
    pub fn mode_name(&self) -> &'static str {
        match self {
            AuthConfig::Static { .. } => "static",
            AuthConfig::Federated(_) => "federated",
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig::Static {
            access_key_id_env: default_access_key_env(),
            secret_access_key_env: default_secret_key_env(),
            session_token_env: default_session_token_env(),
        }
    }
}

pub(crate) fn default_access_key_env() -> String {
    "AWS_ACCESS_KEY_ID".to_string()
}

pub(crate) fn default_secret_key_env() -> String {
    "AWS_SECRET_ACCESS_KEY".to_string()
}

pub(crate) fn default_session_token_env() -> String {
    "AWS_SESSION_TOKEN".to_string()
}

pub(crate) fn default_password_env() -> String {
    DEFAULT_PASSWORD_ENV.to_string()
}

pub(crate) fn default_role_session_name() -> String {
    "qapp".to_string()
}
