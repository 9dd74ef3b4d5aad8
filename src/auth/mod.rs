pub mod federated;
pub mod token;
pub mod types;

use crate::config::AuthConfig;
use crate::pipeline::error::PipelineError;
use async_trait::async_trait;
use std::sync::Arc;

pub use federated::FederatedCredentials;
pub use types::Credentials;

/// Source of delegated credentials.
/// Implementations can log in interactively, read the environment, etc.
#[async_trait]
pub trait CredentialProvider {
    async fn credentials(&self) -> Result<Credentials, PipelineError>;
}

/// Credentials that are already exported in the environment.
pub struct StaticCredentials {
    access_key_id_env: String,
    secret_access_key_env: String,
    session_token_env: String,
}

impl StaticCredentials {
    pub fn new(
        access_key_id_env: impl Into<String>,
        secret_access_key_env: impl Into<String>,
        session_token_env: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id_env: access_key_id_env.into(),
            secret_access_key_env: secret_access_key_env.into(),
            session_token_env: session_token_env.into(),
        }
    }

    fn read(var: &str) -> Result<String, PipelineError> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(PipelineError::authentication(
                "reading static credentials",
                format!("{} is not set", var),
            )),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn credentials(&self) -> Result<Credentials, PipelineError> {
        Ok(Credentials {
            access_key_id: Self::read(&self.access_key_id_env)?,
            secret_access_key: Self::read(&self.secret_access_key_env)?,
            session_token: Self::read(&self.session_token_env)?,
            expiration: None,
        })
    }
}

/// Build the provider selected by the config.
pub fn provider_from_config(
    auth: &AuthConfig,
) -> Result<Arc<dyn CredentialProvider + Send + Sync>, PipelineError> {
    Ok(match auth {
        AuthConfig::Static {
            access_key_id_env,
            secret_access_key_env,
            session_token_env,
        } => Arc::new(StaticCredentials::new(
            access_key_id_env,
            secret_access_key_env,
            session_token_env,
        )),
        AuthConfig::Federated(federated) => {
            Arc::new(FederatedCredentials::from_env(federated.clone())?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_credentials_missing_var() {
        let provider = StaticCredentials::new(
            "GITASK_TEST_UNSET_ACCESS_KEY",
            "GITASK_TEST_UNSET_SECRET",
            "GITASK_TEST_UNSET_TOKEN",
        );
        let err = provider.credentials().await.unwrap_err();
        assert!(matches!(err, PipelineError::Authentication { .. }));
        assert!(err.to_string().contains("GITASK_TEST_UNSET_ACCESS_KEY"));
    }

    #[tokio::test]
    async fn test_static_credentials_from_env() {
        std::env::set_var("GITASK_TEST_STATIC_AK", "AKIA123");
        std::env::set_var("GITASK_TEST_STATIC_SK", "secret");
        std::env::set_var("GITASK_TEST_STATIC_ST", "token");
        let provider = StaticCredentials::new(
            "GITASK_TEST_STATIC_AK",
            "GITASK_TEST_STATIC_SK",
            "GITASK_TEST_STATIC_ST",
        );
        let creds = provider.credentials().await.unwrap();
        assert_eq!(creds.access_key_id, "AKIA123");
        assert_eq!(creds.session_token, "token");
        assert!(creds.expiration.is_none());
    }
}
