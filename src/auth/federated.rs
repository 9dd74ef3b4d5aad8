//! Federated credential chain: user login → token exchange → role assumption.
//!
//! Each step is a separate request so it can be exercised on its own.
//! Requests are plain JSON over HTTPS; signing, where an endpoint needs it,
//! is the endpoint's business.

use crate::auth::token;
use crate::auth::types::Credentials;
use crate::auth::CredentialProvider;
use crate::config::FederatedAuthConfig;
use crate::pipeline::error::PipelineError;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const IDENTITY_CENTER_PROVIDER: &str = "arn:aws:iam::aws:contextProvider/IdentityCenter";
const INITIATE_AUTH_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";

// ── Request types ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    auth_parameters: AuthParameters<'a>,
    client_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "UPPERCASE")]
struct AuthParameters<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTokenRequest<'a> {
    client_id: &'a str,
    grant_type: &'a str,
    assertion: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleRequest<'a> {
    role_arn: &'a str,
    role_session_name: &'a str,
    provided_contexts: Vec<ProvidedContext<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ProvidedContext<'a> {
    provider_arn: &'a str,
    context_assertion: &'a str,
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: AuthenticationResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTokenResponse {
    id_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleResponse {
    credentials: Credentials,
}

/// Credential provider that runs the full federated chain on every call.
pub struct FederatedCredentials {
    config: FederatedAuthConfig,
    password: String,
    http: Client,
}

impl FederatedCredentials {
    pub fn new(config: FederatedAuthConfig, password: impl Into<String>) -> Self {
        Self {
            config,
            password: password.into(),
            http: Client::new(),
        }
    }

    /// Build from config, reading the password from the configured variable.
    pub fn from_env(config: FederatedAuthConfig) -> Result<Self, PipelineError> {
        let password = std::env::var(&config.password_env).map_err(|_| {
            PipelineError::Config(format!(
                "environment variable {} (auth.password_env) is not set",
                config.password_env
            ))
        })?;
        Ok(Self::new(config, password))
    }

    /// Step 1: log in with username and password, returning the ID token.
    pub async fn initiate_auth(&self) -> Result<String, PipelineError> {
        let step = "user login";
        let request = InitiateAuthRequest {
            auth_flow: "USER_PASSWORD_AUTH",
            auth_parameters: AuthParameters {
                username: &self.config.username,
                password: &self.password,
            },
            client_id: &self.config.identity_client_id,
        };
        let builder = self
            .http
            .post(&self.config.identity_endpoint)
            .header("X-Amz-Target", INITIATE_AUTH_TARGET)
            .header("Content-Type", "application/x-amz-json-1.1")
            .body(
                serde_json::to_vec(&request)
                    .map_err(|e| PipelineError::authentication(step, e))?,
            );
        let response: InitiateAuthResponse = send(builder, step).await?;
        Ok(response.authentication_result.id_token)
    }

    /// Step 2: exchange the login token for an identity token.
    pub async fn create_token_with_iam(&self, assertion: &str) -> Result<String, PipelineError> {
        let request = CreateTokenRequest {
            client_id: &self.config.token_client_id,
            grant_type: JWT_BEARER_GRANT,
            assertion,
        };
        let builder = self.http.post(&self.config.token_endpoint).json(&request);
        let response: CreateTokenResponse = send(builder, "token exchange").await?;
        Ok(response.id_token)
    }

    /// Step 3: assume the configured role with the identity context.
    pub async fn assume_role(&self, identity_context: &str) -> Result<Credentials, PipelineError> {
        let request = AssumeRoleRequest {
            role_arn: &self.config.role_arn,
            role_session_name: &self.config.role_session_name,
            provided_contexts: vec![ProvidedContext {
                provider_arn: IDENTITY_CENTER_PROVIDER,
                context_assertion: identity_context,
            }],
        };
        let builder = self.http.post(&self.config.role_endpoint).json(&request);
        let response: AssumeRoleResponse = send(builder, "role assumption").await?;
        Ok(response.credentials)
    }
}

#[async_trait]
impl CredentialProvider for FederatedCredentials {
    async fn credentials(&self) -> Result<Credentials, PipelineError> {
        let login_token = self.initiate_auth().await?;
        tracing::debug!("Logged in as {}", self.config.username);

        let id_token = self.create_token_with_iam(&login_token).await?;
        let context = token::identity_context(&id_token)
            .map_err(|e| PipelineError::authentication("token decoding", format!("{:#}", e)))?;

        let credentials = self.assume_role(&context).await?;
        tracing::info!(
            "Assumed role {} (expires {:?})",
            self.config.role_arn,
            credentials.expiration
        );
        Ok(credentials)
    }
}

/// Send a request and decode a JSON body, mapping every failure to an
/// authentication error for `step`.
async fn send<T: DeserializeOwned>(
    builder: reqwest::RequestBuilder,
    step: &str,
) -> Result<T, PipelineError> {
    let resp = builder
        .send()
        .await
        .map_err(|e| PipelineError::authentication(step, e))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let detail: String = body.chars().take(800).collect();
        return Err(if detail.trim().is_empty() {
            PipelineError::authentication(step, status)
        } else {
            PipelineError::authentication(step, format!("{}\n{}", status, detail))
        });
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| PipelineError::authentication(step, e))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| PipelineError::authentication(step, format!("unexpected response: {}", e)))
}
