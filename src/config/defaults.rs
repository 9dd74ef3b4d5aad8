//! Starter config written by `gitask init`.

/// Template with static credentials taken from the environment.
pub const STARTER_YAML: &str = r#"# gitask configuration
# The AI proposes git/glab commands; gitask runs them in repo_path.
# Whatever the AI returns is executed as-is. Set confirm_before_execute
# to review each command first.

repo_path: {repo_path}

# Extra directories for the command shell's PATH (e.g. where glab lives)
# extra_path: /opt/homebrew/bin

# Command output is clipped to this many characters before it is sent
# back for the summary.
max_output_chars: 6740

confirm_before_execute: false

service:
  endpoint: https://qbusiness.us-east-1.amazonaws.com
  application_id: REPLACE_WITH_APPLICATION_ID

# Credentials come from AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY /
# AWS_SESSION_TOKEN. Switch to `mode: federated` to log in through a user
# pool, exchange the token and assume a role:
#
# auth:
#   mode: federated
#   identity_endpoint: https://cognito-idp.us-east-1.amazonaws.com/
#   identity_client_id: REPLACE_WITH_USER_POOL_CLIENT_ID
#   username: REPLACE_WITH_USERNAME
#   password_env: GITASK_PASSWORD
#   token_endpoint: https://oidc.us-east-1.amazonaws.com
#   token_client_id: REPLACE_WITH_IDENTITY_CENTER_APPLICATION_ARN
#   role_endpoint: https://sts.amazonaws.com
#   role_arn: REPLACE_WITH_ROLE_ARN
#   role_session_name: qapp
auth:
  mode: static
"#;

/// Render the starter template for a repository path.
pub fn starter_config(repo_path: &str) -> String {
    STARTER_YAML.replace("{repo_path}", repo_path)
}
