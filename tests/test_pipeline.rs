//! Pipeline tests with in-process collaborators.
//!
//! The chat service is scripted, credentials are fixed, and commands run for
//! real against a throwaway git repository with a local bare remote.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use gitask::approval::{ApprovalHandler, AutoApproval, AutoDeny};
use gitask::auth::{CredentialProvider, Credentials};
use gitask::chat::ChatService;
use gitask::config;
use gitask::pipeline::{
    Pipeline, PipelineError, PipelineEvent, PipelineSettings, ServiceStage,
    EXECUTION_ERROR_MARKER,
};
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct FixedCredentials;

#[async_trait]
impl CredentialProvider for FixedCredentials {
    async fn credentials(&self) -> Result<Credentials, PipelineError> {
        Ok(Credentials {
            access_key_id: "AKIATEST".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: "token".to_string(),
            expiration: None,
        })
    }
}

struct FailingCredentials;

#[async_trait]
impl CredentialProvider for FailingCredentials {
    async fn credentials(&self) -> Result<Credentials, PipelineError> {
        Err(PipelineError::authentication("user login", "NotAuthorizedException"))
    }
}

/// Replies with canned responses in order and records every prompt.
/// `None` in the script means "fail this call".
struct ScriptedChat {
    replies: Mutex<Vec<Option<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedChat {
    fn new(replies: Vec<Option<&str>>) -> Arc<Self> {
        let mut replies: Vec<Option<String>> =
            replies.into_iter().map(|r| r.map(str::to_string)).collect();
        replies.reverse();
        Arc::new(Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatService for ScriptedChat {
    async fn chat_sync(&self, _credentials: &Credentials, message: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(message.to_string());
        match self.replies.lock().unwrap().pop() {
            Some(Some(reply)) => Ok(reply),
            Some(None) => Err(anyhow!("ThrottlingException: rate exceeded")),
            None => Err(anyhow!("no scripted reply left")),
        }
    }
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("git should be installed");
    assert!(status.success(), "git {:?} failed", args);
}

/// A checkout with one commit on `main` and a bare `origin`.
fn setup_repo() -> (TempDir, TempDir) {
    let repo = TempDir::new().unwrap();
    let remote = TempDir::new().unwrap();

    git(remote.path(), &["init", "--bare", "-q"]);
    git(repo.path(), &["init", "-q", "-b", "main"]);
    git(repo.path(), &["config", "user.email", "dev@example.com"]);
    git(repo.path(), &["config", "user.name", "Dev"]);
    git(repo.path(), &["config", "commit.gpgsign", "false"]);
    std::fs::write(repo.path().join("README.md"), "# project1\n").unwrap();
    git(repo.path(), &["add", "README.md"]);
    git(repo.path(), &["commit", "-q", "-m", "initial"]);
    git(
        repo.path(),
        &["remote", "add", "origin", remote.path().to_str().unwrap()],
    );
    git(repo.path(), &["push", "-q", "origin", "main"]);

    (repo, remote)
}

fn settings(repo: &Path) -> PipelineSettings {
    PipelineSettings {
        repo_path: repo.to_path_buf(),
        extra_path: Vec::new(),
        max_output_chars: config::DEFAULT_MAX_OUTPUT_CHARS,
        dry_run: false,
    }
}

fn pipeline(
    settings: PipelineSettings,
    chat: Arc<ScriptedChat>,
    approval: Arc<dyn ApprovalHandler + Send + Sync>,
) -> Pipeline {
    Pipeline::new(settings, Arc::new(FixedCredentials), chat, approval)
}

const HELLO_RESPONSE: &str = "Sure, here are the commands:\n<command>git checkout -b feature1\necho hi > hello.py\ngit add hello.py\ngit commit -m 'add hello'\ngit push origin feature1</command>\nLet me know if you need anything else.";

#[tokio::test]
async fn test_hello_world_scenario() {
    let (repo, remote) = setup_repo();
    let chat = ScriptedChat::new(vec![Some(HELLO_RESPONSE), Some("A branch was created.")]);
    let pipeline = pipeline(settings(repo.path()), chat.clone(), Arc::new(AutoApproval));

    let mut events = Vec::new();
    let report = pipeline
        .run("add a hello world script", &mut |event| {
            events.push(format!("{:?}", event));
        })
        .await
        .unwrap();

    assert_eq!(
        report.command.as_str(),
        "git checkout -b feature1\necho hi > hello.py\ngit add hello.py\ngit commit -m 'add hello'\ngit push origin feature1"
    );

    let outcome = report.outcome.as_ref().unwrap();
    assert!(outcome.success, "command failed: {}", outcome.output);
    assert_eq!(report.summary.as_deref(), Some("A branch was created."));

    // The command really ran against the checkout and the remote.
    assert_eq!(
        std::fs::read_to_string(repo.path().join("hello.py")).unwrap(),
        "hi\n"
    );
    let branches = Command::new("git")
        .args(["branch", "--list", "feature1"])
        .current_dir(remote.path())
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&branches.stdout).contains("feature1"));

    // The output reached the follow-up prompt unchanged.
    let prompts = chat.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("Question: add a hello world script"));
    assert!(prompts[0].contains(&repo.path().display().to_string()));
    let forwarded = report.forwarded_output.as_deref().unwrap();
    assert_eq!(forwarded, outcome.output);
    assert!(prompts[1].contains(&format!("Git Response: {}\n\nSummary:", forwarded)));
    assert!(prompts[1].contains(&format!("Git Command: {}\n\n", report.command)));

    assert_eq!(events.len(), 6);
    assert!(events[0].starts_with("Authenticating"));
    assert!(events[2].starts_with("CommandExtracted"));
    assert!(events[5].starts_with("Summarizing"));
}

#[tokio::test]
async fn test_failed_command_is_summarized_not_raised() {
    let (repo, _remote) = setup_repo();
    let chat = ScriptedChat::new(vec![
        Some("<command>git checkout does-not-exist</command>"),
        Some("The branch does not exist."),
    ]);
    let pipeline = pipeline(settings(repo.path()), chat.clone(), Arc::new(AutoApproval));

    let report = pipeline.run("switch branch", &mut |_| {}).await.unwrap();

    let outcome = report.outcome.unwrap();
    assert!(!outcome.success);
    assert!(outcome.output.starts_with(EXECUTION_ERROR_MARKER));
    assert_eq!(report.summary.as_deref(), Some("The branch does not exist."));

    let prompts = chat.prompts();
    assert!(prompts[1].starts_with("The Git command failed."));
    assert!(prompts[1].contains(EXECUTION_ERROR_MARKER));
}

#[tokio::test]
async fn test_long_output_is_clipped_before_follow_up() {
    let repo = TempDir::new().unwrap();
    let chat = ScriptedChat::new(vec![
        Some("<command>i=0; while [ $i -lt 2000 ]; do echo line-$i; i=$((i+1)); done</command>"),
        Some("Lots of lines."),
    ]);
    let pipeline = pipeline(settings(repo.path()), chat.clone(), Arc::new(AutoApproval));

    let mut saw_truncation = false;
    let report = pipeline
        .run("print many lines", &mut |event| {
            if let PipelineEvent::Executed { truncated, .. } = event {
                saw_truncation = truncated;
            }
        })
        .await
        .unwrap();

    let outcome = report.outcome.unwrap();
    let forwarded = report.forwarded_output.unwrap();
    assert!(outcome.output.chars().count() > config::DEFAULT_MAX_OUTPUT_CHARS);
    assert_eq!(forwarded.chars().count(), config::DEFAULT_MAX_OUTPUT_CHARS);
    assert!(outcome.output.starts_with(&forwarded));
    assert!(saw_truncation);
    assert!(chat.prompts()[1].contains(&forwarded));
}

#[tokio::test]
async fn test_missing_command_block_halts_before_execution() {
    let repo = TempDir::new().unwrap();
    let chat = ScriptedChat::new(vec![Some("I am not sure how to handle that.")]);
    let pipeline = pipeline(settings(repo.path()), chat.clone(), Arc::new(AutoApproval));

    let err = pipeline.run("what is the weather?", &mut |_| {}).await.unwrap_err();
    match err {
        PipelineError::Extraction { response, .. } => {
            assert_eq!(response, "I am not sure how to handle that.");
        }
        other => panic!("Expected extraction error, got {:?}", other),
    }
    assert_eq!(chat.prompts().len(), 1);
}

#[tokio::test]
async fn test_authentication_failure_halts_immediately() {
    let repo = TempDir::new().unwrap();
    let chat = ScriptedChat::new(vec![Some("<command>touch marker</command>")]);
    let pipeline = Pipeline::new(
        settings(repo.path()),
        Arc::new(FailingCredentials),
        chat.clone(),
        Arc::new(AutoApproval),
    );

    let err = pipeline.run("anything", &mut |_| {}).await.unwrap_err();
    assert!(matches!(err, PipelineError::Authentication { .. }));
    assert!(chat.prompts().is_empty());
    assert!(!repo.path().join("marker").exists());
}

#[tokio::test]
async fn test_initial_service_failure_halts() {
    let repo = TempDir::new().unwrap();
    let chat = ScriptedChat::new(vec![None]);
    let pipeline = pipeline(settings(repo.path()), chat, Arc::new(AutoApproval));

    let err = pipeline.run("anything", &mut |_| {}).await.unwrap_err();
    match err {
        PipelineError::ServiceCall { stage, detail } => {
            assert_eq!(stage, ServiceStage::Initial);
            assert!(detail.contains("ThrottlingException"));
        }
        other => panic!("Expected service error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_follow_up_failure_is_reported_after_execution() {
    let repo = TempDir::new().unwrap();
    let chat = ScriptedChat::new(vec![Some("<command>touch marker</command>"), None]);
    let pipeline = pipeline(settings(repo.path()), chat, Arc::new(AutoApproval));

    let err = pipeline.run("make a marker", &mut |_| {}).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::ServiceCall {
            stage: ServiceStage::FollowUp,
            ..
        }
    ));
    assert!(repo.path().join("marker").exists());
}

#[tokio::test]
async fn test_declined_command_does_not_run() {
    let repo = TempDir::new().unwrap();
    let chat = ScriptedChat::new(vec![Some("<command>touch marker</command>")]);
    let pipeline = pipeline(settings(repo.path()), chat.clone(), Arc::new(AutoDeny));

    let err = pipeline.run("make a marker", &mut |_| {}).await.unwrap_err();
    assert!(matches!(err, PipelineError::Declined));
    assert!(!repo.path().join("marker").exists());
    assert_eq!(chat.prompts().len(), 1);
}

#[tokio::test]
async fn test_dry_run_stops_after_extraction() {
    let repo = TempDir::new().unwrap();
    let chat = ScriptedChat::new(vec![Some("<command>touch marker</command>")]);
    let mut settings = settings(repo.path());
    settings.dry_run = true;
    let pipeline = pipeline(settings, chat.clone(), Arc::new(AutoApproval));

    let report = pipeline.run("make a marker", &mut |_| {}).await.unwrap();
    assert_eq!(report.command.as_str(), "touch marker");
    assert!(report.outcome.is_none());
    assert!(report.summary.is_none());
    assert!(!repo.path().join("marker").exists());
    assert_eq!(chat.prompts().len(), 1);
}

#[test]
fn test_fixture_config_parses() {
    let yaml = include_str!("fixtures/test_config.yaml");
    let config = config::parse_config_str(yaml).expect("fixture should parse");
    assert_eq!(config.service.application_id, "test-application");
    assert_eq!(config.max_output_chars, 6740);
    assert_eq!(config.extra_path.len(), 1);
    let settings = PipelineSettings::from_config(&config);
    assert!(!settings.dry_run);
    assert_eq!(settings.repo_path, config.repo_path);
}
