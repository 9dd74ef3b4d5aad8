//! Terminal-based approval prompt using crossterm.
//!
//! Shows the command the AI produced and where it will run, then waits for
//! the user to press A or D. No answer before the timeout counts as D.

use crate::approval::types::{ApprovalRequest, ApprovalResponse};
use crate::approval::ApprovalHandler;
use anyhow::Result;
use async_trait::async_trait;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use std::io::Write;
use std::time::Duration;

/// Lines of the command shown before the prompt.
const PREVIEW_LINES: usize = 12;

/// Terminal-based approval handler.
pub struct TerminalApproval {
    timeout: Duration,
}

impl TerminalApproval {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(300),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TerminalApproval {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApprovalHandler for TerminalApproval {
    async fn request_approval(&self, request: &ApprovalRequest) -> Result<ApprovalResponse> {
        // crossterm does synchronous I/O
        let request = request.clone();
        let timeout = self.timeout;

        tokio::task::spawn_blocking(move || show_approval_prompt(&request, timeout)).await?
    }
}

fn show_approval_prompt(request: &ApprovalRequest, timeout: Duration) -> Result<ApprovalResponse> {
    let mut stdout = std::io::stdout();
    let dir = request.working_dir.display().to_string();

    execute!(
        stdout,
        Print("\n"),
        SetForegroundColor(Color::Yellow),
        Print("╔══════════════════════════════════════════════════════════╗\n"),
        Print("║              ⚠  RUN THIS COMMAND?                        ║\n"),
        Print("╠══════════════════════════════════════════════════════════╣\n"),
        SetForegroundColor(Color::White),
        Print(format!("║  Question: {:<46}║\n", truncate(&request.question, 46))),
        Print(format!("║  In:       {:<46}║\n", truncate(&dir, 46))),
        Print("║  Command:                                                ║\n"),
    )?;

    for line in request.command.as_str().lines().take(PREVIEW_LINES) {
        execute!(
            stdout,
            SetForegroundColor(Color::Cyan),
            Print(format!("║    {:<54}║\n", truncate(line, 54))),
        )?;
    }
    let hidden = request.command.line_count().saturating_sub(PREVIEW_LINES);
    if hidden > 0 {
        execute!(
            stdout,
            SetForegroundColor(Color::DarkGrey),
            Print(format!(
                "║    {:<54}║\n",
                format!("... {} more lines, press V to view", hidden)
            )),
        )?;
    }

    execute!(
        stdout,
        SetForegroundColor(Color::Yellow),
        Print("║                                                          ║\n"),
        SetForegroundColor(Color::Green),
        Print("║  [A] Run    "),
        SetForegroundColor(Color::Red),
        Print("[D] Don't run    "),
        SetForegroundColor(Color::Blue),
        Print("[V] View full command        "),
        SetForegroundColor(Color::Yellow),
        Print("║\n"),
        Print("╚══════════════════════════════════════════════════════════╝\n"),
        ResetColor,
    )?;
    stdout.flush()?;

    terminal::enable_raw_mode()?;

    let result = loop {
        if event::poll(timeout)? {
            if let Event::Key(KeyEvent { code, .. }) = event::read()? {
                match code {
                    KeyCode::Char('a') | KeyCode::Char('A') => {
                        break ApprovalResponse {
                            approved: true,
                            approved_by: Some("terminal".to_string()),
                        };
                    }
                    KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Esc => {
                        break ApprovalResponse {
                            approved: false,
                            approved_by: None,
                        };
                    }
                    KeyCode::Char('v') | KeyCode::Char('V') => {
                        terminal::disable_raw_mode()?;
                        execute!(
                            stdout,
                            SetForegroundColor(Color::DarkGrey),
                            Print("\n--- Full command ---\n"),
                            Print(request.command.as_str()),
                            Print("\n--- End command ---\n"),
                            ResetColor,
                        )?;
                        stdout.flush()?;
                        terminal::enable_raw_mode()?;
                        continue;
                    }
                    _ => continue,
                }
            }
        } else {
            break ApprovalResponse {
                approved: false,
                approved_by: None,
            };
        }
    };

    terminal::disable_raw_mode()?;

    if result.approved {
        execute!(
            stdout,
            SetForegroundColor(Color::Green),
            Print("\n  ✓ Running\n\n"),
            ResetColor,
        )?;
    } else {
        execute!(
            stdout,
            SetForegroundColor(Color::Red),
            Print("\n  ✗ Not run\n\n"),
            ResetColor,
        )?;
    }
    stdout.flush()?;

    Ok(result)
}

/// Clip to `max` characters, marking the cut with "...".
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Approves everything without prompting. This is the default: the command
/// runs exactly as the service returned it.
pub struct AutoApproval;

#[async_trait]
impl ApprovalHandler for AutoApproval {
    async fn request_approval(&self, _request: &ApprovalRequest) -> Result<ApprovalResponse> {
        Ok(ApprovalResponse {
            approved: true,
            approved_by: Some("auto".to_string()),
        })
    }
}

/// Refuses everything.
pub struct AutoDeny;

#[async_trait]
impl ApprovalHandler for AutoDeny {
    async fn request_approval(&self, _request: &ApprovalRequest) -> Result<ApprovalResponse> {
        Ok(ApprovalResponse {
            approved: false,
            approved_by: None,
        })
    }
}
