//! Command extraction from free-text AI responses.
//!
//! The response is untrusted text. We look for the first
//! `<command>...</command>` block, unwrap any `<![CDATA[...]]>` sections
//! inside it, and trim. Later blocks are ignored.

use crate::pipeline::error::ExtractionError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static COMMAND_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<command>\s*(.*?)\s*</command>").expect("command block regex is valid")
});

static CDATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("CDATA regex is valid")
});

/// A command produced by the AI service.
///
/// This is the only thing the executor will run, and it is run unsandboxed
/// in the configured repository. Obtain one through [`extract_command`] or,
/// when the text comes from somewhere you already trust, [`UntrustedCommand::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntrustedCommand(String);

impl UntrustedCommand {
    /// Wrap a command string. Returns `None` for blank input.
    pub fn new(command: impl Into<String>) -> Option<Self> {
        let command = command.into();
        if command.trim().is_empty() {
            None
        } else {
            Some(Self(command))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of lines, for display.
    pub fn line_count(&self) -> usize {
        self.0.lines().count()
    }
}

impl fmt::Display for UntrustedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replace every CDATA wrapper with its contents, then trim.
pub fn strip_cdata(text: &str) -> String {
    CDATA.replace_all(text, "$1").trim().to_string()
}

/// Extract the first command block from an AI response.
pub fn extract_command(response: &str) -> Result<UntrustedCommand, ExtractionError> {
    let inner = COMMAND_BLOCK
        .captures(response)
        .and_then(|caps| caps.get(1))
        .ok_or(ExtractionError::NoCommandBlock)?;

    UntrustedCommand::new(strip_cdata(inner.as_str())).ok_or(ExtractionError::EmptyCommand)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_single_block() {
        let response = "Here you go:\n<command>git status</command>\nDone.";
        let cmd = extract_command(response).unwrap();
        assert_eq!(cmd.as_str(), "git status");
    }

    #[test]
    fn test_extract_multiline_block_trims_whitespace() {
        let response = "<command>\n  git checkout -b feature1\n  git push origin feature1  \n</command>";
        let cmd = extract_command(response).unwrap();
        assert_eq!(
            cmd.as_str(),
            "git checkout -b feature1\n  git push origin feature1"
        );
        assert_eq!(cmd.line_count(), 2);
    }

    #[test]
    fn test_extract_strips_cdata() {
        let response = "<command><![CDATA[echo 'a < b' > notes.txt]]></command>";
        let cmd = extract_command(response).unwrap();
        assert_eq!(cmd.as_str(), "echo 'a < b' > notes.txt");
    }

    #[test]
    fn test_extract_strips_multiple_cdata_sections() {
        let response =
            "<command>git add x <![CDATA[&&]]> git commit -m <![CDATA['a & b']]></command>";
        let cmd = extract_command(response).unwrap();
        assert_eq!(cmd.as_str(), "git add x && git commit -m 'a & b'");
    }

    #[test]
    fn test_no_block_fails() {
        let err = extract_command("I am not sure how to handle that.").unwrap_err();
        assert_eq!(err, ExtractionError::NoCommandBlock);
    }

    #[test]
    fn test_unclosed_block_fails() {
        let err = extract_command("<command>git status").unwrap_err();
        assert_eq!(err, ExtractionError::NoCommandBlock);
    }

    #[test]
    fn test_empty_block_fails() {
        assert_eq!(
            extract_command("<command>   </command>").unwrap_err(),
            ExtractionError::EmptyCommand
        );
        assert_eq!(
            extract_command("<command><![CDATA[  ]]></command>").unwrap_err(),
            ExtractionError::EmptyCommand
        );
    }

    #[test]
    fn test_first_block_wins() {
        let response = "<command>git pull</command> or maybe <command>git fetch</command>";
        let cmd = extract_command(response).unwrap();
        assert_eq!(cmd.as_str(), "git pull");
    }

    #[test]
    fn test_untrusted_command_rejects_blank() {
        assert!(UntrustedCommand::new("  \n").is_none());
        assert!(UntrustedCommand::new("ls").is_some());
    }
}
