//! `gitask extract` — pull the command out of a saved AI response.
//!
//! Reads the response on stdin and prints the command, nothing else, so it
//! can be piped. Useful for checking what would have run.

use crate::pipeline::extract_command;
use anyhow::{Context, Result};
use std::io::Read;

/// Run the `gitask extract` command.
pub fn run_extract() -> Result<()> {
    let mut response = String::new();
    std::io::stdin()
        .read_to_string(&mut response)
        .context("Failed to read the response from stdin")?;

    let command = extract_command(&response)?;
    println!("{}", command);
    Ok(())
}
