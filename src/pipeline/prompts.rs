//! Prompt templates for the two chat requests.

use crate::pipeline::extract::UntrustedCommand;
use std::path::Path;

/// What the service should answer with for questions that are not about git.
pub const NOT_SURE_REPLY: &str = "I am not sure how to handle that.";

/// Prompt asking the service for a single `<command>` block.
pub fn initial_prompt(repo_path: &Path, question: &str) -> String {
    format!(
        "You are a GitLab expert. Based on the following question, \
         frame the appropriate Git or glab commands by interacting with the local repository checked-out at {repo}.\n\n\
         Question: {question}\n\n\
         Show the complete set of Git or glab commands in XML tags that can be executed in the terminal to achieve the desired outcome.\n\n\
         The commands should:\n\
         1. Generate or update the code according to the user's specifications.\n\
         2. Create a new feature branch in GitLab with a meaningful name (e.g., \n<command>git checkout -b feature1</command>).\n\
         3. Add the newly created or modified code to this feature branch (e.g., \n<command>git add first.py</command>).\n\
         4. Commit the changes with a descriptive commit message (e.g., \n<command>git commit -m 'Add first.py file'</command>).\n\
         5. Push the feature branch to the remote repository (e.g., \n<command>git push origin feature1</command>).\n\n\
         DO NOT give me the command for just one step, Wait for all the steps to be completed and \
         concatenate all the generated commands into a single response inside exactly one <command></command> block, \
         ensuring they are in the correct order for execution.\n\
         Include the commands for code generation, branch creation of the feature branch and the commit process \
         and pushing the feature branch to the remote repository.\n\n\
         When the user is requesting to merge the changes, generate the commands to merge. \
         Example: \n<command>git checkout main \n git pull origin main \n git merge feature1 \n git push origin main </command>\n\n\
         If the question is not related to Git or glab, simply respond with '{not_sure}'",
        repo = repo_path.display(),
        question = question,
        not_sure = NOT_SURE_REPLY,
    )
}

/// Prompt asking the service to summarize what the command did.
///
/// `result` is expected to be truncated already.
pub fn follow_up_prompt(
    question: &str,
    command: &UntrustedCommand,
    result: &str,
    succeeded: bool,
) -> String {
    let outcome = if succeeded {
        "The Git command was executed successfully."
    } else {
        "The Git command failed."
    };
    format!(
        "{outcome} Provide a detailed summary of the outcome in less than 1000 words.\
         \n\nQuestion: {question}\n\n\
         Git Command: {command}\n\n\
         Git Response: {result}\n\n\
         Summary:"
    )
}
