//! `commit-msg` hook: checks the message file git passes as the first argument.
//!
//! Install with `ln -s "$(which commit-msg-lint)" .git/hooks/commit-msg`.

use anyhow::Context;
use daily_tasker::utils::commit_lint::{CommitSubject, ConventionalCommit};

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .context("usage: commit-msg-lint <commit-message-file>")?;
    let message = std::fs::read_to_string(&path)
        .with_context(|| format!("reading commit message from {}", path))?;

    match ConventionalCommit::parse(&message) {
        Ok(CommitSubject::Conventional(_)) | Ok(CommitSubject::Exempt(_)) => Ok(()),
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }
}
