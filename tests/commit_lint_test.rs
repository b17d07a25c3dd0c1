use anyhow::Result;
use std::process::Command;
use tempfile::NamedTempFile;

fn lint(message: &str) -> Result<std::process::Output> {
    let file = NamedTempFile::new()?;
    std::fs::write(file.path(), message)?;
    Ok(Command::new(env!("CARGO_BIN_EXE_commit-msg-lint"))
        .arg(file.path())
        .output()?)
}

#[test]
fn test_hook_accepts_conventional_messages() -> Result<()> {
    for message in [
        "feat(tasker): run accounts in parallel\n",
        "fix: keep cookie values containing '='\n\nLonger body here.\n",
        "# Please enter the commit message\nchore(deps): bump reqwest\n",
        "Merge branch 'main' into feature\n",
    ] {
        let output = lint(message)?;
        assert!(output.status.success(), "rejected: {:?}", message);
    }
    Ok(())
}

#[test]
fn test_hook_rejects_bad_messages() -> Result<()> {
    for message in ["update stuff\n", "feature: new site\n", "fix(): empty scope\n"] {
        let output = lint(message)?;
        assert_eq!(output.status.code(), Some(1), "accepted: {:?}", message);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(!stderr.is_empty());
    }
    Ok(())
}

#[test]
fn test_hook_requires_a_file_argument() {
    let output = Command::new(env!("CARGO_BIN_EXE_commit-msg-lint"))
        .output()
        .expect("binary runs");
    assert!(!output.status.success());
}
