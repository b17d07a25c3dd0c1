use crate::utils::error::{Result, TaskerError};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Test,
    Chore,
}

impl CommitType {
    pub const ALL: [CommitType; 7] = [
        CommitType::Feat,
        CommitType::Fix,
        CommitType::Docs,
        CommitType::Style,
        CommitType::Refactor,
        CommitType::Test,
        CommitType::Chore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Docs => "docs",
            CommitType::Style => "style",
            CommitType::Refactor => "refactor",
            CommitType::Test => "test",
            CommitType::Chore => "chore",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitType {
    type Err = TaskerError;

    fn from_str(s: &str) -> Result<Self> {
        CommitType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TaskerError::CommitMessage {
                reason: format!(
                    "unknown type '{}', expected one of: {}",
                    s,
                    CommitType::ALL.map(|k| k.as_str()).join(", ")
                ),
            })
    }
}

/// Subject line of a commit following `<type>(<scope>): <description>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitSubject {
    Conventional(ConventionalCommit),
    /// Subjects git writes itself (merges, reverts).
    Exempt(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
    pub kind: CommitType,
    pub scope: Option<String>,
    pub description: String,
}

fn subject_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<type>[A-Za-z]+)(?:\((?P<scope>[^()]*)\))?: (?P<desc>.*)$")
            .expect("commit subject regex is valid")
    })
}

impl ConventionalCommit {
    /// Checks the first meaningful line of a commit message. Lines starting
    /// with `#` are git comments and are ignored.
    pub fn parse(message: &str) -> Result<CommitSubject> {
        let subject = message
            .lines()
            .map(str::trim_end)
            .find(|line| !line.trim().is_empty() && !line.starts_with('#'))
            .ok_or_else(|| TaskerError::CommitMessage {
                reason: "message is empty".to_string(),
            })?;

        if subject.starts_with("Merge ") || subject.starts_with("Revert \"") {
            return Ok(CommitSubject::Exempt(subject.to_string()));
        }

        let caps = subject_regex()
            .captures(subject)
            .ok_or_else(|| TaskerError::CommitMessage {
                reason: format!(
                    "'{}' does not match '<type>(<scope>): <description>'",
                    subject
                ),
            })?;

        let kind: CommitType = caps["type"].parse()?;

        let scope = match caps.name("scope").map(|m| m.as_str()) {
            None => None,
            Some(scope) if scope.is_empty() => {
                return Err(TaskerError::CommitMessage {
                    reason: "scope is empty; drop the parentheses or name a scope".to_string(),
                })
            }
            Some(scope) if scope.chars().any(char::is_whitespace) => {
                return Err(TaskerError::CommitMessage {
                    reason: format!("scope '{}' must not contain whitespace", scope),
                })
            }
            Some(scope) => Some(scope.to_string()),
        };

        let description = caps["desc"].trim();
        if description.is_empty() {
            return Err(TaskerError::CommitMessage {
                reason: "description is empty".to_string(),
            });
        }

        Ok(CommitSubject::Conventional(ConventionalCommit {
            kind,
            scope,
            description: description.to_string(),
        }))
    }
}

impl fmt::Display for ConventionalCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}({}): {}", self.kind, scope, self.description),
            None => write!(f, "{}: {}", self.kind, self.description),
        }
    }
}
