pub mod commit_lint;
pub mod cookies;
pub mod error;
pub mod logger;
pub mod validation;
