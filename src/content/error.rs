use thiserror::Error;

use super::components::ComponentError;
use super::frontmatter::FrontmatterError;

/// Failures of the server-side fetch and serialize path.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The identifier resolves outside the content root. Never retried.
    #[error("path '{0}' escapes the content root")]
    PathSecurity(String),

    #[error("document '{0}' not found")]
    FileNotFound(String),

    /// Both the rewritten and the original body failed to parse.
    #[error("failed to serialize '{identifier}': {reason}")]
    Serialization { identifier: String, reason: String },
}

/// Failure of a single structural parse attempt.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),

    #[error(transparent)]
    Component(#[from] ComponentError),
}
