//! Error types for uatree

use thiserror::Error;

use crate::client::BrowseError;

/// Result type alias using uatree's Error
pub type Result<T> = std::result::Result<T, Error>;

/// uatree error types with helpful messages and suggestions
///
/// Browse failures below the root never show up here: they are rendered
/// inline in the tree and the traversal carries on.
#[derive(Error, Debug)]
pub enum Error {
    // Session errors (E100-E199)
    #[error("Unable to create client instance: {0}")]
    ClientCreation(String),

    #[error("Unable to connect to server '{url}': {cause}")]
    Connection { url: String, cause: String },

    // Browse errors (E200-E299)
    #[error("Cannot browse root node: {0}")]
    RootBrowse(BrowseError),

    // Input errors (E300-E399)
    #[error("Invalid node id '{0}'. Use `ns=<index>;i=<number>`, `ns=<index>;s=<name>` or `<index>,<identifier>`.")]
    InvalidNodeId(String),

    #[error("Invalid depth {0}: depth must be at least 1")]
    InvalidDepth(usize),

    // Snapshot errors (E400-E499)
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::ClientCreation(_) => "E100",
            Self::Connection { .. } => "E101",
            Self::RootBrowse(_) => "E200",
            Self::InvalidNodeId(_) => "E300",
            Self::InvalidDepth(_) => "E301",
            Self::Snapshot(_) => "E400",
            Self::ConfigError(_) => "E600",
            Self::Io(_) | Self::Json(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Connection { .. } => Some("uatree config get session.server_url".to_string()),
            Self::RootBrowse(err) => Some(format!(
                "check that {} exists on the server, or pass another --root",
                err.node
            )),
            Self::InvalidDepth(_) => Some("pass --depth 1 or higher".to_string()),
            Self::ConfigError(_) => Some("uatree config list".to_string()),
            _ => None,
        }
    }
}
