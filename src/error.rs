use chrono::NaiveDate;
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::save::SaveError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("{0}")]
    Save(#[from] SaveError),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Invalid date '{0}' in stored node")]
    InvalidDate(String),

    #[error("{0}")]
    Other(String),
}

/// Commit-time rejections. All of these leave the node in edit mode and
/// the rest of the tree untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a scope of this type already exists in this container")]
    DuplicateCategory,

    #[error("an item named '{0}' already exists at this level")]
    DuplicateName(String),

    #[error("name is required")]
    MissingName,

    #[error("scope type is required")]
    MissingCategory,

    #[error("target date {target} is before start date {start}")]
    DateOrder { start: NaiveDate, target: NaiveDate },

    #[error("node is not being edited")]
    NotEditing,

    #[error("unknown node")]
    UnknownNode,

    #[error("unknown container")]
    UnknownContainer,

    #[error("sub-items cannot have children")]
    MaxDepth,

    #[error("container has {0} item(s) still being edited")]
    PendingEdits(usize),
}
