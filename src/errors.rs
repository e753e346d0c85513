use thiserror::Error;

use crate::validation::ValidationErrors;

/// Failures reported by a record store. Every variant carries a message fit
/// for logs; transport errors are flattened to text at the boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record store unreachable: {message}")]
    Transport { message: String },

    #[error("Record store rejected the request: {message}")]
    Rejected { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Unexpected record store response: {message}")]
    Decode { message: String },
}

impl StoreError {
    pub fn rejected(message: impl Into<String>) -> Self {
        StoreError::Rejected {
            message: message.into(),
        }
    }

    pub fn task_not_found(id: i64) -> Self {
        StoreError::NotFound { entity: "Task", id }
    }

    pub fn category_not_found(id: i64) -> Self {
        StoreError::NotFound {
            entity: "Category",
            id,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StoreError::Decode {
                message: e.to_string(),
            }
        } else {
            StoreError::Transport {
                message: e.to_string(),
            }
        }
    }
}

/// Failures surfaced by the task board. `Display` is the text shown to the
/// user; the underlying store error is only logged.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("{message}")]
    Load {
        message: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{message}")]
    Mutation {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}
