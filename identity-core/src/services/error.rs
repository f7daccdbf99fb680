use thiserror::Error;
use uuid::Uuid;

use crate::services::catalog::TemplateError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("{kind} {id} is disabled")]
    DisabledPrincipal { kind: &'static str, id: Uuid },

    #[error("Template expansion failed: {0}")]
    Template(#[from] TemplateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn disabled(kind: &'static str, id: Uuid) -> Self {
        Self::DisabledPrincipal { kind, id }
    }
}
