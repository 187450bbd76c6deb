//! Application-level errors (wraps domain and grammar errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;
use crate::parser::SyntaxError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Syntax(#[from] SyntaxError),

    #[error("document not found: {0}")]
    DocumentNotFound(PathBuf),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// The document was rejected: bad syntax or an inconsistent decay model.
    pub fn is_invalid_document(&self) -> bool {
        match self {
            ApplicationError::Syntax(_) => true,
            ApplicationError::Domain(e) => !matches!(
                e,
                DomainError::UnknownParticle(_) | DomainError::UnknownDecay(_)
            ),
            _ => false,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
