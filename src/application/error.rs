use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    application::pagination::ComposeError, application::repos::RepoError,
    infra::error::InfraError,
};

/// Flattened error chain, outermost message first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }

    /// Chain rendered as `outer: inner: innermost`.
    pub fn chain(&self) -> String {
        self.messages.join(": ")
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("listing failed")]
    Compose(#[source] ComposeError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Process exit status for a command that failed with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Validation(_)
            | AppError::Compose(ComposeError::InvalidArgument { .. }) => 2,
            AppError::Infra(InfraError::Configuration { .. }) => 78,
            AppError::Infra(InfraError::Database { .. })
            | AppError::Compose(ComposeError::Source(RepoError::Timeout)) => 69,
            _ => 1,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }
}

impl From<ComposeError> for AppError {
    fn from(error: ComposeError) -> Self {
        AppError::Compose(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_walks_the_source_chain() {
        let err = AppError::from(ComposeError::from(RepoError::from_persistence(
            "connection refused",
        )));
        let report = err.report();

        assert_eq!(
            report.messages,
            vec![
                "listing failed".to_string(),
                "persistence error: connection refused".to_string(),
            ]
        );
        assert_eq!(
            report.chain(),
            "listing failed: persistence error: connection refused"
        );
    }

    #[test]
    fn exit_codes_separate_usage_from_environment_failures() {
        let invalid = AppError::from(ComposeError::invalid("page", "must be at least 1"));
        assert_eq!(invalid.exit_code(), 2);

        let timeout = AppError::from(ComposeError::from(RepoError::Timeout));
        assert_eq!(timeout.exit_code(), 69);

        let config = AppError::from(InfraError::configuration("missing database url"));
        assert_eq!(config.exit_code(), 78);

        assert_eq!(AppError::unexpected("boom").exit_code(), 1);
    }
}
