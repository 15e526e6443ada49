use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("`{field}` is invalid: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("unknown sticky level `{value}`")]
    UnknownStickyLevel { value: i16 },
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}
