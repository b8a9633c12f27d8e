use thiserror::Error;

/// RFC serialization and validation errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    CoreError(#[from] coursecal_core::error::CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
