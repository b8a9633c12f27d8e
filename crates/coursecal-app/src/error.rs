use thiserror::Error;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] coursecal_service::error::ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] coursecal_db::error::DbError),

    #[error(transparent)]
    RfcError(#[from] coursecal_rfc::error::RfcError),

    #[error(transparent)]
    CoreError(#[from] coursecal_core::error::CoreError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
