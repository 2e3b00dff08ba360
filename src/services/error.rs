use sea_orm::DbErr;

/// Domain errors raised by the service layer.
///
/// Handlers convert these into [`crate::error::AppError`] with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No authenticated identity was attached to the request.
    #[error("authentication required")]
    Unauthenticated,

    /// An asset names a source that is neither in the batch nor in the reference map.
    #[error("{referenced_by} references {missing}, which is not in the upload or the reference map")]
    UnresolvedReference {
        missing: String,
        referenced_by: String,
    },

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Declared content type disagrees with the format sniffed from the bytes.
    #[error("declared content type {declared} does not match detected {detected}")]
    ContentTypeMismatch { declared: String, detected: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    /// The batch has no tilemap and the ingestion policy requires one.
    #[error("upload batch contains no tilemap")]
    NoTilemaps,

    #[error("storage error: {0}")]
    Storage(#[from] DbErr),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
