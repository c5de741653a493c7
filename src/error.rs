use thiserror::Error;

/// Failure to read the stubborn field list off a companion shadow type.
///
/// Every variant is recoverable: the rewrite proceeds with an empty list.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("shadow type {type_name} not found")]
    NotFound { type_name: String },
    #[error("shadow type {type_name} has no accessor {accessor}")]
    MissingAccessor { type_name: String, accessor: String },
    #[error("shadow type {type_name} is malformed: {reason}")]
    Malformed { type_name: String, reason: String },
    #[error("failed to read shadow type {type_name}: {source}")]
    Io {
        type_name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("accessor of shadow type {type_name} panicked: {message}")]
    Panicked { type_name: String, message: String },
}

pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
