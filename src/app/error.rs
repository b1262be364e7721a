use thiserror::Error;
use crate::database::DatabaseError;

/// Failures that escape a request. Validation and not-found never end up
/// here; they become flashes.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Too many redirects (last location: {0})")]
    RedirectLoop(String),
}
