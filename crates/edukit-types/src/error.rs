//! Error type shared by the engine and all adapters.
//!
//! Adapter implementations map their backend failures onto these variants;
//! the engine's gates convert them into documented fallback decisions at
//! each gate boundary, so nothing here leaks past the resolution layer.

pub type EkResult<T> = Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Referenced row does not exist. Also reported by restriction reads
	/// when the backing table itself is absent (treated as unrestricted).
	NotFound,
	PermissionDenied,
	DbError,
	/// Rejected at a write boundary; carries a human-readable reason.
	ValidationError(String),
	Internal(String),
	ServiceUnavailable,
	Timeout,
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::DbError => write!(f, "database error"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::ServiceUnavailable => write!(f, "service unavailable"),
			Error::Timeout => write!(f, "timeout"),
		}
	}
}

impl std::error::Error for Error {}

// vim: ts=4
