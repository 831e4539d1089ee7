//! Failure classes reported by the surface adapters.

/// Every failure an adapter can report. One variant per failure class, each
/// carrying a human-readable description.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
	/// The backend lacks a required capability, or the renderer refused to be
	/// constructed. Not recoverable.
	#[error("construction failed: {0}")]
	Construction(String),
	/// A template control or renderer mount is missing or duplicated.
	#[error("template binding failed: {0}")]
	Binding(String),
	/// The remote template could not be fetched.
	#[error("template fetch failed: {0}")]
	Fetch(String),
	/// The caller supplied a malformed argument or called out of order.
	#[error("invalid call: {0}")]
	Misuse(String),
}

/// Result alias used throughout the crate.
pub type Result<T, E = SurfaceError> = std::result::Result<T, E>;
