//! Identifier checks shared by pipeline and node ids
use thiserror::Error;

/// The ways a name may be invalid
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
	/// This name is empty
	#[error("name cannot be empty")]
	Empty,

	/// This name is entirely whitespace
	#[error("name cannot be entirely whitespace")]
	IsWhitespace,

	/// This name has leading or trailing whitespace
	#[error("name cannot have leading or trailing whitespace")]
	TrimWhitespace,

	/// This name contains a control character
	#[error("name cannot contain control characters")]
	ControlCharacter,
}

/// Check the given name for errors.
pub fn check_name(name: &str) -> Result<(), NameError> {
	if name.is_empty() {
		return Err(NameError::Empty);
	}

	let trimmed = name.trim();
	if trimmed.is_empty() {
		return Err(NameError::IsWhitespace);
	}

	if trimmed.len() != name.len() {
		return Err(NameError::TrimWhitespace);
	}

	if name.chars().any(char::is_control) {
		return Err(NameError::ControlCharacter);
	}

	return Ok(());
}
