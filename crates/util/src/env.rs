use serde::de::DeserializeOwned;
use smartstring::{LazyCompact, SmartString};
use std::{env::VarError, io::ErrorKind, path::PathBuf};
use thiserror::Error;

/// An error we encountered while loading configuration
/// from `.env` and the process environment.
#[derive(Debug, Error)]
pub enum EnvLoadError {
	#[error("i/o error while reading `.env`")]
	IoError(#[from] std::io::Error),

	#[error("bad environment variable")]
	VarError(#[from] VarError),

	#[error("could not parse `.env` line `{on_line}` at char {at_char}")]
	LineParse { on_line: String, at_char: usize },

	#[error("other dotenvy error")]
	Other(#[source] dotenvy::Error),

	#[error("missing required variable `{0}`")]
	MissingValue(SmartString<LazyCompact>),

	#[error("could not parse environment: {0}")]
	OtherParseError(String),
}

/// A configuration value and where we found it
#[derive(Debug)]
pub enum LoadedEnv<T> {
	/// We loaded config from `.env` and env vars
	FoundFile { config: T, path: PathBuf },

	/// We could not find `.env` and only loaded env vars
	OnlyVars(T),
}

impl<T> LoadedEnv<T> {
	pub fn get_config(&self) -> &T {
		match self {
			Self::FoundFile { config, .. } => config,
			Self::OnlyVars(config) => config,
		}
	}

	/// The `.env` file this config came from, if any.
	pub fn get_path(&self) -> Option<&PathBuf> {
		match self {
			Self::FoundFile { path, .. } => Some(path),
			Self::OnlyVars(_) => None,
		}
	}
}

/// Load the configuration type `T` from the current environment,
/// including the `.env` if it exists.
pub fn load_env<T: DeserializeOwned>() -> Result<LoadedEnv<T>, EnvLoadError> {
	let env_path = match dotenvy::dotenv() {
		Ok(path) => Some(path),

		Err(dotenvy::Error::Io(err)) => match err.kind() {
			ErrorKind::NotFound => None,
			_ => return Err(err.into()),
		},

		Err(dotenvy::Error::EnvVar(err)) => return Err(err.into()),

		Err(dotenvy::Error::LineParse(on_line, at_char)) => {
			return Err(EnvLoadError::LineParse { on_line, at_char });
		}

		Err(err) => return Err(EnvLoadError::Other(err)),
	};

	return match envy::from_env::<T>() {
		Ok(config) => match env_path {
			Some(path) => Ok(LoadedEnv::FoundFile { path, config }),
			None => Ok(LoadedEnv::OnlyVars(config)),
		},

		Err(envy::Error::MissingValue(value)) => Err(EnvLoadError::MissingValue(value.into())),
		Err(envy::Error::Custom(message)) => Err(EnvLoadError::OtherParseError(message)),
	};
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn path_is_known_only_for_files() {
		let found = LoadedEnv::FoundFile {
			config: 1u8,
			path: PathBuf::from("/srv/weir/.env"),
		};
		assert_eq!(found.get_path(), Some(&PathBuf::from("/srv/weir/.env")));
		assert_eq!(*found.get_config(), 1);

		let vars = LoadedEnv::OnlyVars(2u8);
		assert_eq!(vars.get_path(), None);
		assert_eq!(*vars.get_config(), 2);
	}
}
