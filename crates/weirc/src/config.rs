use serde::Deserialize;
use weir_util::logging::LoggingPreset;

/// Note that the field of this struct are not capitalized.
/// Envy is case-insensitive, and expects Rust fields to be snake_case.
#[derive(Debug, Deserialize, Clone)]
pub struct WeircConfig {
	/// The logging level to run with
	#[serde(default)]
	pub weirc_loglevel: LoggingPreset,

	/// If true, write indented IR.
	/// Otherwise, write compact IR.
	#[serde(default = "WeircConfig::default_true")]
	pub weirc_pretty: bool,

	/// If true, log the fingerprint of every document we compile
	#[serde(default = "WeircConfig::default_true")]
	pub weirc_fingerprint: bool,
}

impl WeircConfig {
	fn default_true() -> bool {
		true
	}
}
