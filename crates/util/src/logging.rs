use serde::Deserialize;
use std::fmt::Display;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
	Trace,
	Debug,
	#[default]
	Info,
	Warn,
	Error,
}

impl Display for LogLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Trace => write!(f, "trace"),
			Self::Debug => write!(f, "debug"),
			Self::Info => write!(f, "info"),
			Self::Warn => write!(f, "warn"),
			Self::Error => write!(f, "error"),
		}
	}
}

/// A named set of log levels.
/// This is what users pick in config.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggingPreset {
	#[default]
	Default,
	Verbose,
	Develop,
	Trace,
}

impl LoggingPreset {
	pub fn get_config(&self) -> LoggingConfig {
		match self {
			Self::Default => LoggingConfig {
				other: LogLevel::Warn,
				cli: LogLevel::Info,
				compiler: LogLevel::Info,
				stages: LogLevel::Warn,
				ir: LogLevel::Warn,
			},

			Self::Verbose => LoggingConfig {
				other: LogLevel::Warn,
				cli: LogLevel::Debug,
				compiler: LogLevel::Debug,
				stages: LogLevel::Info,
				ir: LogLevel::Info,
			},

			Self::Develop => LoggingConfig {
				other: LogLevel::Debug,
				cli: LogLevel::Trace,
				compiler: LogLevel::Trace,
				stages: LogLevel::Debug,
				ir: LogLevel::Debug,
			},

			Self::Trace => LoggingConfig {
				other: LogLevel::Trace,
				cli: LogLevel::Trace,
				compiler: LogLevel::Trace,
				stages: LogLevel::Trace,
				ir: LogLevel::Trace,
			},
		}
	}
}

/// Per-target log levels
#[derive(Debug, Clone, Copy)]
pub struct LoggingConfig {
	other: LogLevel,
	cli: LogLevel,
	compiler: LogLevel,
	stages: LogLevel,
	ir: LogLevel,
}

impl LoggingConfig {
	/// The filter directive string for this config
	pub fn directives(&self) -> String {
		[
			format!("weirc={}", self.cli),
			format!("weir_compiler::stage={}", self.stages),
			format!("weir_compiler={}", self.compiler),
			format!("weir_ir={}", self.ir),
			format!("weir_util={}", self.ir),
			self.other.to_string(),
		]
		.join(",")
	}
}

impl From<LoggingConfig> for EnvFilter {
	fn from(value: LoggingConfig) -> Self {
		EnvFilter::new(value.directives())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_preset_directives() {
		assert_eq!(
			LoggingPreset::Default.get_config().directives(),
			"weirc=info,weir_compiler::stage=warn,weir_compiler=info,weir_ir=warn,weir_util=warn,warn"
		);
	}

	#[test]
	fn every_preset_builds_a_filter() {
		for p in [
			LoggingPreset::Default,
			LoggingPreset::Verbose,
			LoggingPreset::Develop,
			LoggingPreset::Trace,
		] {
			let _: EnvFilter = p.get_config().into();
		}
	}
}
