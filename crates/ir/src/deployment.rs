use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use smartstring::{LazyCompact, SmartString};
use std::fmt::Display;

/// How to run a node's executor or driver.
///
/// The compiler only records these.
/// Implementations are looked up by the runtime that consumes the IR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutableSpec {
	/// An in-process implementation
	Native {
		implementation: SmartString<LazyCompact>,
	},

	/// A data-parallel implementation.
	/// `pipeline_args` are passed to the batch runner verbatim.
	Batch {
		implementation: SmartString<LazyCompact>,

		#[serde(default)]
		pipeline_args: Vec<String>,
	},

	/// A container image
	Container {
		image: String,

		#[serde(default)]
		command: Vec<String>,

		#[serde(default)]
		args: Vec<String>,
	},
}

impl Display for ExecutableSpec {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Native { implementation } => write!(f, "native `{implementation}`"),
			Self::Batch { implementation, .. } => write!(f, "batch `{implementation}`"),
			Self::Container { image, .. } => write!(f, "container `{image}`"),
		}
	}
}

/// How one node is deployed
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentEntry {
	pub executor: ExecutableSpec,
	pub driver: Option<ExecutableSpec>,
}
