use itertools::Itertools;
use smartstring::{LazyCompact, SmartString};
use std::fmt::Display;
use thiserror::Error;
use weir_ir::{InputKey, IrError, NodeId, OutputKey, ParameterType};
use weir_util::names::NameError;

/// Where a node referenced another node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSite {
	/// A channel of the given input
	Input(InputKey),

	/// The node's `after` list
	After,
}

impl Display for ReferenceSite {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Input(key) => write!(f, "input `{key}`"),
			Self::After => write!(f, "`after` list"),
		}
	}
}

/// What kind of thing an invalid name was given to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSubject {
	Pipeline,
	Node,
}

impl Display for NameSubject {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Pipeline => write!(f, "pipeline"),
			Self::Node => write!(f, "node"),
		}
	}
}

/// An error we encounter while compiling a pipeline.
///
/// Compilation stops at the first error,
/// and the same input always produces the same error.
#[derive(Debug, Error)]
pub enum CompileError {
	//
	// MARK: Assembly
	//
	/// A pipeline or node id is not a valid name
	#[error("invalid {subject} id `{name}`: {source}")]
	InvalidName {
		subject: NameSubject,
		name: SmartString<LazyCompact>,
		#[source]
		source: NameError,
	},

	/// Two nodes share an id
	#[error("duplicate node id `{node_id}`")]
	DuplicateNodeId { node_id: NodeId },

	/// A node references a node that does not exist
	#[error("node `{node_id}` references unknown node `{producer}` in its {site}")]
	UnknownProducerReference {
		node_id: NodeId,
		site: ReferenceSite,
		producer: NodeId,
	},

	/// An input with no channels
	#[error("input `{input_key}` of node `{node_id}` has no channels")]
	EmptyInput { node_id: NodeId, input_key: InputKey },

	/// A node declared a context with a reserved type
	#[error("node `{node_id}` declares reserved context type `{context_type}`")]
	ReservedContextType {
		node_id: NodeId,
		context_type: SmartString<LazyCompact>,
	},

	/// A runtime parameter's default does not match its type
	#[error(
		"parameter `{parameter}` of node `{node_id}` has type {expected} but its default is {found}"
	)]
	RuntimeParameterTypeMismatch {
		node_id: NodeId,
		parameter: SmartString<LazyCompact>,
		expected: ParameterType,
		found: ParameterType,
	},

	//
	// MARK: Channels
	//
	/// A channel names an output its producer does not have
	#[error("input `{input_key}` of node `{node_id}` reads `{producer}.{output_key}`, which does not exist")]
	MissingOutputKey {
		node_id: NodeId,
		input_key: InputKey,
		producer: NodeId,
		output_key: OutputKey,
	},

	/// A resolver step's config is not a structured object
	#[error("resolver step {step} of input `{input_key}` on node `{node_id}` has invalid config: {message}")]
	InvalidResolverConfig {
		node_id: NodeId,
		input_key: InputKey,
		step: usize,
		message: String,
	},

	//
	// MARK: Topology
	//
	/// The pipeline graph has a cycle.
	/// `cycle` starts and ends with the same node.
	#[error("pipeline graph has a cycle: {}", .cycle.iter().join(" -> "))]
	CyclicGraph { cycle: Vec<NodeId> },

	/// `to` lists `from` upstream, but `from` does not list `to` downstream
	/// (or the reverse)
	#[error("edge `{from}` -> `{to}` is not recorded on both nodes")]
	AsymmetricEdge { from: NodeId, to: NodeId },

	//
	// MARK: Deployment
	//
	/// The deployment map names a node we don't have
	#[error("deployment config references unknown node `{node_id}`")]
	UnknownNodeInDeploymentConfig { node_id: NodeId },

	/// A node that needs an executor does not have one
	#[error("node `{node_id}` has no executor spec")]
	MissingExecutorSpec { node_id: NodeId },

	//
	// MARK: Emission
	//
	#[error("could not serialize pipeline")]
	SerializationFailure(#[from] IrError),
}

/// The category of a [`CompileError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileErrorKind {
	InvalidName,
	DuplicateNodeId,
	UnknownProducerReference,
	EmptyInput,
	ReservedContextType,
	RuntimeParameterTypeMismatch,
	MissingOutputKey,
	InvalidResolverConfig,
	CyclicGraph,
	AsymmetricEdge,
	UnknownNodeInDeploymentConfig,
	MissingExecutorSpec,
	SerializationFailure,
}

impl CompileError {
	pub fn kind(&self) -> CompileErrorKind {
		match self {
			Self::InvalidName { .. } => CompileErrorKind::InvalidName,
			Self::DuplicateNodeId { .. } => CompileErrorKind::DuplicateNodeId,
			Self::UnknownProducerReference { .. } => CompileErrorKind::UnknownProducerReference,
			Self::EmptyInput { .. } => CompileErrorKind::EmptyInput,
			Self::ReservedContextType { .. } => CompileErrorKind::ReservedContextType,
			Self::RuntimeParameterTypeMismatch { .. } => {
				CompileErrorKind::RuntimeParameterTypeMismatch
			}
			Self::MissingOutputKey { .. } => CompileErrorKind::MissingOutputKey,
			Self::InvalidResolverConfig { .. } => CompileErrorKind::InvalidResolverConfig,
			Self::CyclicGraph { .. } => CompileErrorKind::CyclicGraph,
			Self::AsymmetricEdge { .. } => CompileErrorKind::AsymmetricEdge,
			Self::UnknownNodeInDeploymentConfig { .. } => {
				CompileErrorKind::UnknownNodeInDeploymentConfig
			}
			Self::MissingExecutorSpec { .. } => CompileErrorKind::MissingExecutorSpec,
			Self::SerializationFailure(_) => CompileErrorKind::SerializationFailure,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cycle_message_lists_every_node() {
		let e = CompileError::CyclicGraph {
			cycle: vec!["A".into(), "B".into(), "C".into(), "A".into()],
		};
		assert_eq!(e.to_string(), "pipeline graph has a cycle: A -> B -> C -> A");
		assert_eq!(e.kind(), CompileErrorKind::CyclicGraph);
	}

	#[test]
	fn reference_site_message() {
		let e = CompileError::UnknownProducerReference {
			node_id: "Trainer".into(),
			site: ReferenceSite::Input("examples".into()),
			producer: "Nope".into(),
		};
		assert_eq!(
			e.to_string(),
			"node `Trainer` references unknown node `Nope` in its input `examples`"
		);

		let e = CompileError::UnknownProducerReference {
			node_id: "Trainer".into(),
			site: ReferenceSite::After,
			producer: "Nope".into(),
		};
		assert_eq!(
			e.to_string(),
			"node `Trainer` references unknown node `Nope` in its `after` list"
		);
	}
}
