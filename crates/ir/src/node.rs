use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use smartstring::{LazyCompact, SmartString};
use std::{collections::BTreeMap, fmt::Display};

use crate::{labels::*, value::Value};

//
// MARK: Types
//

/// A coarse category of node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeBaseType {
	Ingest,
	Process,
	Transform,
	Train,
	InfraValidate,
	Deploy,
}

/// A coarse category of artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactBaseType {
	Dataset,
	Model,
	Metrics,
	Statistics,
}

/// The scalar kind of an artifact property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyType {
	Int,
	Double,
	String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeType {
	/// The component class this node runs
	pub name: SmartString<LazyCompact>,
	pub base_type: Option<NodeBaseType>,
}

/// The full shape of an artifact type, as declared by its producer
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactType {
	pub name: SmartString<LazyCompact>,
	pub base_type: Option<ArtifactBaseType>,

	#[serde(default)]
	pub properties: BTreeMap<SmartString<LazyCompact>, PropertyType>,
}

/// An artifact type filter.
/// This is an [`ArtifactType`] without its property schema.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactTypeRef {
	pub name: SmartString<LazyCompact>,
	pub base_type: Option<ArtifactBaseType>,
}

impl From<&ArtifactType> for ArtifactTypeRef {
	fn from(value: &ArtifactType) -> Self {
		Self {
			name: value.name.clone(),
			base_type: value.base_type,
		}
	}
}

//
// MARK: Contexts
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextType {
	pub name: SmartString<LazyCompact>,
}

/// A typed join key attached to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSpec {
	#[serde(rename = "type")]
	pub context_type: ContextType,
	pub name: Value,
}

impl ContextSpec {
	pub fn new(context_type: &str, name: Value) -> Self {
		Self {
			context_type: ContextType {
				name: context_type.into(),
			},
			name,
		}
	}
}

//
// MARK: Channels
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerNodeQuery {
	pub id: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactQuery {
	#[serde(rename = "type")]
	pub artifact_type: ArtifactTypeRef,
}

/// A query for the artifacts one producer writes to one output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpec {
	pub producer_node_query: ProducerNodeQuery,

	/// These are always the producer's own contexts
	pub context_queries: Vec<ContextSpec>,

	pub artifact_query: ArtifactQuery,
	pub output_key: OutputKey,
}

/// A resolver operation.
///
/// Operations are open-ended: names we do not know are kept as [`Self::Custom`]
/// and passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResolverOp {
	/// Flatten one level of a grouped artifact set
	Unnest,

	/// Skip the consuming node if the artifact set is empty
	SkipIfEmpty,

	/// Keep only the newest artifact of each group
	LatestArtifact,

	Custom(SmartString<LazyCompact>),
}

impl ResolverOp {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Unnest => "unnest",
			Self::SkipIfEmpty => "skip_if_empty",
			Self::LatestArtifact => "latest_artifact",
			Self::Custom(x) => x.as_str(),
		}
	}
}

impl Display for ResolverOp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl From<&str> for ResolverOp {
	fn from(value: &str) -> Self {
		match value {
			"unnest" => Self::Unnest,
			"skip_if_empty" => Self::SkipIfEmpty,
			"latest_artifact" => Self::LatestArtifact,
			x => Self::Custom(x.into()),
		}
	}
}

impl From<String> for ResolverOp {
	fn from(value: String) -> Self {
		Self::from(value.as_str())
	}
}

impl From<ResolverOp> for String {
	fn from(value: ResolverOp) -> Self {
		value.as_str().into()
	}
}

/// One step of a resolver chain.
/// `config` is opaque to the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverStep {
	pub op: ResolverOp,
	pub config: serde_json::Map<String, serde_json::Value>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
	/// More than one channel means a union
	pub channels: Vec<ChannelSpec>,

	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub resolver_chain: Vec<ResolverStep>,

	pub min_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSpec {
	#[serde(rename = "type")]
	pub artifact_type: ArtifactType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
	pub artifact_spec: ArtifactSpec,
}

//
// MARK: Nodes
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
	#[serde(rename = "type")]
	pub node_type: NodeType,
	pub id: NodeId,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOptions {
	pub enable_cache: bool,
	pub max_execution_retries: Option<u32>,
}

/// One compiled node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineNode {
	pub node_info: NodeInfo,
	pub contexts: Vec<ContextSpec>,
	pub inputs: BTreeMap<InputKey, InputSpec>,
	pub outputs: BTreeMap<OutputKey, OutputSpec>,
	pub parameters: BTreeMap<SmartString<LazyCompact>, Value>,

	/// In declaration order
	pub upstream_nodes: Vec<NodeId>,

	/// In declaration order
	pub downstream_nodes: Vec<NodeId>,

	pub execution_options: ExecutionOptions,
}
