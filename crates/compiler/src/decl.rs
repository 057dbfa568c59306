//! Pipeline declarations, as written by users.
//!
//! This is the first step of compilation:
//! a [`PipelineDecl`] is deserialized directly from JSON or TOML
//! and has not been checked in any way.

use serde::{
	de::{self, Visitor},
	Deserialize, Deserializer, Serialize,
};
use serde_with::rust::maps_duplicate_key_is_error;
use smartstring::{LazyCompact, SmartString};
use std::{
	collections::BTreeMap,
	fmt::Formatter,
	ops::{Deref, DerefMut},
};
use weir_ir::{
	ArtifactType, DeploymentEntry, ExecutionMode, FieldValue, InputKey, NodeId, NodeType,
	OutputKey, ParameterType, ResolverOp,
};

/// Deployment descriptors for a pipeline, keyed by node id.
///
/// A node id may appear only once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentMap(
	#[serde(deserialize_with = "maps_duplicate_key_is_error::deserialize")]
	BTreeMap<NodeId, DeploymentEntry>,
);

impl DeploymentMap {
	pub fn new() -> Self {
		Self(BTreeMap::new())
	}
}

impl Deref for DeploymentMap {
	type Target = BTreeMap<NodeId, DeploymentEntry>;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for DeploymentMap {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl FromIterator<(NodeId, DeploymentEntry)> for DeploymentMap {
	fn from_iter<I: IntoIterator<Item = (NodeId, DeploymentEntry)>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

fn default_enable_cache() -> bool {
	true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineDecl {
	pub pipeline_id: SmartString<LazyCompact>,

	/// The default value of the `pipeline-root` runtime parameter
	#[serde(default)]
	pub pipeline_root: Option<String>,

	#[serde(default)]
	pub execution_mode: ExecutionMode,

	/// Nodes in this pipeline, in declaration order
	pub nodes: Vec<NodeDecl>,
}

impl PipelineDecl {
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}
}

/// What kind of behavior a node has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
	/// A node with an externally implemented executor
	#[default]
	Component,

	/// A node that only selects artifacts
	Resolver,

	/// A node that registers existing artifacts
	Importer,
}

impl NodeKind {
	/// Must this node have an executor in the deployment map?
	pub fn needs_executor(&self) -> bool {
		matches!(self, Self::Component)
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDecl {
	pub id: NodeId,
	pub node_type: NodeType,

	#[serde(default)]
	pub kind: NodeKind,

	/// Contexts added after the canonical ones
	#[serde(default)]
	pub contexts: Vec<ContextDecl>,

	#[serde(default, deserialize_with = "maps_duplicate_key_is_error::deserialize")]
	pub inputs: BTreeMap<InputKey, InputDecl>,

	#[serde(default, deserialize_with = "maps_duplicate_key_is_error::deserialize")]
	pub outputs: BTreeMap<OutputKey, ArtifactType>,

	#[serde(default, deserialize_with = "maps_duplicate_key_is_error::deserialize")]
	pub parameters: BTreeMap<SmartString<LazyCompact>, ParameterDecl>,

	/// Nodes that must run before this one,
	/// in addition to the producers of this node's inputs
	#[serde(default)]
	pub after: Vec<NodeId>,

	#[serde(default = "default_enable_cache")]
	pub enable_cache: bool,

	#[serde(default)]
	pub max_execution_retries: Option<u32>,
}

impl NodeDecl {
	/// A component node with no inputs, outputs, or parameters
	pub fn new(id: &str, type_name: &str) -> Self {
		Self {
			id: id.into(),
			node_type: NodeType {
				name: type_name.into(),
				base_type: None,
			},
			kind: NodeKind::Component,
			contexts: Vec::new(),
			inputs: BTreeMap::new(),
			outputs: BTreeMap::new(),
			parameters: BTreeMap::new(),
			after: Vec::new(),
			enable_cache: true,
			max_execution_retries: None,
		}
	}

	/// Add an output with the given artifact type name
	pub fn with_output(mut self, key: &str, type_name: &str) -> Self {
		self.outputs.insert(
			key.into(),
			ArtifactType {
				name: type_name.into(),
				base_type: None,
				properties: BTreeMap::new(),
			},
		);
		self
	}

	/// Add an input reading `producer.output`.
	/// Repeated calls with the same key make a union.
	pub fn with_input(mut self, key: &str, producer: &str, output: &str) -> Self {
		self.inputs
			.entry(key.into())
			.or_insert_with(|| InputDecl {
				channels: Vec::new(),
				resolver: Vec::new(),
				min_count: None,
			})
			.channels
			.push(ChannelDecl {
				producer: producer.into(),
				output: output.into(),
			});
		self
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextDecl {
	#[serde(rename = "type")]
	pub context_type: SmartString<LazyCompact>,
	pub value: ContextValueDecl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValueDecl {
	Literal(String),

	/// A string-typed runtime parameter
	RuntimeParameter {
		runtime_parameter: SmartString<LazyCompact>,
	},
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputDecl {
	/// The producers this input reads.
	/// More than one makes a union.
	pub channels: Vec<ChannelDecl>,

	#[serde(default)]
	pub resolver: Vec<ResolverStepDecl>,

	#[serde(default)]
	pub min_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelDecl {
	pub producer: NodeId,
	pub output: OutputKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverStepDecl {
	pub op: ResolverOp,

	/// An object, a string holding an encoded object, or nothing.
	/// Anything else is rejected when channels are resolved.
	#[serde(default)]
	pub config: Option<serde_json::Value>,
}

/// A literal parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralDecl {
	Bool(bool),
	Int(i64),
	Double(f64),
	String(String),
}

// Integers that do not fit in an `i64` are rejected
// instead of being read as lossy doubles.
struct LiteralDeclVisitor;
impl Visitor<'_> for LiteralDeclVisitor {
	type Value = LiteralDecl;

	fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		formatter.write_str("a boolean, a 64-bit integer, a double, or a string")
	}

	fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
		Ok(LiteralDecl::Bool(v))
	}

	fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
		Ok(LiteralDecl::Int(v))
	}

	fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
		match i64::try_from(v) {
			Ok(x) => Ok(LiteralDecl::Int(x)),
			Err(_) => Err(E::custom(format!("integer `{v}` does not fit in 64 signed bits"))),
		}
	}

	fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
		Ok(LiteralDecl::Double(v))
	}

	fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
		Ok(LiteralDecl::String(v.into()))
	}

	fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
		Ok(LiteralDecl::String(v))
	}
}

impl<'de> Deserialize<'de> for LiteralDecl {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_any(LiteralDeclVisitor)
	}
}

impl LiteralDecl {
	/// Convert this literal to an IR value.
	/// Booleans become integers.
	pub fn to_field_value(&self) -> FieldValue {
		match self {
			Self::Bool(x) => FieldValue::IntValue(i64::from(*x)),
			Self::Int(x) => FieldValue::IntValue(*x),
			Self::Double(x) => FieldValue::DoubleValue(*x),
			Self::String(x) => FieldValue::StringValue(x.clone()),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeParameterDecl {
	pub name: SmartString<LazyCompact>,

	#[serde(rename = "type")]
	pub parameter_type: ParameterType,

	#[serde(default)]
	pub default_value: Option<LiteralDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterDecl {
	Literal(LiteralDecl),
	RuntimeParameter {
		runtime_parameter: RuntimeParameterDecl,
	},
}
