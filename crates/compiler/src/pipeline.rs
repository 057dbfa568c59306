use smartstring::{LazyCompact, SmartString};
use std::collections::{BTreeMap, HashMap};
use weir_ir::{
	ArtifactType, ContextSpec, DeploymentEntry, ExecutionMode, ExecutionOptions, InputKey,
	InputSpec, NodeId, NodeType, OutputKey, RuntimeSpec, Value,
};

use crate::decl::{InputDecl, NodeKind};

//
// MARK: Pipeline
//

/// A pipeline being compiled.
///
/// A [`Pipeline`] is created by the assembly stage
/// and filled in by each later stage.
/// Nodes reference each other by id, never by pointer.
#[derive(Debug, Clone)]
pub struct Pipeline {
	pub(crate) id: SmartString<LazyCompact>,

	/// Nodes in declaration order
	pub(crate) nodes: Vec<Node>,

	/// Maps node ids to indices in `nodes`
	pub(crate) node_index: HashMap<NodeId, usize>,

	pub(crate) runtime_spec: RuntimeSpec,
	pub(crate) execution_mode: ExecutionMode,

	/// Filled in by the deployment stage
	pub(crate) deployment: BTreeMap<NodeId, DeploymentEntry>,

	/// Node indices grouped into topological layers.
	/// Filled in by the validation stage.
	pub(crate) layers: Vec<Vec<usize>>,
}

impl Pipeline {
	/// This pipeline's id
	pub fn id(&self) -> &str {
		&self.id
	}

	/// All nodes in declaration order
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Find a node by id
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.node_index
			.get(&NodeId::new(id))
			.and_then(|i| self.nodes.get(*i))
	}

	pub(crate) fn node_idx(&self, id: &NodeId) -> Option<usize> {
		self.node_index.get(id).copied()
	}

	pub fn runtime_spec(&self) -> &RuntimeSpec {
		&self.runtime_spec
	}

	pub fn execution_mode(&self) -> ExecutionMode {
		self.execution_mode
	}

	pub fn deployment(&self) -> &BTreeMap<NodeId, DeploymentEntry> {
		&self.deployment
	}

	/// Node ids grouped into layers.
	/// Every node's upstream nodes are in earlier layers,
	/// and each layer is in declaration order.
	///
	/// This is empty until the pipeline has been validated.
	pub fn topological_layers(&self) -> Vec<Vec<NodeId>> {
		self.layers
			.iter()
			.map(|layer| layer.iter().map(|i| self.nodes[*i].id.clone()).collect())
			.collect()
	}

	/// Node ids in an order where every node follows its upstream nodes.
	/// This is [`Self::topological_layers`], flattened.
	pub fn topological_order(&self) -> Vec<NodeId> {
		self.topological_layers().into_iter().flatten().collect()
	}
}

//
// MARK: Node
//

/// One node of a [`Pipeline`]
#[derive(Debug, Clone)]
pub struct Node {
	pub(crate) id: NodeId,
	pub(crate) node_type: NodeType,
	pub(crate) kind: NodeKind,

	/// Contexts declared by the user, already checked
	pub(crate) extra_contexts: Vec<ContextSpec>,

	/// All of this node's contexts.
	/// Filled in by the context stage.
	pub(crate) contexts: Vec<ContextSpec>,

	/// Inputs as declared.
	/// Producers are known to exist.
	pub(crate) input_decls: BTreeMap<InputKey, InputDecl>,

	/// Filled in by the channel stage
	pub(crate) inputs: BTreeMap<InputKey, InputSpec>,

	pub(crate) outputs: BTreeMap<OutputKey, ArtifactType>,
	pub(crate) parameters: BTreeMap<SmartString<LazyCompact>, Value>,

	/// Ordering-only predecessors, without duplicates
	pub(crate) after: Vec<NodeId>,

	/// Filled in by the validation stage
	pub(crate) upstream: Vec<NodeId>,

	/// Filled in by the validation stage
	pub(crate) downstream: Vec<NodeId>,

	pub(crate) execution_options: ExecutionOptions,
}

impl Node {
	pub fn id(&self) -> &NodeId {
		&self.id
	}

	pub fn node_type(&self) -> &NodeType {
		&self.node_type
	}

	pub fn kind(&self) -> NodeKind {
		self.kind
	}

	pub fn contexts(&self) -> &[ContextSpec] {
		&self.contexts
	}

	pub fn inputs(&self) -> &BTreeMap<InputKey, InputSpec> {
		&self.inputs
	}

	pub fn outputs(&self) -> &BTreeMap<OutputKey, ArtifactType> {
		&self.outputs
	}

	pub fn parameters(&self) -> &BTreeMap<SmartString<LazyCompact>, Value> {
		&self.parameters
	}

	pub fn upstream_nodes(&self) -> &[NodeId] {
		&self.upstream
	}

	pub fn downstream_nodes(&self) -> &[NodeId] {
		&self.downstream
	}

	pub fn execution_options(&self) -> &ExecutionOptions {
		&self.execution_options
	}
}
