//! Attach contexts to every node.

use tracing::{debug, trace};
use weir_ir::{
	ContextSpec, NodeId, RuntimeParameter, Value, NODE_CONTEXT_TYPE, PIPELINE_CONTEXT_TYPE,
	PIPELINE_RUN_CONTEXT_TYPE,
};

use crate::pipeline::Pipeline;

/// The three contexts every node carries, in order:
/// pipeline, pipeline run, and node.
pub fn canonical_contexts(
	pipeline_id: &str,
	run_parameter: &RuntimeParameter,
	node_id: &NodeId,
) -> [ContextSpec; 3] {
	return [
		ContextSpec::new(PIPELINE_CONTEXT_TYPE, Value::string(pipeline_id)),
		ContextSpec::new(
			PIPELINE_RUN_CONTEXT_TYPE,
			Value::RuntimeParameter(run_parameter.clone()),
		),
		ContextSpec::new(
			NODE_CONTEXT_TYPE,
			Value::string(format!("{pipeline_id}.{node_id}")),
		),
	];
}

/// Set every node's contexts to the canonical contexts
/// followed by the node's declared contexts.
///
/// This replaces any contexts already present,
/// so running it twice gives the same result.
pub fn derive_contexts(pipeline: &mut Pipeline) {
	debug!(message = "Deriving contexts", pipeline_id = %pipeline.id);

	for node in &mut pipeline.nodes {
		let mut contexts: Vec<ContextSpec> =
			canonical_contexts(&pipeline.id, &pipeline.runtime_spec.pipeline_run_id, &node.id).into();
		contexts.extend(node.extra_contexts.iter().cloned());

		trace!(
			message = "Derived contexts",
			node_id = %node.id,
			count = contexts.len()
		);
		node.contexts = contexts;
	}
}
