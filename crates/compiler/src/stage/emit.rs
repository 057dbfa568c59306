//! Write a compiled pipeline as an IR document.

use tracing::debug;
use weir_ir::{
	ArtifactSpec, IrDocument, NodeInfo, OutputSpec, PipelineInfo, PipelineNode, IR_VERSION,
};

use crate::{errors::CompileError, pipeline::Pipeline};

/// Build the IR document for a fully compiled pipeline.
///
/// This never reorders anything:
/// nodes keep declaration order, and maps are ordered by key.
pub fn emit(pipeline: &Pipeline) -> Result<IrDocument, CompileError> {
	debug!(message = "Emitting IR", pipeline_id = %pipeline.id);

	let nodes = pipeline
		.nodes
		.iter()
		.map(|node| PipelineNode {
			node_info: NodeInfo {
				node_type: node.node_type.clone(),
				id: node.id.clone(),
			},
			contexts: node.contexts.clone(),
			inputs: node.inputs.clone(),
			outputs: node
				.outputs
				.iter()
				.map(|(key, artifact_type)| {
					(
						key.clone(),
						OutputSpec {
							artifact_spec: ArtifactSpec {
								artifact_type: artifact_type.clone(),
							},
						},
					)
				})
				.collect(),
			parameters: node.parameters.clone(),
			upstream_nodes: node.upstream.clone(),
			downstream_nodes: node.downstream.clone(),
			execution_options: node.execution_options.clone(),
		})
		.collect();

	let document = IrDocument {
		ir_version: IR_VERSION,
		pipeline_info: PipelineInfo {
			id: pipeline.id.clone(),
		},
		nodes,
		runtime_spec: pipeline.runtime_spec.clone(),
		execution_mode: pipeline.execution_mode,
		deployment_config: pipeline.deployment.clone(),
	};

	// Anything we cannot encode is a bug in an earlier stage
	// or a bad literal in the declaration. Either way, no partial output.
	document.check_finite()?;

	return Ok(document);
}
