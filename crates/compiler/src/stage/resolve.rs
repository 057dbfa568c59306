//! Turn declared inputs into channel queries.

use std::collections::BTreeMap;
use tracing::{debug, trace};
use weir_ir::{
	ArtifactQuery, ArtifactTypeRef, ChannelSpec, InputKey, InputSpec, ProducerNodeQuery,
	ResolverStep,
};

use crate::{
	decl::{ChannelDecl, InputDecl, ResolverStepDecl},
	errors::{CompileError, ReferenceSite},
	pipeline::{Node, Pipeline},
};

/// Resolve every input of every node.
///
/// Contexts must already be derived: channel context queries
/// are read from each producer's contexts.
pub fn resolve_channels(pipeline: &mut Pipeline) -> Result<(), CompileError> {
	debug!(message = "Resolving channels", pipeline_id = %pipeline.id);

	// Resolution only reads the pipeline,
	// so we collect results and write them afterwards.
	let mut resolved = Vec::with_capacity(pipeline.nodes.len());
	for node in &pipeline.nodes {
		let mut inputs = BTreeMap::new();
		for (input_key, input) in &node.input_decls {
			inputs.insert(
				input_key.clone(),
				resolve_input(pipeline, node, input_key, input)?,
			);
		}
		resolved.push(inputs);
	}

	for (node, inputs) in pipeline.nodes.iter_mut().zip(resolved) {
		node.inputs = inputs;
	}

	return Ok(());
}

fn resolve_input(
	pipeline: &Pipeline,
	node: &Node,
	input_key: &InputKey,
	input: &InputDecl,
) -> Result<InputSpec, CompileError> {
	let mut channels = Vec::with_capacity(input.channels.len());
	for channel in &input.channels {
		channels.push(resolve_channel(pipeline, node, input_key, channel)?);
	}

	let mut resolver_chain = Vec::with_capacity(input.resolver.len());
	for (i, step) in input.resolver.iter().enumerate() {
		resolver_chain.push(resolve_step(node, input_key, i, step)?);
	}

	trace!(
		message = "Resolved input",
		node_id = %node.id,
		input_key = %input_key,
		channels = channels.len(),
		resolver_steps = resolver_chain.len(),
	);

	return Ok(InputSpec {
		channels,
		resolver_chain,
		min_count: input.min_count,
	});
}

fn resolve_channel(
	pipeline: &Pipeline,
	node: &Node,
	input_key: &InputKey,
	channel: &ChannelDecl,
) -> Result<ChannelSpec, CompileError> {
	let producer = pipeline
		.node_idx(&channel.producer)
		.and_then(|i| pipeline.nodes.get(i))
		.ok_or_else(|| CompileError::UnknownProducerReference {
			node_id: node.id.clone(),
			site: ReferenceSite::Input(input_key.clone()),
			producer: channel.producer.clone(),
		})?;

	let artifact_type =
		producer
			.outputs
			.get(&channel.output)
			.ok_or_else(|| CompileError::MissingOutputKey {
				node_id: node.id.clone(),
				input_key: input_key.clone(),
				producer: producer.id.clone(),
				output_key: channel.output.clone(),
			})?;

	return Ok(ChannelSpec {
		producer_node_query: ProducerNodeQuery {
			id: producer.id.clone(),
		},
		context_queries: producer.contexts.clone(),
		artifact_query: ArtifactQuery {
			artifact_type: ArtifactTypeRef::from(artifact_type),
		},
		output_key: channel.output.clone(),
	});
}

fn resolve_step(
	node: &Node,
	input_key: &InputKey,
	step_idx: usize,
	step: &ResolverStepDecl,
) -> Result<ResolverStep, CompileError> {
	let invalid = |message: String| CompileError::InvalidResolverConfig {
		node_id: node.id.clone(),
		input_key: input_key.clone(),
		step: step_idx,
		message,
	};

	let config = match &step.config {
		None | Some(serde_json::Value::Null) => serde_json::Map::new(),
		Some(serde_json::Value::Object(x)) => x.clone(),

		Some(serde_json::Value::String(encoded)) => {
			match serde_json::from_str::<serde_json::Value>(encoded) {
				Ok(serde_json::Value::Object(x)) => x,
				Ok(_) => return Err(invalid("encoded config is not an object".into())),
				Err(e) => return Err(invalid(format!("could not parse encoded config: {e}"))),
			}
		}

		Some(_) => {
			return Err(invalid(
				"config must be an object or a string holding an object".into(),
			))
		}
	};

	return Ok(ResolverStep {
		op: step.op.clone(),
		config,
	});
}
