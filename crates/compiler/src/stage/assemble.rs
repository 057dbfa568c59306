//! Build a [`Pipeline`] skeleton from a [`PipelineDecl`].

use itertools::Itertools;
use smartstring::{LazyCompact, SmartString};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};
use weir_ir::{
	is_canonical_context_type, ContextSpec, ExecutionOptions, FieldValue, NodeId, ParameterType,
	RuntimeParameter, RuntimeSpec, Value,
};
use weir_util::names::check_name;

use crate::{
	compile::CompilerOptions,
	decl::{ContextValueDecl, LiteralDecl, NodeDecl, ParameterDecl, PipelineDecl},
	errors::{CompileError, NameSubject, ReferenceSite},
	pipeline::{Node, Pipeline},
};

/// Create all nodes of `decl` and check that every reference between them is valid.
///
/// Contexts, channels, and adjacency are left empty.
pub fn assemble(decl: &PipelineDecl, options: &CompilerOptions) -> Result<Pipeline, CompileError> {
	let pipeline_id = decl.pipeline_id.as_str();
	debug!(message = "Assembling pipeline", pipeline_id, nodes = decl.nodes.len());

	check_name(pipeline_id).map_err(|source| CompileError::InvalidName {
		subject: NameSubject::Pipeline,
		name: decl.pipeline_id.clone(),
		source,
	})?;

	let mut nodes = Vec::with_capacity(decl.nodes.len());
	// Maps node ids to indices in `nodes`
	let mut node_index = HashMap::new();

	trace!(message = "Making nodes", pipeline_id);
	for node_decl in &decl.nodes {
		check_name(node_decl.id.as_str()).map_err(|source| CompileError::InvalidName {
			subject: NameSubject::Node,
			name: node_decl.id.id().clone(),
			source,
		})?;

		if node_index.contains_key(&node_decl.id) {
			return Err(CompileError::DuplicateNodeId {
				node_id: node_decl.id.clone(),
			});
		}

		trace!(message = "Adding node", pipeline_id, node_id = %node_decl.id);
		node_index.insert(node_decl.id.clone(), nodes.len());
		nodes.push(build_node(node_decl)?);
	}

	// References are checked once every node exists,
	// since a node may read from one declared after it.
	trace!(message = "Checking references", pipeline_id);
	for node in &nodes {
		for (input_key, input) in &node.input_decls {
			if input.channels.is_empty() {
				return Err(CompileError::EmptyInput {
					node_id: node.id.clone(),
					input_key: input_key.clone(),
				});
			}

			for channel in &input.channels {
				if !node_index.contains_key(&channel.producer) {
					return Err(CompileError::UnknownProducerReference {
						node_id: node.id.clone(),
						site: ReferenceSite::Input(input_key.clone()),
						producer: channel.producer.clone(),
					});
				}
			}
		}

		for after in &node.after {
			if !node_index.contains_key(after) {
				return Err(CompileError::UnknownProducerReference {
					node_id: node.id.clone(),
					site: ReferenceSite::After,
					producer: after.clone(),
				});
			}
		}
	}

	let mut pipeline_root = RuntimeParameter::string(&options.pipeline_root_parameter);
	pipeline_root.default_value = decl.pipeline_root.clone().map(FieldValue::StringValue);

	return Ok(Pipeline {
		id: decl.pipeline_id.clone(),
		nodes,
		node_index,
		runtime_spec: RuntimeSpec {
			pipeline_root,
			pipeline_run_id: RuntimeParameter::string(&options.pipeline_run_parameter),
		},
		execution_mode: decl.execution_mode,
		deployment: BTreeMap::new(),
		layers: Vec::new(),
	});
}

fn build_node(decl: &NodeDecl) -> Result<Node, CompileError> {
	let mut extra_contexts = Vec::with_capacity(decl.contexts.len());
	for context in &decl.contexts {
		if is_canonical_context_type(&context.context_type) {
			return Err(CompileError::ReservedContextType {
				node_id: decl.id.clone(),
				context_type: context.context_type.clone(),
			});
		}

		let value = match &context.value {
			ContextValueDecl::Literal(x) => Value::string(x.clone()),
			ContextValueDecl::RuntimeParameter { runtime_parameter } => {
				Value::RuntimeParameter(RuntimeParameter::string(runtime_parameter))
			}
		};

		extra_contexts.push(ContextSpec::new(&context.context_type, value));
	}

	let mut parameters = BTreeMap::new();
	for (key, value) in &decl.parameters {
		parameters.insert(key.clone(), build_parameter(&decl.id, key, value)?);
	}

	return Ok(Node {
		id: decl.id.clone(),
		node_type: decl.node_type.clone(),
		kind: decl.kind,
		extra_contexts,
		contexts: Vec::new(),
		input_decls: decl.inputs.clone(),
		inputs: BTreeMap::new(),
		outputs: decl.outputs.clone(),
		parameters,
		after: decl.after.iter().unique().cloned().collect(),
		upstream: Vec::new(),
		downstream: Vec::new(),
		execution_options: ExecutionOptions {
			enable_cache: decl.enable_cache,
			max_execution_retries: decl.max_execution_retries,
		},
	});
}

fn build_parameter(
	node_id: &NodeId,
	key: &SmartString<LazyCompact>,
	value: &ParameterDecl,
) -> Result<Value, CompileError> {
	let runtime_parameter = match value {
		ParameterDecl::Literal(x) => return Ok(Value::FieldValue(x.to_field_value())),
		ParameterDecl::RuntimeParameter { runtime_parameter } => runtime_parameter,
	};

	let default_value = match &runtime_parameter.default_value {
		None => None,

		Some(default) => {
			let value = match (runtime_parameter.parameter_type, default) {
				// Integer literals are valid doubles if no precision is lost
				(ParameterType::Double, LiteralDecl::Int(x)) => {
					let widened = *x as f64;
					if widened as i128 != i128::from(*x) {
						return Err(CompileError::RuntimeParameterTypeMismatch {
							node_id: node_id.clone(),
							parameter: key.clone(),
							expected: ParameterType::Double,
							found: ParameterType::Int,
						});
					}
					FieldValue::DoubleValue(widened)
				}
				(_, x) => x.to_field_value(),
			};

			if value.kind() != runtime_parameter.parameter_type {
				return Err(CompileError::RuntimeParameterTypeMismatch {
					node_id: node_id.clone(),
					parameter: key.clone(),
					expected: runtime_parameter.parameter_type,
					found: value.kind(),
				});
			}

			Some(value)
		}
	};

	return Ok(Value::RuntimeParameter(RuntimeParameter {
		name: runtime_parameter.name.clone(),
		parameter_type: runtime_parameter.parameter_type,
		default_value,
	}));
}
