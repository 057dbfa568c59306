use smartstring::{LazyCompact, SmartString};
use tracing::info;
use weir_ir::{IrDocument, NodeId, PIPELINE_ROOT_PARAMETER, PIPELINE_RUN_ID_PARAMETER};

use crate::{
	decl::{DeploymentMap, PipelineDecl},
	errors::CompileError,
	pipeline::Pipeline,
	stage::{
		assemble::assemble, context::derive_contexts, deploy::partition_deployment, emit::emit,
		resolve::resolve_channels, validate::validate,
	},
};

/// Names the compiler gives to runtime parameters
#[derive(Debug, Clone)]
pub struct CompilerOptions {
	/// The runtime parameter holding the run id
	pub pipeline_run_parameter: SmartString<LazyCompact>,

	/// The runtime parameter holding the pipeline root
	pub pipeline_root_parameter: SmartString<LazyCompact>,
}

impl Default for CompilerOptions {
	fn default() -> Self {
		Self {
			pipeline_run_parameter: PIPELINE_RUN_ID_PARAMETER.into(),
			pipeline_root_parameter: PIPELINE_ROOT_PARAMETER.into(),
		}
	}
}

/// Sizes of a compiled pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileCounts {
	pub nodes: usize,

	/// Distinct (upstream, downstream) pairs
	pub edges: usize,

	pub channels: usize,
	pub resolver_steps: usize,
	pub deployment_entries: usize,
}

impl CompileCounts {
	fn of(pipeline: &Pipeline) -> Self {
		let inputs = || pipeline.nodes.iter().flat_map(|n| n.inputs.values());
		Self {
			nodes: pipeline.nodes.len(),
			edges: pipeline.nodes.iter().map(|n| n.upstream.len()).sum(),
			channels: inputs().map(|i| i.channels.len()).sum(),
			resolver_steps: inputs().map(|i| i.resolver_chain.len()).sum(),
			deployment_entries: pipeline.deployment.len(),
		}
	}
}

/// A compiled document, plus facts about the compilation
#[derive(Debug, Clone)]
pub struct CompileReport {
	pub document: IrDocument,

	/// See [`Pipeline::topological_layers`]
	pub layers: Vec<Vec<NodeId>>,

	pub counts: CompileCounts,
}

/// Run every stage except emission.
pub fn build_pipeline(
	decl: &PipelineDecl,
	deployment: &DeploymentMap,
	options: &CompilerOptions,
) -> Result<Pipeline, CompileError> {
	let mut pipeline = assemble(decl, options)?;
	derive_contexts(&mut pipeline);
	resolve_channels(&mut pipeline)?;
	validate(&mut pipeline)?;
	partition_deployment(&mut pipeline, deployment)?;
	return Ok(pipeline);
}

/// Compile a pipeline with default options.
///
/// Identical inputs always produce identical documents.
pub fn compile(decl: &PipelineDecl, deployment: &DeploymentMap) -> Result<IrDocument, CompileError> {
	return compile_with_options(decl, deployment, &CompilerOptions::default());
}

pub fn compile_with_options(
	decl: &PipelineDecl,
	deployment: &DeploymentMap,
	options: &CompilerOptions,
) -> Result<IrDocument, CompileError> {
	return Ok(compile_with_report(decl, deployment, options)?.document);
}

/// Compile a pipeline, and also return its layers and sizes.
pub fn compile_with_report(
	decl: &PipelineDecl,
	deployment: &DeploymentMap,
	options: &CompilerOptions,
) -> Result<CompileReport, CompileError> {
	let pipeline = build_pipeline(decl, deployment, options)?;
	let document = emit(&pipeline)?;
	let counts = CompileCounts::of(&pipeline);

	info!(
		message = "Compiled pipeline",
		pipeline_id = pipeline.id(),
		nodes = counts.nodes,
		edges = counts.edges,
		channels = counts.channels
	);

	return Ok(CompileReport {
		document,
		layers: pipeline.topological_layers(),
		counts,
	});
}
