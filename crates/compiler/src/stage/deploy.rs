//! Attach deployment descriptors to a pipeline.

use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::{decl::DeploymentMap, errors::CompileError, pipeline::Pipeline};

/// Check `deployment` against the pipeline's nodes and attach it.
///
/// Every entry must name a node of this pipeline,
/// and every node that needs an executor must have one.
pub fn partition_deployment(
	pipeline: &mut Pipeline,
	deployment: &DeploymentMap,
) -> Result<(), CompileError> {
	debug!(
		message = "Partitioning deployment config",
		pipeline_id = %pipeline.id,
		entries = deployment.len()
	);

	for node_id in deployment.keys() {
		if pipeline.node_idx(node_id).is_none() {
			return Err(CompileError::UnknownNodeInDeploymentConfig {
				node_id: node_id.clone(),
			});
		}
	}

	for node in &pipeline.nodes {
		match deployment.get(&node.id) {
			Some(entry) if !node.kind.needs_executor() => {
				debug!(
					message = "Recording deployment entry for node without an executor",
					node_id = %node.id,
					executor = %entry.executor
				);
			}

			Some(entry) => {
				trace!(message = "Found executor", node_id = %node.id, executor = %entry.executor);
			}

			None if node.kind.needs_executor() => {
				return Err(CompileError::MissingExecutorSpec {
					node_id: node.id.clone(),
				});
			}

			None => {}
		}
	}

	pipeline.deployment = BTreeMap::clone(deployment);
	return Ok(());
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		compile::CompilerOptions,
		decl::{NodeDecl, NodeKind, PipelineDecl},
		errors::CompileErrorKind,
		stage::assemble::assemble,
	};
	use weir_ir::{DeploymentEntry, ExecutableSpec};

	fn assembled() -> Pipeline {
		let mut resolver = NodeDecl::new("Resolver", "x.Resolver");
		resolver.kind = NodeKind::Resolver;

		let decl = PipelineDecl {
			pipeline_id: "p".into(),
			pipeline_root: None,
			execution_mode: Default::default(),
			nodes: vec![NodeDecl::new("A", "x.A"), resolver],
		};
		assemble(&decl, &CompilerOptions::default()).unwrap()
	}

	fn native(implementation: &str) -> DeploymentEntry {
		DeploymentEntry {
			executor: ExecutableSpec::Native {
				implementation: implementation.into(),
			},
			driver: None,
		}
	}

	#[test]
	fn resolver_nodes_are_exempt() {
		let mut p = assembled();
		let map: DeploymentMap = [("A".into(), native("x.AExecutor"))].into_iter().collect();
		partition_deployment(&mut p, &map).unwrap();
		assert_eq!(p.deployment().len(), 1);
	}

	#[test]
	fn entries_for_exempt_nodes_are_kept() {
		let mut p = assembled();
		let map: DeploymentMap = [
			("A".into(), native("x.AExecutor")),
			("Resolver".into(), native("x.Noop")),
		]
		.into_iter()
		.collect();
		partition_deployment(&mut p, &map).unwrap();
		assert_eq!(p.deployment().len(), 2);
	}

	#[test]
	fn missing_executor() {
		let mut p = assembled();
		match partition_deployment(&mut p, &DeploymentMap::new()) {
			Err(CompileError::MissingExecutorSpec { node_id }) => assert_eq!(node_id.as_str(), "A"),
			Err(e) => panic!("unexpected error: {e}"),
			Ok(()) => panic!("expected a missing executor"),
		}
	}

	#[test]
	fn unknown_node() {
		let mut p = assembled();
		let map: DeploymentMap = [
			("A".into(), native("x.AExecutor")),
			("Ghost".into(), native("x.Ghost")),
		]
		.into_iter()
		.collect();
		let err = partition_deployment(&mut p, &map).unwrap_err();
		assert_eq!(err.kind(), CompileErrorKind::UnknownNodeInDeploymentConfig);
		assert!(p.deployment().is_empty());
	}
}
