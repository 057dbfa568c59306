//! Property tests over randomly generated acyclic pipelines

use proptest::prelude::*;
use std::collections::HashMap;
use weir_ir::{DeploymentEntry, ExecutableSpec, IrDocument, NodeId};

use crate::{
	compile, compile_with_report,
	decl::{DeploymentMap, NodeDecl, PipelineDecl},
	CompilerOptions,
};

/// A random DAG: node count, an adjacency matrix
/// (only entries `i < j` are used, so there are no cycles),
/// and whether to declare nodes in reverse order.
fn dag() -> impl Strategy<Value = (usize, Vec<bool>, bool)> {
	(1usize..9).prop_flat_map(|n| {
		(
			Just(n),
			proptest::collection::vec(any::<bool>(), n * n),
			any::<bool>(),
		)
	})
}

fn build((n, adjacency, reversed): &(usize, Vec<bool>, bool)) -> (PipelineDecl, DeploymentMap) {
	let mut nodes = Vec::new();
	let mut deployment = DeploymentMap::new();

	for j in 0..*n {
		let id = format!("N{j}");
		let mut node = NodeDecl::new(&id, "x.Node").with_output("out", "Blob");

		for i in 0..j {
			if !adjacency[i * n + j] {
				continue;
			}

			// Mix data and ordering edges
			if (i + j) % 3 == 0 {
				node.after.push(format!("N{i}").into());
			} else {
				node = node.with_input(&format!("in{i}"), &format!("N{i}"), "out");
			}
		}

		// Sometimes union two producers under one key
		if j >= 2 && adjacency[j] {
			node = node
				.with_input("union", "N0", "out")
				.with_input("union", "N1", "out");
		}

		deployment.insert(
			id.as_str().into(),
			DeploymentEntry {
				executor: ExecutableSpec::Native {
					implementation: "x.Executor".into(),
				},
				driver: None,
			},
		);
		nodes.push(node);
	}

	if *reversed {
		nodes.reverse();
	}

	let decl = PipelineDecl {
		pipeline_id: "prop".into(),
		pipeline_root: None,
		execution_mode: Default::default(),
		nodes,
	};
	return (decl, deployment);
}

fn layer_of(layers: &[Vec<NodeId>]) -> HashMap<&NodeId, usize> {
	layers
		.iter()
		.enumerate()
		.flat_map(|(i, l)| l.iter().map(move |id| (id, i)))
		.collect()
}

proptest! {
	#[test]
	fn compile_is_deterministic(g in dag()) {
		let (decl, deployment) = build(&g);
		let a = compile(&decl, &deployment).unwrap();
		let b = compile(&decl, &deployment).unwrap();

		let a_json = a.to_canonical_json().unwrap();
		prop_assert_eq!(&a_json, &b.to_canonical_json().unwrap());

		let decoded = IrDocument::from_json(&a_json).unwrap();
		prop_assert_eq!(decoded.to_canonical_json().unwrap(), a_json);
	}

	#[test]
	fn adjacency_is_symmetric(g in dag()) {
		let (decl, deployment) = build(&g);
		let doc = compile(&decl, &deployment).unwrap();

		for node in &doc.nodes {
			let id = &node.node_info.id;
			for up in &node.upstream_nodes {
				let up = doc.node(up.as_str()).unwrap();
				prop_assert!(up.downstream_nodes.contains(id));
			}
			for down in &node.downstream_nodes {
				let down = doc.node(down.as_str()).unwrap();
				prop_assert!(down.upstream_nodes.contains(id));
			}
		}
	}

	#[test]
	fn layers_follow_edges(g in dag()) {
		let (decl, deployment) = build(&g);
		let report = compile_with_report(&decl, &deployment, &CompilerOptions::default()).unwrap();
		let layer = layer_of(&report.layers);

		prop_assert_eq!(layer.len(), report.document.nodes.len());
		for node in &report.document.nodes {
			for up in &node.upstream_nodes {
				prop_assert!(layer[up] < layer[&node.node_info.id]);
			}
		}
	}
}
