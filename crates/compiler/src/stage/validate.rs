//! Check the pipeline graph and compute adjacency.

use tracing::{debug, trace};
use weir_ir::{InputKey, NodeId};
use weir_util::graph::{finalized::FinalizedGraph, graph::Graph, util::GraphNodeIdx};

use crate::{
	errors::{CompileError, ReferenceSite},
	pipeline::Pipeline,
};

/// An edge of the pipeline graph
#[derive(Debug, Clone)]
pub enum EdgeKind {
	/// The target reads an output of the source through this input
	Data { input: InputKey },

	/// The target must run after the source
	After,
}

/// Build the pipeline graph, reject cycles,
/// and fill in every node's upstream and downstream nodes.
///
/// Adjacency lists are in declaration order.
/// Storage order of nodes is not changed.
pub fn validate(pipeline: &mut Pipeline) -> Result<(), CompileError> {
	debug!(message = "Validating pipeline graph", pipeline_id = %pipeline.id);

	let graph = build_graph(pipeline)?;

	// Nodes were added to the graph in declaration order,
	// so node order in the graph is declaration order.
	let node_ids = |graph: &FinalizedGraph<usize, EdgeKind>, idx: Vec<GraphNodeIdx>| {
		idx.into_iter()
			.filter_map(|i| graph.get_node(i))
			.filter_map(|i| pipeline.nodes.get(*i))
			.map(|n| n.id.clone())
			.collect::<Vec<_>>()
	};

	let mut adjacency = Vec::with_capacity(graph.len_nodes());
	for (idx, _) in graph.iter_nodes_idx() {
		adjacency.push((
			node_ids(&graph, graph.predecessors(idx)),
			node_ids(&graph, graph.successors(idx)),
		));
	}

	let layers: Vec<Vec<usize>> = graph
		.topological_layers()
		.into_iter()
		.map(|layer| {
			layer
				.into_iter()
				.filter_map(|i| graph.get_node(i).copied())
				.collect()
		})
		.collect();

	for (node, (upstream, downstream)) in pipeline.nodes.iter_mut().zip(adjacency) {
		node.upstream = upstream;
		node.downstream = downstream;
	}
	pipeline.layers = layers;

	check_symmetry(pipeline)?;

	debug!(
		message = "Pipeline graph is valid",
		pipeline_id = %pipeline.id,
		edges = graph.len_edges(),
		layers = pipeline.layers.len()
	);
	return Ok(());
}

fn build_graph(pipeline: &Pipeline) -> Result<FinalizedGraph<usize, EdgeKind>, CompileError> {
	let mut graph = Graph::new();
	let idx: Vec<GraphNodeIdx> = (0..pipeline.nodes.len()).map(|i| graph.add_node(i)).collect();

	let lookup = |node_id: &NodeId, producer: &NodeId, site: ReferenceSite| {
		pipeline
			.node_idx(producer)
			.and_then(|i| idx.get(i).copied())
			.ok_or_else(|| CompileError::UnknownProducerReference {
				node_id: node_id.clone(),
				site,
				producer: producer.clone(),
			})
	};

	for (i, node) in pipeline.nodes.iter().enumerate() {
		for (input_key, input) in &node.inputs {
			for channel in &input.channels {
				let from = lookup(
					&node.id,
					&channel.producer_node_query.id,
					ReferenceSite::Input(input_key.clone()),
				)?;

				trace!(
					message = "Adding data edge",
					from = %channel.producer_node_query.id,
					to = %node.id,
					input_key = %input_key
				);
				graph.add_edge(
					from,
					idx[i],
					EdgeKind::Data {
						input: input_key.clone(),
					},
				);
			}
		}

		for after in &node.after {
			let from = lookup(&node.id, after, ReferenceSite::After)?;
			trace!(message = "Adding `after` edge", from = %after, to = %node.id);
			graph.add_edge(from, idx[i], EdgeKind::After);
		}
	}

	trace!(message = "Looking for cycles", pipeline_id = %pipeline.id);
	return graph.finalize().map_err(|e| CompileError::CyclicGraph {
		cycle: e
			.cycle
			.iter()
			.filter_map(|i| idx.iter().position(|x| x == i))
			.filter_map(|i| pipeline.nodes.get(i))
			.map(|n| n.id.clone())
			.collect(),
	});
}

/// Make sure every upstream edge is also a downstream edge, and the reverse.
pub(crate) fn check_symmetry(pipeline: &Pipeline) -> Result<(), CompileError> {
	let find = |id: &NodeId| pipeline.node_idx(id).and_then(|i| pipeline.nodes.get(i));

	for node in &pipeline.nodes {
		for up in &node.upstream {
			let ok = find(up).is_some_and(|u| u.downstream.contains(&node.id));
			if !ok {
				return Err(CompileError::AsymmetricEdge {
					from: up.clone(),
					to: node.id.clone(),
				});
			}
		}

		for down in &node.downstream {
			let ok = find(down).is_some_and(|d| d.upstream.contains(&node.id));
			if !ok {
				return Err(CompileError::AsymmetricEdge {
					from: node.id.clone(),
					to: down.clone(),
				});
			}
		}
	}

	return Ok(());
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		compile::CompilerOptions,
		decl::{NodeDecl, PipelineDecl},
		errors::CompileErrorKind,
		stage::{assemble::assemble, context::derive_contexts, resolve::resolve_channels},
	};

	fn validated(nodes: Vec<NodeDecl>) -> Result<Pipeline, CompileError> {
		let decl = PipelineDecl {
			pipeline_id: "p".into(),
			pipeline_root: None,
			execution_mode: Default::default(),
			nodes,
		};
		let mut p = assemble(&decl, &CompilerOptions::default())?;
		derive_contexts(&mut p);
		resolve_channels(&mut p)?;
		validate(&mut p)?;
		return Ok(p);
	}

	fn ids(x: &[NodeId]) -> Vec<&str> {
		x.iter().map(|i| i.as_str()).collect()
	}

	#[test]
	fn adjacency_in_declaration_order() {
		let mut c = NodeDecl::new("C", "x.C")
			.with_input("b", "B", "out")
			.with_input("a", "A", "out")
			.with_input("a2", "A", "out");
		c.after.push("D".into());

		let p = validated(vec![
			NodeDecl::new("A", "x.A").with_output("out", "T"),
			NodeDecl::new("B", "x.B").with_output("out", "T"),
			c,
			NodeDecl::new("D", "x.D"),
		])
		.unwrap();

		let c = p.node("C").unwrap();
		assert_eq!(ids(c.upstream_nodes()), vec!["A", "B", "D"]);
		assert!(c.downstream_nodes().is_empty());
		assert_eq!(ids(p.node("A").unwrap().downstream_nodes()), vec!["C"]);
		assert_eq!(ids(p.node("D").unwrap().downstream_nodes()), vec!["C"]);

		// Storage order is unchanged
		let order: Vec<&str> = p.nodes().iter().map(|n| n.id().as_str()).collect();
		assert_eq!(order, vec!["A", "B", "C", "D"]);
	}

	#[test]
	fn layers_and_order() {
		let p = validated(vec![
			NodeDecl::new("C", "x.C").with_input("in", "B", "out"),
			NodeDecl::new("B", "x.B")
				.with_output("out", "T")
				.with_input("in", "A", "out"),
			NodeDecl::new("A", "x.A").with_output("out", "T"),
			NodeDecl::new("Z", "x.Z"),
		])
		.unwrap();

		let layers = p.topological_layers();
		let layers: Vec<Vec<&str>> = layers.iter().map(|l| ids(l)).collect();
		assert_eq!(layers, vec![vec!["A", "Z"], vec!["B"], vec!["C"]]);

		assert_eq!(ids(&p.topological_order()), vec!["A", "Z", "B", "C"]);
	}

	#[test]
	fn cycles_report_every_node() {
		let err = validated(vec![
			NodeDecl::new("A", "x.A")
				.with_output("out", "T")
				.with_input("in", "C", "out"),
			NodeDecl::new("B", "x.B")
				.with_output("out", "T")
				.with_input("in", "A", "out"),
			NodeDecl::new("C", "x.C")
				.with_output("out", "T")
				.with_input("in", "B", "out"),
		])
		.unwrap_err();

		match err {
			CompileError::CyclicGraph { cycle } => assert_eq!(ids(&cycle), vec!["A", "B", "C", "A"]),
			e => panic!("unexpected error: {e}"),
		}
	}

	#[test]
	fn after_edges_can_close_a_cycle() {
		let mut a = NodeDecl::new("A", "x.A").with_output("out", "T");
		a.after.push("B".into());
		let err = validated(vec![a, NodeDecl::new("B", "x.B").with_input("in", "A", "out")])
			.unwrap_err();
		assert_eq!(err.kind(), CompileErrorKind::CyclicGraph);
		assert_eq!(err.to_string(), "pipeline graph has a cycle: A -> B -> A");
	}

	#[test]
	fn self_reference_is_a_cycle() {
		let err = validated(vec![NodeDecl::new("A", "x.A")
			.with_output("out", "T")
			.with_input("in", "A", "out")])
		.unwrap_err();

		match err {
			CompileError::CyclicGraph { cycle } => assert_eq!(ids(&cycle), vec!["A", "A"]),
			e => panic!("unexpected error: {e}"),
		}
	}

	#[test]
	fn asymmetric_edges_are_caught() {
		let mut p = validated(vec![
			NodeDecl::new("A", "x.A").with_output("out", "T"),
			NodeDecl::new("B", "x.B").with_input("in", "A", "out"),
		])
		.unwrap();
		assert!(check_symmetry(&p).is_ok());

		p.nodes[0].downstream.clear();
		match check_symmetry(&p) {
			Err(CompileError::AsymmetricEdge { from, to }) => {
				assert_eq!(from.as_str(), "A");
				assert_eq!(to.as_str(), "B");
			}
			Err(e) => panic!("unexpected error: {e}"),
			Ok(()) => panic!("expected an asymmetric edge"),
		}
	}
}
