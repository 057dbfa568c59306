use std::fmt::Debug;

use super::{
	graph::Graph,
	util::{GraphEdgeIdx, GraphNodeIdx},
};

/// An immutable directed graph with parallel edges.
/// This is guaranteed to have no (directed) cycles.
///
/// All read operations are fast.
pub struct FinalizedGraph<NodeType, EdgeType>
where
	NodeType: Debug,
	EdgeType: Debug,
{
	/// The graph data
	pub(super) graph: Graph<NodeType, EdgeType>,

	/// An array of edge idx, sorted by start node.
	/// Redundant, but makes reads faster.
	pub(super) edge_map_out: Vec<Vec<GraphEdgeIdx>>,

	/// An array of edge idx, sorted by end node.
	/// Redundant, but makes reads faster.
	pub(super) edge_map_in: Vec<Vec<GraphEdgeIdx>>,
}

impl<NodeType, EdgeType> Debug for FinalizedGraph<NodeType, EdgeType>
where
	NodeType: Debug,
	EdgeType: Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FinalizedGraph")
			.field("nodes", &self.graph.nodes)
			.field("edges", &self.graph.edges)
			.finish()
	}
}

impl<NodeType, EdgeType> FinalizedGraph<NodeType, EdgeType>
where
	NodeType: Debug,
	EdgeType: Debug,
{
	/// Get a node by index
	#[inline]
	pub fn get_node(&self, node_idx: GraphNodeIdx) -> Option<&NodeType> {
		self.graph.get_node(node_idx)
	}

	/// The number of nodes in this graph
	#[inline]
	pub fn len_nodes(&self) -> usize {
		self.graph.len_nodes()
	}

	/// Iterate over all nodes in this graph, including node index
	#[inline]
	pub fn iter_nodes_idx(&self) -> impl Iterator<Item = (GraphNodeIdx, &NodeType)> {
		self.graph.iter_nodes_idx()
	}

	/// Get an edge by index
	#[inline]
	pub fn get_edge(
		&self,
		edge_idx: GraphEdgeIdx,
	) -> Option<(GraphNodeIdx, GraphNodeIdx, &EdgeType)> {
		self.graph
			.edges
			.get(usize::from(edge_idx))
			.map(|(f, t, v)| (*f, *t, v))
	}

	/// The number of edges in this graph
	#[inline]
	pub fn len_edges(&self) -> usize {
		self.graph.len_edges()
	}

	/// Get all edges starting at the given node
	pub fn edges_starting_at(&self, node: GraphNodeIdx) -> &[GraphEdgeIdx] {
		self.edge_map_out
			.get(usize::from(node))
			.map(|x| x.as_slice())
			.unwrap_or(&[])
	}

	/// Get all edges ending at the given node
	pub fn edges_ending_at(&self, node: GraphNodeIdx) -> &[GraphEdgeIdx] {
		self.edge_map_in
			.get(usize::from(node))
			.map(|x| x.as_slice())
			.unwrap_or(&[])
	}

	/// The distinct nodes with an edge into `node`, in node order.
	pub fn predecessors(&self, node: GraphNodeIdx) -> Vec<GraphNodeIdx> {
		let mut out: Vec<GraphNodeIdx> = self
			.edges_ending_at(node)
			.iter()
			.filter_map(|e| self.get_edge(*e).map(|(f, _, _)| f))
			.collect();
		out.sort();
		out.dedup();
		return out;
	}

	/// The distinct nodes with an edge from `node`, in node order.
	pub fn successors(&self, node: GraphNodeIdx) -> Vec<GraphNodeIdx> {
		let mut out: Vec<GraphNodeIdx> = self
			.edges_starting_at(node)
			.iter()
			.filter_map(|e| self.get_edge(*e).map(|(_, t, _)| t))
			.collect();
		out.sort();
		out.dedup();
		return out;
	}

	/// Group nodes into layers.
	///
	/// Every edge into a node in layer `n` starts in some layer `< n`,
	/// and every node is placed in the earliest layer that allows this.
	/// Nodes inside a layer are in node order.
	pub fn topological_layers(&self) -> Vec<Vec<GraphNodeIdx>> {
		let mut in_degree: Vec<usize> = (0..self.len_nodes())
			.map(|i| self.edge_map_in[i].len())
			.collect();

		let mut layers = Vec::new();
		let mut current: Vec<GraphNodeIdx> = (0..self.len_nodes())
			.filter(|i| in_degree[*i] == 0)
			.map(GraphNodeIdx)
			.collect();

		while !current.is_empty() {
			let mut next = Vec::new();
			for node in &current {
				for edge in self.edges_starting_at(*node) {
					if let Some((_, to, _)) = self.get_edge(*edge) {
						let d = &mut in_degree[usize::from(to)];
						*d -= 1;
						if *d == 0 {
							next.push(to);
						}
					}
				}
			}
			next.sort();
			layers.push(std::mem::replace(&mut current, next));
		}

		return layers;
	}

	/// All nodes in an order where every edge points forward.
	/// This is [`Self::topological_layers`], flattened.
	pub fn topological_order(&self) -> Vec<GraphNodeIdx> {
		self.topological_layers().into_iter().flatten().collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn finalized(n: usize, edges: &[(usize, usize)]) -> FinalizedGraph<usize, ()> {
		let mut g = Graph::new();
		let idx: Vec<GraphNodeIdx> = (0..n).map(|i| g.add_node(i)).collect();
		for (a, b) in edges {
			g.add_edge(idx[*a], idx[*b], ());
		}
		return g.finalize().unwrap();
	}

	fn layer_values(g: &FinalizedGraph<usize, ()>) -> Vec<Vec<usize>> {
		g.topological_layers()
			.into_iter()
			.map(|l| l.into_iter().map(|i| *g.get_node(i).unwrap()).collect())
			.collect()
	}

	#[test]
	fn layers_group_independent_nodes() {
		// a1=0, a2=1, b1=2, b2=3, c1=4, c2=5
		let g = finalized(
			6,
			&[(0, 2), (0, 3), (1, 3), (2, 4), (2, 5), (0, 5), (3, 5), (1, 5)],
		);
		assert_eq!(layer_values(&g), vec![vec![0, 1], vec![2, 3], vec![4, 5]]);
	}

	#[test]
	fn layers_respect_longest_path() {
		// 0 -> 1 -> 2, and 0 -> 2 directly
		let g = finalized(3, &[(0, 1), (1, 2), (0, 2)]);
		assert_eq!(layer_values(&g), vec![vec![0], vec![1], vec![2]]);
	}

	#[test]
	fn parallel_edges_count_once_per_edge() {
		let g = finalized(2, &[(0, 1), (0, 1)]);
		assert_eq!(layer_values(&g), vec![vec![0], vec![1]]);
		assert_eq!(g.predecessors(GraphNodeIdx(1)), vec![GraphNodeIdx(0)]);
		assert_eq!(g.successors(GraphNodeIdx(0)), vec![GraphNodeIdx(1)]);
	}

	#[test]
	fn order_is_stable_for_unordered_insertions() {
		// Edges point backwards in insertion order
		let g = finalized(3, &[(2, 1), (1, 0)]);
		let order: Vec<usize> = g
			.topological_order()
			.into_iter()
			.map(|i| i.as_usize())
			.collect();
		assert_eq!(order, vec![2, 1, 0]);
	}
}
