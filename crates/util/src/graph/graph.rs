use std::fmt::Debug;
use thiserror::Error;

use super::{
	finalized::FinalizedGraph,
	util::{GraphEdgeIdx, GraphNodeIdx},
};

/// The error we return when we try to finalize a graph that has a cycle.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("graph has a cycle through {} nodes", .cycle.len().saturating_sub(1))]
pub struct GraphCycleError {
	/// The nodes on the cycle, in traversal order.
	/// The first node is repeated at the end.
	pub cycle: Vec<GraphNodeIdx>,
}

/// DFS visit state used by [`Graph::find_cycle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
	Unvisited,
	InProgress,
	Done,
}

/// A directed graph with parallel edges.
/// Fast writes are not a goal (within reason).
///
/// [`Graph`]s are designed to be created once,
/// (possibly mutated, if creation requires multiple stages),
/// and only read afterwards.
#[derive(Debug, Clone)]
pub struct Graph<NodeType, EdgeType>
where
	NodeType: Debug,
	EdgeType: Debug,
{
	/// Array of nodes in this graph
	pub(super) nodes: Vec<NodeType>,

	/// Array of edges in this graph
	pub(super) edges: Vec<(GraphNodeIdx, GraphNodeIdx, EdgeType)>,
}

impl<NodeType, EdgeType> Graph<NodeType, EdgeType>
where
	NodeType: Debug,
	EdgeType: Debug,
{
	/// Create an empty graph
	pub fn new() -> Self {
		Self {
			nodes: Vec::new(),
			edges: Vec::new(),
		}
	}

	/// Convert this graph to an immutable structure with fast reads.
	/// Fails if this graph has a cycle.
	pub fn finalize(self) -> Result<FinalizedGraph<NodeType, EdgeType>, GraphCycleError> {
		if let Some(cycle) = self.find_cycle() {
			return Err(GraphCycleError { cycle });
		}

		let mut edge_map_in = (0..self.nodes.len())
			.map(|_| Vec::new())
			.collect::<Vec<_>>();
		let mut edge_map_out = (0..self.nodes.len())
			.map(|_| Vec::new())
			.collect::<Vec<_>>();
		for (i, x) in self.edges.iter().enumerate() {
			edge_map_out[usize::from(x.0)].push(GraphEdgeIdx(i));
			edge_map_in[usize::from(x.1)].push(GraphEdgeIdx(i));
		}

		return Ok(FinalizedGraph {
			graph: self,
			edge_map_in,
			edge_map_out,
		});
	}

	/// Add a node to this graph.
	#[inline]
	pub fn add_node(&mut self, node: NodeType) -> GraphNodeIdx {
		let i = self.nodes.len();
		self.nodes.push(node);
		GraphNodeIdx(i)
	}

	/// Get a node by index
	#[inline]
	pub fn get_node(&self, node_idx: GraphNodeIdx) -> Option<&NodeType> {
		self.nodes.get(usize::from(node_idx))
	}

	/// The number of nodes in this graph
	#[inline]
	pub fn len_nodes(&self) -> usize {
		self.nodes.len()
	}

	/// Iterate over all nodes in this graph, including node index
	#[inline]
	pub fn iter_nodes_idx(&self) -> impl Iterator<Item = (GraphNodeIdx, &NodeType)> {
		self.nodes
			.iter()
			.enumerate()
			.map(|(a, b)| (GraphNodeIdx(a), b))
	}

	/// Add an edge to this graph.
	///
	/// Both endpoints must be nodes of this graph.
	#[inline]
	pub fn add_edge(
		&mut self,
		from: GraphNodeIdx,
		to: GraphNodeIdx,
		edge_value: EdgeType,
	) -> GraphEdgeIdx {
		debug_assert!(usize::from(from) < self.nodes.len());
		debug_assert!(usize::from(to) < self.nodes.len());

		let i = self.edges.len();
		self.edges.push((from, to, edge_value));
		GraphEdgeIdx(i)
	}

	/// The number of edges in this graph
	#[inline]
	pub fn len_edges(&self) -> usize {
		self.edges.len()
	}

	/// Find a directed cycle in this graph.
	///
	/// This is a depth-first search with three-color marking.
	/// Roots are tried in node order and edges are followed in insertion order,
	/// so a given graph always reports the same cycle.
	///
	/// Returns the nodes on the first cycle we find, starting and ending
	/// with the node the back-edge points to. Returns `None` if there is no cycle.
	pub fn find_cycle(&self) -> Option<Vec<GraphNodeIdx>> {
		let mut out_edges: Vec<Vec<usize>> = (0..self.nodes.len()).map(|_| Vec::new()).collect();
		for (from, to, _) in &self.edges {
			out_edges[from.0].push(to.0);
		}

		let mut state = vec![VisitState::Unvisited; self.nodes.len()];

		// The current DFS path.
		// Each entry is (node, index of the next out-edge to follow)
		let mut stack: Vec<(usize, usize)> = Vec::new();

		for root in 0..self.nodes.len() {
			if state[root] != VisitState::Unvisited {
				continue;
			}

			state[root] = VisitState::InProgress;
			stack.push((root, 0));

			while let Some((node, cursor)) = stack.last_mut() {
				let node = *node;
				let next = match out_edges[node].get(*cursor) {
					Some(next) => *next,
					None => {
						state[node] = VisitState::Done;
						stack.pop();
						continue;
					}
				};
				*cursor += 1;

				match state[next] {
					VisitState::Done => {}

					VisitState::Unvisited => {
						state[next] = VisitState::InProgress;
						stack.push((next, 0));
					}

					// Back-edge. Every in-progress node is on the stack.
					VisitState::InProgress => {
						let start = stack.iter().position(|(n, _)| *n == next).unwrap_or(0);
						let mut cycle: Vec<GraphNodeIdx> = stack[start..]
							.iter()
							.map(|(n, _)| GraphNodeIdx(*n))
							.collect();
						cycle.push(GraphNodeIdx(next));
						return Some(cycle);
					}
				}
			}
		}

		return None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn graph_with_edges(n: usize, edges: &[(usize, usize)]) -> Graph<usize, ()> {
		let mut g = Graph::new();
		let idx: Vec<GraphNodeIdx> = (0..n).map(|i| g.add_node(i)).collect();
		for (a, b) in edges {
			g.add_edge(idx[*a], idx[*b], ());
		}
		return g;
	}

	fn as_usizes(cycle: &[GraphNodeIdx]) -> Vec<usize> {
		cycle.iter().map(|x| x.as_usize()).collect()
	}

	#[test]
	fn acyclic_graph_has_no_cycle() {
		let g = graph_with_edges(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
		assert_eq!(g.find_cycle(), None);
	}

	#[test]
	fn parallel_edges_are_not_cycles() {
		let g = graph_with_edges(2, &[(0, 1), (0, 1), (0, 1)]);
		assert_eq!(g.find_cycle(), None);
		assert_eq!(g.len_edges(), 3);
	}

	#[test]
	fn finds_two_node_cycle() {
		let g = graph_with_edges(2, &[(0, 1), (1, 0)]);
		assert_eq!(as_usizes(&g.find_cycle().unwrap()), vec![0, 1, 0]);
	}

	#[test]
	fn cycle_excludes_path_prefix() {
		// 0 -> 1 -> 2 -> 3 -> 1
		let g = graph_with_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 1)]);
		assert_eq!(as_usizes(&g.find_cycle().unwrap()), vec![1, 2, 3, 1]);
	}

	#[test]
	fn finds_self_loop() {
		let g = graph_with_edges(2, &[(0, 1), (1, 1)]);
		assert_eq!(as_usizes(&g.find_cycle().unwrap()), vec![1, 1]);
	}

	#[test]
	fn finalize_rejects_cycles() {
		let g = graph_with_edges(3, &[(0, 1), (1, 2), (2, 0)]);
		let err = g.finalize().unwrap_err();
		assert_eq!(as_usizes(&err.cycle), vec![0, 1, 2, 0]);
		assert_eq!(err.to_string(), "graph has a cycle through 3 nodes");
	}
}
