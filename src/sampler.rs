use super::Node;
use crate::graph::Graph;

/// Draws above this value keep the walk on its current vertex.
pub const SELF_LOOP_THRESHOLD: f64 = 0.5;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Step {
    SelfLoop,
    Move(Node),
    Terminate,
}

/// Maps a draw from `[0, 0.5]` onto `0..=num_neighbors`.
///
/// Each neighbor index and the terminating index `num_neighbors` are hit with
/// equal probability. A draw of exactly `0.5` yields `num_neighbors + 1`,
/// which callers also treat as termination.
#[inline]
pub fn neighbor_index(draw: f64, num_neighbors: usize) -> usize {
    (2.0 * draw * (num_neighbors + 1) as f64).floor() as usize
}

/// Turns one uniform draw from `[0, 1)` into the next move of a walk at `u`.
///
/// # Example
/// ```
/// use rust_opinion_oracle::prelude::*;
/// use rust_opinion_oracle::sampler::{sample_step, Step};
/// let mut graph = Graph::new(2);
/// graph.add_edge(0, 1, 1.0).unwrap();
///
/// assert_eq!(sample_step(&graph, 0, 0.9), Step::SelfLoop);
/// assert_eq!(sample_step(&graph, 0, 0.1), Step::Move(1));
/// assert_eq!(sample_step(&graph, 0, 0.3), Step::Terminate);
/// ```
#[inline]
pub fn sample_step(graph: &Graph, u: Node, draw: f64) -> Step {
    if draw > SELF_LOOP_THRESHOLD {
        return Step::SelfLoop;
    }

    let num_neighbors = graph.num_neighbors(u);
    let index = neighbor_index(draw, num_neighbors);

    if index >= num_neighbors {
        Step::Terminate
    } else {
        Step::Move(graph.neighbor_at(u, index))
    }
}
