use std::path::PathBuf;

use thiserror::Error;

use super::Node;

#[derive(Debug, Error)]
pub enum OracleError {
    /// A vertex id (from an edge or a request) outside `[0, num_nodes)`.
    #[error("vertex {vertex} is out of range for a graph with {num_nodes} vertices")]
    VertexOutOfRange { vertex: i128, num_nodes: Node },

    #[error("got {opinions} opinions but the graph has {num_nodes} vertices")]
    OpinionsTooShort { opinions: usize, num_nodes: Node },

    #[error("graph read from {0} has no vertices")]
    EmptyGraph(PathBuf),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("a worker thread panicked during estimation")]
    WorkerPanicked,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OracleError>;

impl OracleError {
    pub(crate) fn out_of_range(vertex: impl TryInto<i128>, num_nodes: Node) -> Self {
        OracleError::VertexOutOfRange {
            vertex: vertex.try_into().unwrap_or(i128::MAX),
            num_nodes,
        }
    }
}
