pub mod driver;
pub mod error;
pub mod estimator;
pub mod graph;
pub mod innate;
pub mod input;
pub mod measures;
pub mod parameters;
pub mod report;
pub mod sampler;

pub type Node = usize;
pub type Edge = (Node, Node, f64);

pub mod prelude {
    use super::*;

    pub use super::{Edge, Node};
    pub use driver::Oracle;
    pub use error::{OracleError, Result};
    pub use estimator::{WalkConfig, WalkEstimator};
    pub use graph::{EdgeWriter, Graph};
    pub use innate::{InnateConfig, InnateEstimator};
}
