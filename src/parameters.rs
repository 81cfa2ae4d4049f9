use crate::error::{OracleError, Result};
use crate::Node;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, Clone, StructOpt)]
#[structopt(
    name = "opinion_oracle",
    about = "Estimates expressed opinions with truncated random walks"
)]
pub struct Parameters {
    /// Graph file: vertex count followed by `u v weight` triples
    #[structopt(parse(from_os_str))]
    pub graph_file: PathBuf,

    /// Maximum number of steps per walk
    pub num_steps: usize,

    /// Number of walks per estimated vertex
    pub num_walks: usize,

    /// Innate opinions, one value per vertex
    #[structopt(parse(from_os_str))]
    pub opinions_file: PathBuf,

    /// Vertices to estimate
    pub vertices: Vec<Node>,

    /// Estimate every vertex of the graph
    #[structopt(long = "estAllOpinions")]
    pub all_vertices: bool,

    #[structopt(short = "s", long)]
    pub seed_value: Option<u64>,

    #[structopt(short = "t", long)]
    pub num_threads: Option<usize>,

    /// Log sampled aggregate measures (controversy, disagreement, ...)
    #[structopt(short = "m", long)]
    pub report_measures: bool,

    /// Known expressed opinions; with -m, also log measures from innate
    /// opinions recovered for the sampled vertices
    #[structopt(short = "z", long, parse(from_os_str))]
    pub expressed_file: Option<PathBuf>,

    /// Neighbors sampled per repetition when recovering an innate opinion
    #[structopt(long, default_value = "100")]
    pub num_samples: usize,

    /// Repetitions whose median is used when recovering an innate opinion
    #[structopt(long, default_value = "10")]
    pub repetitions: usize,

    /// With -m, also log the disagreement estimated from this many uniformly
    /// sampled edges
    #[structopt(long)]
    pub sample_edges: Option<usize>,
}

impl Parameters {
    pub fn check(&self) -> Result<()> {
        if self.all_vertices == !self.vertices.is_empty() {
            return Err(OracleError::InvalidParameter(
                "pass either --estAllOpinions or a list of vertices".into(),
            ));
        }

        if self.num_threads == Some(0) {
            return Err(OracleError::InvalidParameter(
                "number of threads must be positive".into(),
            ));
        }

        if !self.report_measures && (self.expressed_file.is_some() || self.sample_edges.is_some())
        {
            return Err(OracleError::InvalidParameter(
                "--expressed-file and --sample-edges require -m".into(),
            ));
        }

        if self.repetitions == 0 {
            return Err(OracleError::InvalidParameter(
                "number of repetitions must be positive".into(),
            ));
        }

        if self.sample_edges == Some(0) {
            return Err(OracleError::InvalidParameter(
                "number of sampled edges must be positive".into(),
            ));
        }

        Ok(())
    }
}

pub fn get_and_check_options() -> Result<Parameters> {
    let opt = Parameters::from_args();
    opt.check()?;
    Ok(opt)
}
