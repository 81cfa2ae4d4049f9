use rust_opinion_oracle::driver::{Opinions, Oracle};
use rust_opinion_oracle::error::{OracleError, Result};
use rust_opinion_oracle::graph::Graph;
use rust_opinion_oracle::innate::{InnateConfig, InnateEstimator};
use rust_opinion_oracle::input::{read_graph, read_opinions};
use rust_opinion_oracle::measures::{
    edge_endpoints, edge_sampled_disagreement, sample_edges, SampledMeasures,
};
use rust_opinion_oracle::parameters::{get_and_check_options, Parameters};
use rust_opinion_oracle::report::{log_measures, write_report};
use std::io::stdout;
use std::time::Instant;

use pcg_rand::Pcg64;
use rand::{Rng, SeedableRng};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn execute<R: Rng + SeedableRng>(mut rng: R, opt: &Parameters) -> Result<()> {
    let graph = read_graph(&opt.graph_file)?;
    if graph.is_empty() {
        return Err(OracleError::EmptyGraph(opt.graph_file.clone()));
    }
    let opinions = read_opinions(&opt.opinions_file)?;

    let measures_rng = R::seed_from_u64(rng.gen());
    let mut oracle = Oracle::from_parameters(rng, opt, &graph, &opinions)?;
    let config = oracle.estimator().config();
    info!(
        "Graph with {} vertices and {} edges; {} steps, {} walks, {} threads",
        graph.num_nodes(),
        graph.num_edges(),
        config.num_steps,
        config.num_walks,
        oracle.num_threads()
    );

    let start = Instant::now();
    let estimates = if opt.all_vertices {
        oracle.estimate_all()?
    } else {
        oracle.estimate_many(&opt.vertices)?
    };
    let runtime = start.elapsed();

    write_report(runtime, &estimates, &mut stdout().lock())?;

    if opt.report_measures {
        report_measures(measures_rng, opt, &graph, &mut oracle, &estimates)?;
    }

    Ok(())
}

fn report_measures<R: Rng + SeedableRng>(
    mut rng: R,
    opt: &Parameters,
    graph: &Graph,
    oracle: &mut Oracle<R>,
    estimates: &Opinions,
) -> Result<()> {
    let innate = oracle.estimator().opinions();

    info!("Measures from estimated expressed opinions and known innate opinions");
    log_measures(&SampledMeasures::new(graph, estimates, innate)?.compute());

    let expressed = match &opt.expressed_file {
        Some(path) => {
            let expressed = read_opinions(path)?;
            let estimator =
                InnateEstimator::new(graph, &expressed, InnateConfig::from_parameters(opt))?;
            let mut vertices: Vec<_> = estimates.keys().copied().collect();
            vertices.sort_unstable();
            let recovered = estimator.estimate_many(&vertices, &mut rng)?;

            info!("Measures from known expressed opinions and recovered innate opinions");
            let measures = SampledMeasures::with_estimated_innate(graph, &expressed, &recovered)?;
            log_measures(&measures.compute());
            Some(expressed)
        }
        None => None,
    };

    if let Some(k) = opt.sample_edges {
        let edges = sample_edges(graph, k, &mut rng);
        if edges.is_empty() {
            warn!("Graph has no edges to sample disagreement from");
            return Ok(());
        }

        let endpoint_estimates = oracle.estimate_many(&edge_endpoints(&edges))?;
        let disagreement = edge_sampled_disagreement(graph.num_edges(), &edges, |u| {
            endpoint_estimates.get(&u).copied()
        })?;
        info!("disagreement from {} sampled edges: {}", k, disagreement);

        if let Some(expressed) = expressed {
            let disagreement = edge_sampled_disagreement(graph.num_edges(), &edges, |u| {
                expressed.get(u).copied()
            })?;
            info!(
                "disagreement from {} sampled edges, known expressed opinions: {}",
                k, disagreement
            );
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let result = get_and_check_options().and_then(|opt| {
        let rng = if let Some(seed_value) = opt.seed_value {
            Pcg64::seed_from_u64(seed_value)
        } else {
            Pcg64::from_entropy()
        };

        execute(rng, &opt)
    });

    if let Err(err) = result {
        error!("{}", err);
        std::process::exit(1);
    }
}
