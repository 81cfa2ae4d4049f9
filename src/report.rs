use super::*;
use crate::measures::Measures;
use fxhash::FxHashMap;
use itertools::Itertools;
use std::io::Write;
use std::time::Duration;
use tracing::info;

/// Writes the runtime in seconds followed by one `<vertex> <opinion>` line per
/// estimated vertex, ordered by vertex id.
pub fn write_report(
    runtime: Duration,
    opinions: &FxHashMap<Node, f64>,
    writer: &mut impl Write,
) -> std::io::Result<()> {
    writeln!(writer, "{}", runtime.as_secs_f64())?;
    writer.write_all(
        opinions
            .iter()
            .sorted_by_key(|&(&u, _)| u)
            .map(|(u, opinion)| format!("{} {}\n", u, opinion))
            .join("")
            .as_bytes(),
    )?;
    Ok(())
}

pub fn log_measures(measures: &Measures) {
    info!("average opinion:          {}", measures.average_opinion);
    info!("sum of opinions:          {}", measures.sum_of_opinions);
    info!("controversy:              {}", measures.controversy);
    info!("squared norm of innate:   {}", measures.squared_norm_innate);
    info!("internal conflict:        {}", measures.internal_conflict);
    info!("disagreement-controversy: {}", measures.disagreement_controversy);
    info!("polarization:             {}", measures.polarization);
    info!("disagreement:             {}", measures.disagreement);
}
