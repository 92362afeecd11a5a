use std::{io::Write, time::Duration};

use anyhow::Result;
use prettytable::*;
use tracing::warn;

use crate::formulation::{TcbvrpModel, TourModel};
use crate::lp_solver::LPSolution;
use crate::solution::RoutingSolution;

/// Write the solve summary, the nonzero variables and the decoded tours
pub fn write_report<W: Write + ?Sized>(
    writer: &mut W,
    model: &TcbvrpModel<'_>,
    solution: &LPSolution<TourModel>,
    elapsed: Duration,
) -> Result<()> {
    let instance = model.instance();
    let nodes = solution
        .nodes_explored
        .map_or_else(|| "n/a".to_string(), |n| n.to_string());

    writeln!(writer, "Formulation: {}", model.formulation())?;
    writeln!(writer, "Status: {}", solution.status)?;
    writeln!(writer, "Branch-and-Bound nodes: {}", nodes)?;
    writeln!(writer, "Objective value: {}", solution.objective_value)?;
    writeln!(writer, "Elapsed time: {:.3}s", elapsed.as_secs_f64())?;

    if !solution.has_values() {
        writeln!(writer, "\nNo solution values available.")?;
        return Ok(());
    }

    let mut table = Table::new();
    table.set_titles(row!["Variable", "Value"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    for (name, value) in model.builder().nonzero_values(solution) {
        table.add_row(row![name, r->format!("{}", value)]);
    }
    writeln!(writer)?;
    table.print(writer)?;

    let routing = RoutingSolution::from_values(model, solution);
    let mut table = Table::new();
    table.set_titles(row!["Vehicle", "Tour", "Distance"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    for tour in routing.tours() {
        table.add_row(row![
            tour.vehicle,
            tour.to_string(),
            r->format!("{:.3}", tour.distance(instance))
        ]);
    }
    writeln!(writer, "\nTours (total distance {:.3}):", routing.total_distance(instance))?;
    table.print(writer)?;

    for violation in routing.violations(instance) {
        warn!(%violation, "solution breaks a routing rule");
        writeln!(writer, "Violation: {}", violation)?;
    }

    Ok(())
}
