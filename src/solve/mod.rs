//! Command-line front end: solve an instance, or export its model for inspection.
//!
//! # Usage Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use tcbvrp::formulation::Formulation;
//! use tcbvrp::solve::{SolveArgs, solve_main};
//!
//! let args = SolveArgs {
//!     input: "instances/small.json".into(),
//!     model: Formulation::Scf,
//!     time_limit: 3600,
//!     display_level: 0,
//!     node_log_interval: 1,
//!     report: Some("small.rpt".into()),
//!     export_lp: None,
//! };
//!
//! solve_main(args)?;
//! # Ok(())
//! # }
//! ```

use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;

use crate::AppError;
use crate::formulation::{Formulation, TcbvrpModel};
use crate::instance::read_instance;
use crate::lp_solver::{OptimizationStatus, SolverConfig};

pub mod report;

/// Command-line arguments for the solve command.
#[derive(Parser, Debug)]
pub struct SolveArgs {
    /// Instance file (JSON)
    pub input: PathBuf,

    /// Subtour-elimination formulation: scf, mcf or mtz
    #[clap(short, long)]
    pub model: Formulation,

    /// Wall-clock limit of the search in seconds
    #[clap(short('t'), long, default_value_t = 3600)]
    pub time_limit: u64,

    /// Solver log verbosity, 0 silences the solver
    #[clap(short, long, default_value_t = 2)]
    pub display_level: u8,

    /// Print a node-log line every this many nodes
    #[clap(long, default_value_t = 1)]
    pub node_log_interval: u32,

    /// Output report file, stdout if omitted
    #[clap(long)]
    pub report: Option<PathBuf>,

    /// Also write the model in CPLEX LP format
    #[clap(long)]
    pub export_lp: Option<PathBuf>,
}

/// Command-line arguments for the export command.
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Instance file (JSON)
    pub input: PathBuf,

    /// Subtour-elimination formulation: scf, mcf or mtz
    #[clap(short, long)]
    pub model: Formulation,

    /// Output LP file
    #[clap(long)]
    pub lp: PathBuf,
}

fn export_model(model: &TcbvrpModel<'_>, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(
        fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
    );
    model.write_lp(&mut file)?;
    file.flush()?;
    info!(path = %path.display(), "model exported");
    Ok(())
}

/// Build and solve one formulation of an instance, then report the result.
///
/// The report is written first in every case. An infeasible instance then fails with
/// [`AppError::Infeasible`], and any other outcome without an incumbent fails as well.
pub fn solve_main(args: SolveArgs) -> Result<()> {
    let SolveArgs {
        input,
        model: formulation,
        time_limit,
        display_level,
        node_log_interval,
        report,
        export_lp,
    } = args;

    let instance = read_instance(&input)?;
    let config = SolverConfig {
        time_limit: Duration::from_secs(time_limit),
        display_level,
        node_log_interval,
        ..SolverConfig::default()
    };

    let model = TcbvrpModel::build(&instance, formulation);
    if let Some(path) = &export_lp {
        export_model(&model, path)?;
    }

    let start = Instant::now();
    let solution = model.solve(&config)?;
    let elapsed = start.elapsed();

    let mut writer: Box<dyn Write> = match report {
        Some(path) => Box::new(BufWriter::new(fs::File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };
    report::write_report(&mut *writer, &model, &solution, elapsed)?;
    writer.flush()?;

    match solution.status {
        OptimizationStatus::Infeasible | OptimizationStatus::InfeasibleOrUnbounded => {
            Err(AppError::Infeasible.into())
        }
        status if !solution.has_values() => Err(anyhow!("No solution found ({})", status)),
        _ => Ok(()),
    }
}

/// Write the model of an instance without solving it.
pub fn export_main(args: ExportArgs) -> Result<()> {
    let ExportArgs {
        input,
        model: formulation,
        lp,
    } = args;

    let instance = read_instance(&input)?;
    let model = TcbvrpModel::build(&instance, formulation);
    export_model(&model, &lp)
}
