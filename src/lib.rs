//! Exact MILP models for the time-constrained bike-sharing vehicle routing problem (TCBVRP)
//!
//! A fleet of at most `m` vehicles leaves a depot, moves bikes from supply stations to
//! demand stations and returns, every tour staying within a distance budget `T`. This
//! crate builds the mixed-integer model of a TCBVRP instance and solves it with an
//! external MILP solver.
//!
//! # Overview
//!
//! All models share a scaffold of arc variables `t[i][j][k]` (tour `i` drives from `j` to
//! `k`) and tour activation variables `r[i]`, with the total distance as objective. They
//! differ in how they eliminate subtours that never visit the depot:
//!
//! - **SCF**: single-commodity flow per tour
//! - **MCF**: multi-commodity flow, one commodity per station
//! - **MTZ**: Miller-Tucker-Zemlin order potentials
//!
//! # Usage Example
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use tcbvrp::formulation::{Formulation, TcbvrpModel};
//! use tcbvrp::instance::read_instance;
//! use tcbvrp::lp_solver::SolverConfig;
//! use tcbvrp::solution::RoutingSolution;
//! use std::path::Path;
//!
//! let instance = read_instance(Path::new("instances/small.json"))?;
//! let model = TcbvrpModel::build(&instance, Formulation::Scf);
//! let solution = model.solve(&SolverConfig::default())?;
//!
//! for tour in RoutingSolution::from_values(&model, &solution).tours() {
//!     println!("vehicle {}: {}", tour.vehicle, tour);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - **[`instance`]**: Problem data, validation and JSON loading
//! - **[`formulation`]**: The shared scaffold and the SCF, MCF and MTZ strategies
//! - **[`solution`]**: Tour decoding and an independent feasibility check
//! - **[`solve`]**: The `solve` and `export` commands and the textual report
//! - **[`lp_solver`]**: Linear programming solver abstraction layer

use clap::Parser;
use std::{error::Error, fmt};

pub mod formulation;
pub mod instance;
pub mod lp_solver;
pub mod solution;
pub mod solve;

pub use formulation::{Formulation, TcbvrpModel};
pub use instance::{Instance, NodeKind, read_instance};
pub use solve::{ExportArgs, SolveArgs, export_main, solve_main};

/// Application-level errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The instance has no feasible set of tours.
    Infeasible,
    /// The formulation selector names no known formulation.
    UnknownFormulation(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Infeasible => write!(f, "Problem Infeasible"),
            AppError::UnknownFormulation(name) => write!(
                f,
                "Unknown formulation '{}', expected one of: scf, mcf, mtz",
                name
            ),
        }
    }
}

impl Error for AppError {}

/// Command-line interface of the TCBVRP tools.
#[derive(Debug, Parser)]
#[clap(
    name = "tcbvrp",
    about = "Exact MILP models for the time-constrained bike-sharing vehicle routing problem"
)]
pub enum CLIArguments {
    /// Build a formulation of an instance, solve it and report the tours.
    Solve(SolveArgs),
    /// Write a formulation of an instance in CPLEX LP format without solving it.
    Export(ExportArgs),
}
