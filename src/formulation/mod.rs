//! MILP formulations of the time-constrained bike-sharing routing problem.
//!
//! Every formulation shares the same scaffold (arc variables `t[i][j][k]`, activation
//! variables `r[i]`, the distance objective, coverage, balance and budget constraints)
//! and differs only in how it rules out cycles that never visit the depot:
//!
//! - **SCF**: a single commodity per tour, injected at the depot ([`Formulation::Scf`])
//! - **MCF**: one commodity per node, shared by all tours ([`Formulation::Mcf`])
//! - **MTZ**: Miller-Tucker-Zemlin visiting-order potentials ([`Formulation::Mtz`])
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use tcbvrp::formulation::{Formulation, TcbvrpModel};
//! use tcbvrp::instance::{Instance, NodeKind};
//! use tcbvrp::lp_solver::SolverConfig;
//!
//! let instance = Instance::from_coordinates(
//!     1,
//!     f64::INFINITY,
//!     vec![NodeKind::Depot, NodeKind::Supply, NodeKind::Demand],
//!     &[(0.0, 0.0), (0.0, 5.0), (0.0, 8.0)],
//! )?;
//!
//! let model = TcbvrpModel::build(&instance, Formulation::Mtz);
//! let solution = model.solve(&SolverConfig::default())?;
//! println!("{}: {}", solution.status, solution.objective_value);
//! # Ok(())
//! # }
//! ```

use std::{fmt, io::Write, str::FromStr};

use anyhow::Result;
use tracing::{info, instrument};

use crate::AppError;
use crate::instance::Instance;
use crate::lp_solver::*;

mod mcf;
mod mtz;
mod scaffold;
mod scf;
pub mod vars;

#[cfg(test)]
mod tests;

pub use mcf::CommodityFlow;
pub use scaffold::is_forbidden_arc;
use vars::{Grid2, Grid3};

/// Brand of the routing model's variables
#[derive(Debug, Clone, Copy)]
pub struct TourModel;

pub type Var = VariableId<TourModel>;
pub type Expr = LinearExpression<TourModel>;

/// Subtour-elimination strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formulation {
    /// Single-commodity flow
    Scf,
    /// Multi-commodity flow
    Mcf,
    /// Miller-Tucker-Zemlin
    Mtz,
}

impl Formulation {
    pub const ALL: [Formulation; 3] = [Formulation::Scf, Formulation::Mcf, Formulation::Mtz];
}

impl FromStr for Formulation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scf" => Ok(Formulation::Scf),
            "mcf" => Ok(Formulation::Mcf),
            "mtz" => Ok(Formulation::Mtz),
            _ => Err(AppError::UnknownFormulation(s.to_string())),
        }
    }
}

impl fmt::Display for Formulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formulation::Scf => write!(f, "scf"),
            Formulation::Mcf => write!(f, "mcf"),
            Formulation::Mtz => write!(f, "mtz"),
        }
    }
}

/// Variables owned by the subtour-elimination strategy
#[derive(Debug, Clone)]
pub enum StrategyVars {
    Scf { flow: Grid3 },
    Mcf { flow: CommodityFlow },
    Mtz { order: Grid2 },
}

/// A fully assembled model for one instance and one formulation
pub struct TcbvrpModel<'a> {
    instance: &'a Instance,
    formulation: Formulation,
    builder: LPModelBuilder<TourModel>,
    arcs: Grid3,
    routes: Vec<Var>,
    strategy: StrategyVars,
}

impl<'a> TcbvrpModel<'a> {
    /// Create every variable and constraint of `formulation` for `instance`
    #[instrument(skip(instance), fields(n = instance.n(), m = instance.m()))]
    pub fn build(instance: &'a Instance, formulation: Formulation) -> Self {
        let mut builder = LPModelBuilder::new();
        let (arcs, routes) = scaffold::add_scaffold(&mut builder, instance);

        let strategy = match formulation {
            Formulation::Scf => StrategyVars::Scf {
                flow: scf::add_single_commodity_flow(&mut builder, instance, &arcs),
            },
            Formulation::Mcf => StrategyVars::Mcf {
                flow: mcf::add_multi_commodity_flow(&mut builder, instance, &arcs),
            },
            Formulation::Mtz => StrategyVars::Mtz {
                order: mtz::add_order_potentials(&mut builder, instance, &arcs),
            },
        };

        info!(
            variables = builder.num_variables(),
            constraints = builder.num_constraints(),
            "model built"
        );

        Self {
            instance,
            formulation,
            builder,
            arcs,
            routes,
            strategy,
        }
    }

    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    pub fn formulation(&self) -> Formulation {
        self.formulation
    }

    /// `t[tour][from][to]`
    pub fn arc(&self, tour: usize, from: usize, to: usize) -> Var {
        self.arcs.get(tour, from, to)
    }

    /// `r[tour]`
    pub fn route(&self, tour: usize) -> Var {
        self.routes[tour]
    }

    pub fn strategy(&self) -> &StrategyVars {
        &self.strategy
    }

    pub fn builder(&self) -> &LPModelBuilder<TourModel> {
        &self.builder
    }

    /// Add an extra row, e.g. to fix arcs when probing a model
    pub fn add_constraint(&mut self, constraint: Constraint<TourModel>) -> ConstraintId {
        self.builder.add_constraint(constraint)
    }

    #[instrument(skip_all, fields(formulation = %self.formulation))]
    pub fn solve(&self, config: &SolverConfig) -> Result<LPSolution<TourModel>> {
        let solution = self.builder.solve(config)?;
        info!(
            status = %solution.status,
            objective = solution.objective_value,
            "solver finished"
        );
        Ok(solution)
    }

    /// Write the model in CPLEX LP format
    pub fn write_lp<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        lp_format::write_lp(&self.builder, out)
    }
}
