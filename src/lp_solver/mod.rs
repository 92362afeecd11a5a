//! Linear Programming (LP) and Mixed-Integer (MILP) solver abstraction layer
//!
//! This module provides a trait-free, backend-independent model builder, allowing the
//! routing formulations to be written once and solved with either Gurobi or COIN-OR CBC.
//!
//! # Type Safety with Branded Types
//!
//! All core types (`VariableId`, `LinearExpression`, `Constraint`, `LPModelBuilder`)
//! use a generic `Brand` type parameter that provides compile-time guarantees:
//!
//! - Variables from one builder cannot be accidentally used with another builder
//! - Constraints are type-checked to ensure they only use variables from their builder
//! - No runtime overhead - the brand is a zero-sized phantom type
//!
//! Use the `lp_model_builder!()` macro to create builders with guaranteed unique brands:
//!
//! ```rust
//! use tcbvrp::constraint;
//! use tcbvrp::lp_model_builder;
//! use tcbvrp::lp_solver::VariableType;
//!
//! let mut builder1 = lp_model_builder!();
//! let mut builder2 = lp_model_builder!();
//!
//! let x = builder1.add_variable("x", VariableType::Continuous, 0.0, 10.0);
//! let y = builder2.add_variable("y", VariableType::Continuous, 0.0, 10.0);
//!
//! // This compiles:
//! builder1.add_constraint(constraint!((x) <= 5.0));
//!
//! // This would NOT compile (type error):
//! // builder1.add_constraint(constraint!((y) <= 5.0));
//! ```
//!
//! When the builder has to be stored in a struct, name the brand explicitly:
//!
//! ```rust
//! use tcbvrp::lp_solver::{LPModelBuilder, VariableType};
//!
//! struct MyModel;
//! let mut builder = LPModelBuilder::<MyModel>::new();
//! let x = builder.add_variable("x", VariableType::Binary, 0.0, 1.0);
//! assert_eq!(builder.variable_name(x), "x");
//! ```
//!
//! # Named Variables
//!
//! Every variable carries a name, assigned once when the variable is created. Names are
//! used for the diagnostic LP export ([`lp_format`]) and for reporting solution values, so
//! callers should keep them unique within a model.
//!
//! Variables and solutions use `Vec` storage rather than `HashMap`: the `VariableId` is an
//! index into these vectors. Use `solution.get_value(var_id)` to access values; a value the
//! backend could not read is `None` rather than an error.
//!
//! # Building Constraints
//!
//! ```rust,no_run
//! use tcbvrp::constraint;
//! use tcbvrp::lp_model_builder;
//! use tcbvrp::lp_solver::{OptimizationSense, SolverConfig, VariableType};
//!
//! let mut builder = lp_model_builder!();
//! let x = builder.add_variable("x", VariableType::Integer, 0.0, f64::INFINITY);
//! let y = builder.add_variable("y", VariableType::Continuous, 0.0, f64::INFINITY);
//!
//! builder.add_constraint(constraint!((x + y) == 10.0));
//! builder.add_constraint(constraint!("cap", (2.0 * x - y) <= 5.0));
//!
//! builder.set_objective(x + 2.0 * y, OptimizationSense::Minimize);
//! let _solution = builder.solve(&SolverConfig::default());
//! ```
//!
//! # Solver Selection
//!
//! The solver backend can be selected via the `TCBVRP_LP_SOLVER` environment variable:
//! - `"gurobi"` - Use Gurobi (requires `gurobi` feature)
//! - `"coin_cbc"` or `"cbc"` - Use COIN-OR CBC (requires `coin_cbc` feature)
//!
//! If not set, the solver defaults to Gurobi if available, otherwise CBC.

use anyhow::Result;
use std::env;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Variable types supported by LP solvers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    /// Continuous variable (can take any real value)
    Continuous,
    /// Integer variable (can only take integer values)
    Integer,
    /// Binary variable (can only take values 0 or 1)
    Binary,
}

/// Constraint sense for linear constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum ConstraintSense {
    /// Less than or equal to (≤)
    LessEqual,
    /// Equal to (=)
    Equal,
    /// Greater than or equal to (≥)
    GreaterEqual,
    /// Strictly greater than (>)
    Greater,
}

/// Optimization direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationSense {
    /// Minimize the objective function
    Minimize,
    /// Maximize the objective function
    Maximize,
}

/// Status of the optimization process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationStatus {
    /// Optimal solution found
    Optimal,
    /// Feasible solution found, but not proven optimal
    Feasible,
    /// Problem is infeasible (no solution exists)
    Infeasible,
    /// Problem is unbounded
    Unbounded,
    /// Problem is infeasible or unbounded
    InfeasibleOrUnbounded,
    /// The wall-clock limit was hit; the best incumbent (if any) is returned
    TimeLimit,
    /// Other status (solver-specific)
    Other(&'static str),
}

impl fmt::Display for OptimizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationStatus::Optimal => write!(f, "Optimal"),
            OptimizationStatus::Feasible => write!(f, "Feasible"),
            OptimizationStatus::Infeasible => write!(f, "Infeasible"),
            OptimizationStatus::Unbounded => write!(f, "Unbounded"),
            OptimizationStatus::InfeasibleOrUnbounded => write!(f, "InfeasibleOrUnbounded"),
            OptimizationStatus::TimeLimit => write!(f, "TimeLimit"),
            OptimizationStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Search parameters handed to the solver backend.
///
/// The defaults print every node-log line with extra detail, pin the search to a single
/// thread so repeated runs on one instance explore the same tree, and stop after an hour.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Number of worker threads used by the branch-and-bound search
    pub threads: u32,
    /// Wall-clock limit for the whole search
    pub time_limit: Duration,
    /// Solver log verbosity; `0` silences the solver output entirely
    pub display_level: u8,
    /// Print a node-log line every this many nodes (Gurobi only)
    pub node_log_interval: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            time_limit: Duration::from_secs(3600),
            display_level: 2,
            node_log_interval: 1,
        }
    }
}

/// Available LP solver backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
enum SolverBackend {
    #[cfg(feature = "gurobi")]
    /// Gurobi commercial solver
    Gurobi,
    #[cfg(feature = "coin_cbc")]
    /// Coin CBC open-source solver
    CoinCbc,
}

impl SolverBackend {
    /// Get the solver backend from environment variable or use fallback logic
    fn from_env_or_default() -> Result<Self> {
        if let Ok(solver_name) = env::var("TCBVRP_LP_SOLVER") {
            match solver_name.to_lowercase().as_str() {
                "gurobi" => {
                    #[cfg(feature = "gurobi")]
                    return Ok(SolverBackend::Gurobi);
                    #[cfg(not(feature = "gurobi"))]
                    return Err(anyhow::anyhow!(
                        "Gurobi solver requested via TCBVRP_LP_SOLVER but gurobi feature not enabled"
                    ));
                }
                "coin_cbc" | "coin-cbc" | "cbc" => {
                    #[cfg(feature = "coin_cbc")]
                    return Ok(SolverBackend::CoinCbc);
                    #[cfg(not(feature = "coin_cbc"))]
                    return Err(anyhow::anyhow!(
                        "Coin CBC solver requested via TCBVRP_LP_SOLVER but coin_cbc feature not enabled"
                    ));
                }
                _ => {
                    return Err(anyhow::anyhow!(
                        "Invalid solver '{}' in TCBVRP_LP_SOLVER. Valid options: gurobi, coin_cbc",
                        solver_name
                    ));
                }
            }
        }

        // Fallback logic: prefer gurobi if available, then coin_cbc
        #[cfg(feature = "gurobi")]
        return Ok(SolverBackend::Gurobi);

        #[allow(unreachable_code)]
        #[cfg(feature = "coin_cbc")]
        return Ok(SolverBackend::CoinCbc);

        #[cfg(not(any(feature = "gurobi", feature = "coin_cbc")))]
        Err(anyhow::anyhow!(
            "No LP solver backend available. Please enable a solver feature (e.g., 'gurobi' or 'coin_cbc')"
        ))
    }
}

/// A linear expression term: coefficient * variable
#[derive(Debug, Clone)]
pub struct LinearTerm<Brand> {
    pub coefficient: f64,
    pub variable: VariableId<Brand>,
}

/// A linear expression: sum of terms plus constant
#[derive(Debug, Clone)]
pub struct LinearExpression<Brand> {
    pub terms: Vec<LinearTerm<Brand>>,
    pub constant: f64,
}

impl<Brand> LinearExpression<Brand> {
    /// Create a new linear expression with a constant term
    pub fn new(constant: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant,
        }
    }

    /// Add a term to the expression
    pub fn add_term(&mut self, coefficient: f64, variable: VariableId<Brand>) {
        self.terms.push(LinearTerm {
            coefficient,
            variable,
        });
    }

    /// Create a linear expression from a single variable
    pub fn from_variable(variable: VariableId<Brand>) -> Self {
        Self {
            terms: vec![LinearTerm {
                coefficient: 1.0,
                variable,
            }],
            constant: 0.0,
        }
    }

    /// Evaluate the expression for an assignment of values to variables
    pub fn evaluate(&self, value: impl Fn(VariableId<Brand>) -> f64) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, term| acc + term.coefficient * value(term.variable))
    }
}

impl<Brand> Default for LinearExpression<Brand> {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl<Brand> From<VariableId<Brand>> for LinearExpression<Brand> {
    fn from(variable: VariableId<Brand>) -> Self {
        Self::from_variable(variable)
    }
}

/// Unique identifier for a variable in the LP model
///
/// The `Brand` type parameter ensures that variables can only be used with the
/// builder that created them. This is enforced at compile time.
pub struct VariableId<Brand> {
    id: usize,
    _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> VariableId<Brand> {
    fn new(id: usize) -> Self {
        Self {
            id,
            _brand: PhantomData,
        }
    }
}

// Manual trait implementations that don't require Brand to implement anything
impl<Brand> std::fmt::Debug for VariableId<Brand> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableId").field("id", &self.id).finish()
    }
}

impl<Brand> Clone for VariableId<Brand> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Brand> Copy for VariableId<Brand> {}

impl<Brand> PartialEq for VariableId<Brand> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<Brand> Eq for VariableId<Brand> {}

impl<Brand> std::hash::Hash for VariableId<Brand> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Unique identifier for a constraint in the LP model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(usize);

/// A linear constraint representation
///
/// The `Brand` type parameter ensures type safety - constraints can only use
/// variables from the builder that will consume them. A constraint may carry a
/// name, which is only used for diagnostics.
///
/// # Examples
///
/// ```rust,no_run
/// use tcbvrp::constraint;
/// use tcbvrp::lp_model_builder;
/// use tcbvrp::lp_solver::{Constraint, ConstraintSense, VariableType};
///
/// let mut builder = lp_model_builder!();
/// let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);
/// let y = builder.add_variable("y", VariableType::Continuous, 0.0, 10.0);
///
/// let c = constraint!((x + y) == 10.0);
/// let c = constraint!("balance", (x - y) == 0.0);
/// let c = Constraint::le(x + y, 10.0).with_name("cap");
/// let c = Constraint::new(x + y, ConstraintSense::Equal, 10.0);
/// ```
#[derive(Debug, Clone)]
pub struct Constraint<Brand> {
    name: Option<Arc<str>>,
    expression: LinearExpression<Brand>,
    sense: ConstraintSense,
    rhs: f64,
}

impl<Brand> Constraint<Brand> {
    /// Create a new constraint
    pub fn new(
        expression: impl Into<LinearExpression<Brand>>,
        sense: ConstraintSense,
        rhs: f64,
    ) -> Self {
        Self {
            name: None,
            expression: expression.into(),
            sense,
            rhs,
        }
    }

    /// Attach a diagnostic name to the constraint
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Create an equality constraint: expression == rhs
    pub fn eq(expression: impl Into<LinearExpression<Brand>>, rhs: f64) -> Self {
        Self::new(expression, ConstraintSense::Equal, rhs)
    }

    /// Create a less-than-or-equal constraint: expression <= rhs
    pub fn le(expression: impl Into<LinearExpression<Brand>>, rhs: f64) -> Self {
        Self::new(expression, ConstraintSense::LessEqual, rhs)
    }

    /// Create a greater-than-or-equal constraint: expression >= rhs
    pub fn ge(expression: impl Into<LinearExpression<Brand>>, rhs: f64) -> Self {
        Self::new(expression, ConstraintSense::GreaterEqual, rhs)
    }

    /// Create a strictly-greater-than constraint: expression > rhs
    pub fn gt(expression: impl Into<LinearExpression<Brand>>, rhs: f64) -> Self {
        Self::new(expression, ConstraintSense::Greater, rhs)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn sense(&self) -> ConstraintSense {
        self.sense
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    pub fn expression(&self) -> &LinearExpression<Brand> {
        &self.expression
    }

    /// Check whether an assignment satisfies the constraint within `tolerance`
    pub fn is_satisfied_by(&self, value: impl Fn(VariableId<Brand>) -> f64, tolerance: f64) -> bool {
        let lhs = self.expression.evaluate(value);
        match self.sense {
            ConstraintSense::LessEqual => lhs <= self.rhs + tolerance,
            ConstraintSense::Equal => (lhs - self.rhs).abs() <= tolerance,
            ConstraintSense::GreaterEqual => lhs >= self.rhs - tolerance,
            ConstraintSense::Greater => lhs > self.rhs - tolerance,
        }
    }
}

/// Variable information stored in the model
#[derive(Debug, Clone)]
struct VariableInfo {
    name: Arc<str>,
    var_type: VariableType,
    lower_bound: f64,
    upper_bound: f64,
}

/// Objective function information
#[derive(Debug, Clone)]
struct ObjectiveInfo<Brand> {
    expression: LinearExpression<Brand>,
    sense: OptimizationSense,
}

/// Result of solving an LP model
#[derive(Debug, Clone)]
pub struct LPSolution<Brand> {
    pub status: OptimizationStatus,
    pub objective_value: f64,
    /// Branch-and-bound nodes explored, when the backend reports it
    pub nodes_explored: Option<u64>,
    variable_values: Vec<Option<f64>>,
    _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> LPSolution<Brand> {
    /// Get the value of a variable from the solution
    ///
    /// Returns `None` when the backend produced no value for the variable, either because
    /// there is no incumbent or because reading that particular value failed.
    pub fn get_value(&self, var_id: VariableId<Brand>) -> Option<f64> {
        self.variable_values.get(var_id.id).copied().flatten()
    }

    /// Whether the solution carries variable values at all
    pub fn has_values(&self) -> bool {
        self.variable_values.iter().any(Option::is_some)
    }
}

/// Builder for LP models that can work with different backends
///
/// The `Brand` type parameter ensures type safety - variables from one builder
/// cannot be accidentally used with another builder. This is enforced at compile time.
pub struct LPModelBuilder<Brand> {
    variables: Vec<VariableInfo>,
    constraints: Vec<Constraint<Brand>>,
    objective: Option<ObjectiveInfo<Brand>>,
    _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> LPModelBuilder<Brand> {
    /// Create a new LP model builder
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            _brand: PhantomData,
        }
    }

    /// Add a named variable to the model
    pub fn add_variable(
        &mut self,
        name: impl Into<Arc<str>>,
        var_type: VariableType,
        lower_bound: f64,
        upper_bound: f64,
    ) -> VariableId<Brand> {
        let var_id = VariableId::new(self.variables.len());
        let (lower_bound, upper_bound) = match var_type {
            VariableType::Binary => (lower_bound.max(0.0), upper_bound.min(1.0)),
            _ => (lower_bound, upper_bound),
        };
        self.variables.push(VariableInfo {
            name: name.into(),
            var_type,
            lower_bound,
            upper_bound,
        });
        var_id
    }

    /// Add a constraint to the model
    pub fn add_constraint(&mut self, constraint: Constraint<Brand>) -> ConstraintId {
        let constr_id = ConstraintId(self.constraints.len());
        self.constraints.push(constraint);
        constr_id
    }

    /// Set the objective function
    pub fn set_objective(&mut self, expression: LinearExpression<Brand>, sense: OptimizationSense) {
        self.objective = Some(ObjectiveInfo { expression, sense });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn variable_name(&self, var_id: VariableId<Brand>) -> &str {
        &self.variables[var_id.id].name
    }

    pub fn variable_bounds(&self, var_id: VariableId<Brand>) -> (f64, f64) {
        let info = &self.variables[var_id.id];
        (info.lower_bound, info.upper_bound)
    }

    pub fn constraint(&self, constr_id: ConstraintId) -> &Constraint<Brand> {
        &self.constraints[constr_id.0]
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint<Brand>> {
        self.constraints.iter()
    }

    /// Every constraint the assignment violates, in insertion order
    pub fn violated_constraints(
        &self,
        value: impl Fn(VariableId<Brand>) -> f64,
        tolerance: f64,
    ) -> Vec<&Constraint<Brand>> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied_by(&value, tolerance))
            .collect()
    }

    /// Check bounds, integrality and every constraint for an assignment
    pub fn is_feasible(&self, value: impl Fn(VariableId<Brand>) -> f64, tolerance: f64) -> bool {
        let within_bounds = self.variables.iter().enumerate().all(|(idx, info)| {
            let x = value(VariableId::new(idx));
            let integral = match info.var_type {
                VariableType::Continuous => true,
                VariableType::Integer | VariableType::Binary => (x - x.round()).abs() <= tolerance,
            };
            integral && x >= info.lower_bound - tolerance && x <= info.upper_bound + tolerance
        });

        within_bounds && self.violated_constraints(&value, tolerance).is_empty()
    }

    /// Names and values of every variable with a nonzero value in `solution`
    ///
    /// Variables the backend could not read are skipped.
    pub fn nonzero_values<'a>(
        &'a self,
        solution: &'a LPSolution<Brand>,
    ) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.variables
            .iter()
            .zip(solution.variable_values.iter())
            .filter_map(|(info, value)| match value {
                Some(v) if v.abs() > 1e-9 => Some((info.name.as_ref(), *v)),
                _ => None,
            })
    }

    /// Solve the model using the backend selected by `TCBVRP_LP_SOLVER`
    pub fn solve(&self, config: &SolverConfig) -> Result<LPSolution<Brand>> {
        let solver = SolverBackend::from_env_or_default()?;

        match solver {
            #[cfg(feature = "gurobi")]
            SolverBackend::Gurobi => crate::lp_solver::gurobi::solve_gurobi(self, config),

            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => crate::lp_solver::coin_cbc::solve_coin_cbc(self, config),
        }
    }
}

impl<Brand> Default for LPModelBuilder<Brand> {
    fn default() -> Self {
        Self::new()
    }
}

// Macros for convenient syntax
pub mod macros;

// Operator overloading for linear expressions
pub mod ops;

pub mod lp_format;

pub mod output_suppression;

#[cfg(feature = "gurobi")]
pub mod gurobi;

#[cfg(feature = "coin_cbc")]
pub mod coin_cbc;
