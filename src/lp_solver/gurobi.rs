use std::collections::HashMap;

use ::gurobi::{ConstrSense, Env, LinExpr, Model, ModelSense, Status, VarType, attr, param};
use tracing::{debug, warn};

use crate::lp_solver::*;

/// Build a Gurobi environment carrying the search parameters
///
/// Parameters are set on the environment before the model is created so the model's
/// private copy of the environment inherits them.
fn configured_env(config: &SolverConfig) -> Result<Env> {
    let mut env = Env::new("")?;
    env.set(param::Threads, config.threads as i32)?;
    env.set(param::TimeLimit, config.time_limit.as_secs_f64())?;
    env.set(param::DisplayInterval, config.node_log_interval as i32)?;
    if config.display_level == 0 {
        env.set(param::OutputFlag, 0)?;
    }
    Ok(env)
}

/// Solve an LP model using Gurobi
pub fn solve_gurobi<Brand>(
    builder: &LPModelBuilder<Brand>,
    config: &SolverConfig,
) -> Result<LPSolution<Brand>> {
    let env = configured_env(config)?;
    let mut model = Model::new("tcbvrp", &env)?;

    // Add variables
    let mut var_map = HashMap::new();
    for (idx, var_info) in builder.variables.iter().enumerate() {
        let vtype = match var_info.var_type {
            VariableType::Continuous => VarType::Continuous,
            VariableType::Integer => VarType::Integer,
            VariableType::Binary => VarType::Binary,
        };

        let var = model.add_var(
            &var_info.name,
            vtype,
            0.0, // objective coefficient
            var_info.lower_bound,
            var_info.upper_bound,
            &[], // coefficients for existing constraints
            &[], // constraint indices
        )?;

        var_map.insert(VariableId::<Brand>::new(idx), var);
    }

    // Add constraints
    for (constr_id, constraint) in builder.constraints.iter().enumerate() {
        let mut gurobi_expr = LinExpr::new();

        for term in &constraint.expression.terms {
            if let Some(var) = var_map.get(&term.variable) {
                gurobi_expr = gurobi_expr.add_term(term.coefficient, var.clone());
            } else {
                return Err(anyhow::anyhow!(
                    "Variable {:?} not found in model",
                    term.variable
                ));
            }
        }
        gurobi_expr = gurobi_expr.add_constant(constraint.expression.constant);

        let sense = match constraint.sense {
            ConstraintSense::LessEqual => ConstrSense::Less,
            ConstraintSense::Equal => ConstrSense::Equal,
            ConstraintSense::GreaterEqual => ConstrSense::Greater,
            ConstraintSense::Greater => ConstrSense::Greater,
        };

        let name = match constraint.name() {
            Some(name) => name.to_string(),
            None => format!("c{}", constr_id),
        };
        model.add_constr(&name, gurobi_expr, sense, constraint.rhs)?;
    }

    // Update the model before setting objective
    model.update()?;

    if let Some(obj_info) = &builder.objective {
        let mut gurobi_expr = LinExpr::new();

        for term in &obj_info.expression.terms {
            if let Some(var) = var_map.get(&term.variable) {
                gurobi_expr = gurobi_expr.add_term(term.coefficient, var.clone());
            } else {
                return Err(anyhow::anyhow!(
                    "Variable {:?} not found in model",
                    term.variable
                ));
            }
        }
        gurobi_expr = gurobi_expr.add_constant(obj_info.expression.constant);

        let sense = match obj_info.sense {
            OptimizationSense::Minimize => ModelSense::Minimize,
            OptimizationSense::Maximize => ModelSense::Maximize,
        };

        model.set_objective(gurobi_expr, sense)?;
    }

    debug!(
        columns = builder.variables.len(),
        rows = builder.constraints.len(),
        "calling Gurobi"
    );
    model.optimize()?;

    let optimization_status = match model.status()? {
        Status::Optimal => OptimizationStatus::Optimal,
        Status::SubOptimal => OptimizationStatus::Feasible,
        Status::TimeLimit => OptimizationStatus::TimeLimit,
        Status::Infeasible => OptimizationStatus::Infeasible,
        Status::Unbounded => OptimizationStatus::Unbounded,
        Status::InfOrUnbd => OptimizationStatus::InfeasibleOrUnbounded,
        _ => OptimizationStatus::Other("Unknown status"),
    };

    let nodes_explored = model.get(attr::NodeCount).ok().map(|n| n as u64);
    let solution_count = model.get(attr::SolCount)?;

    // Values are read one by one: a variable whose value cannot be read is left out
    // instead of failing the whole extraction
    let num_vars = builder.variables.len();
    let mut variable_values = vec![None; num_vars];
    let objective_value = if solution_count > 0 {
        for (var_id, var) in &var_map {
            match var.get(&model, attr::X) {
                Ok(value) => variable_values[var_id.id] = Some(value),
                Err(e) => debug!("no value for {}: {:?}", builder.variables[var_id.id].name, e),
            }
        }
        model.get(attr::ObjVal)?
    } else {
        if optimization_status == OptimizationStatus::TimeLimit {
            warn!("time limit reached without an incumbent solution");
        }
        0.0
    };

    Ok(LPSolution {
        status: optimization_status,
        objective_value,
        nodes_explored,
        variable_values,
        _brand: std::marker::PhantomData,
    })
}
