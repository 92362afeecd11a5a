use std::collections::HashMap;

use crate::lp_solver::output_suppression::quiet_stdout;
use crate::lp_solver::*;
use ::coin_cbc::{Model, Sense};
use tracing::{debug, warn};

/// Round a floating-point number to a specified number of significant digits
/// This is an workaround to mask floating point errors in CBC.
fn round_to_sig_digits(value: f64, digits: u32) -> f64 {
    if value == 0.0 {
        return 0.0;
    }

    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10_f64.powi(digits as i32 - magnitude - 1);
    (value * scale).round() / scale
}

/// Translate the solver configuration into CBC command-line parameters
fn apply_config(model: &mut Model, config: &SolverConfig) {
    model.set_parameter("threads", &config.threads.to_string());
    model.set_parameter("seconds", &config.time_limit.as_secs_f64().to_string());
    model.set_parameter("log", &config.display_level.to_string());
    // CBC has no node-log interval; the log level alone decides what is printed
}

/// Solve an LP model using Coin CBC
pub fn solve_coin_cbc<Brand>(
    builder: &LPModelBuilder<Brand>,
    config: &SolverConfig,
) -> Result<LPSolution<Brand>> {
    // Keep CBC quiet when no solver log was requested
    let _gag_handle = quiet_stdout(config.display_level).unwrap_or_else(|e| {
        debug!("solver output stays visible: {}", e);
        None
    });
    let mut model = Model::default();
    let mut var_map = HashMap::new();

    // Add variables to the model
    for (idx, var_info) in builder.variables.iter().enumerate() {
        let col = match var_info.var_type {
            VariableType::Continuous => {
                let col = model.add_col();
                model.set_col_lower(col, var_info.lower_bound);
                model.set_col_upper(col, var_info.upper_bound);
                col
            }
            VariableType::Integer => {
                let col = model.add_integer();
                model.set_col_lower(col, var_info.lower_bound);
                model.set_col_upper(col, var_info.upper_bound);
                col
            }
            VariableType::Binary => {
                let col = model.add_binary();
                model.set_col_lower(col, var_info.lower_bound);
                model.set_col_upper(col, var_info.upper_bound);
                col
            }
        };
        var_map.insert(VariableId::<Brand>::new(idx), col);
    }

    // Add constraints
    for constraint in &builder.constraints {
        let row = model.add_row();

        for term in &constraint.expression.terms {
            if let Some(&col) = var_map.get(&term.variable) {
                model.set_weight(row, col, term.coefficient);
            } else {
                return Err(anyhow::anyhow!(
                    "Variable {:?} not found in model",
                    term.variable
                ));
            }
        }

        // Handle constant term
        let rhs_adjusted = constraint.rhs - constraint.expression.constant;

        match constraint.sense {
            ConstraintSense::LessEqual => {
                model.set_row_upper(row, rhs_adjusted);
            }
            ConstraintSense::Equal => {
                model.set_row_equal(row, rhs_adjusted);
            }
            ConstraintSense::GreaterEqual => {
                model.set_row_lower(row, rhs_adjusted);
            }
            ConstraintSense::Greater => {
                // Coin CBC doesn't support strict inequalities, use >= with small epsilon
                model.set_row_lower(row, rhs_adjusted + 1e-10);
            }
        }
    }

    // Set objective function
    if let Some(obj_info) = &builder.objective {
        for term in &obj_info.expression.terms {
            if let Some(&col) = var_map.get(&term.variable) {
                model.set_obj_coeff(col, term.coefficient);
            } else {
                return Err(anyhow::anyhow!(
                    "Variable {:?} not found in model",
                    term.variable
                ));
            }
        }

        let sense = match obj_info.sense {
            OptimizationSense::Minimize => Sense::Minimize,
            OptimizationSense::Maximize => Sense::Maximize,
        };

        model.set_obj_sense(sense);
    }

    apply_config(&mut model, config);

    debug!(
        columns = builder.variables.len(),
        rows = builder.constraints.len(),
        "calling CBC"
    );
    let solution = model.solve();

    let raw = solution.raw();
    let status = if raw.is_proven_optimal() {
        OptimizationStatus::Optimal
    } else if raw.is_proven_infeasible() {
        OptimizationStatus::Infeasible
    } else if raw.is_continuous_unbounded() {
        OptimizationStatus::Unbounded
    } else if raw.is_seconds_limit_reached() {
        OptimizationStatus::TimeLimit
    } else if raw.is_abandoned() {
        OptimizationStatus::Other("Abandoned")
    } else {
        OptimizationStatus::Other("Unknown status")
    };

    let num_vars = builder.variables.len();
    let mut values = vec![0.0; num_vars];
    for (var_id, col) in var_map.iter() {
        values[var_id.id] = round_to_sig_digits(solution.col(*col), 8);
    }

    // CBC hands back column values even without an incumbent; only keep them when they
    // describe a solution of the model
    let has_incumbent = match status {
        OptimizationStatus::Optimal => true,
        OptimizationStatus::TimeLimit | OptimizationStatus::Other(_) => {
            builder.is_feasible(|v: VariableId<Brand>| values[v.id], 1e-6)
        }
        _ => false,
    };
    if status == OptimizationStatus::TimeLimit && !has_incumbent {
        warn!("time limit reached without an incumbent solution");
    }

    let objective_value = match &builder.objective {
        Some(obj_info) if has_incumbent => round_to_sig_digits(
            obj_info.expression.evaluate(|v: VariableId<Brand>| values[v.id]),
            8,
        ),
        _ => 0.0,
    };

    let variable_values = if has_incumbent {
        values.into_iter().map(Some).collect()
    } else {
        vec![None; num_vars]
    };

    Ok(LPSolution {
        status,
        objective_value,
        nodes_explored: None,
        variable_values,
        _brand: std::marker::PhantomData,
    })
}
