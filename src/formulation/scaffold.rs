//! Arc and activation variables, the objective, and the constraints every formulation shares.

use itertools::iproduct;
use tracing::debug;

use super::{Expr, TourModel, Var, vars::Grid3};
use crate::constraint;
use crate::instance::Instance;
use crate::lp_solver::*;

/// Whether an arc `from -> to` can never be part of a tour
///
/// Supplies only feed demands, demands only return to a supply or the depot, tours
/// leave the depot towards a supply and never arrive there from one.
pub fn is_forbidden_arc(instance: &Instance, from: usize, to: usize) -> bool {
    from == to
        || (instance.is_supply_node(from) && instance.is_supply_node(to))
        || (instance.is_demand_node(from) && instance.is_demand_node(to))
        || (from == 0 && instance.is_demand_node(to))
        || (instance.is_supply_node(from) && to == 0)
}

/// Σ_j Σ_k distance(j,k) t[tour][j][k]
fn tour_length(instance: &Instance, arcs: &Grid3, tour: usize) -> Expr {
    let n = instance.n();
    iproduct!(0..n, 0..n)
        .filter(|&(j, k)| j != k)
        .map(|(j, k)| instance.distance(j, k) * arcs.get(tour, j, k))
        .sum()
}

pub(super) fn add_scaffold(
    builder: &mut LPModelBuilder<TourModel>,
    instance: &Instance,
) -> (Grid3, Vec<Var>) {
    let n = instance.n();
    let m = instance.m();

    let arcs = Grid3::new([m, n, n], |i, j, k| {
        builder.add_variable(format!("t_{}_{}_{}", i, j, k), VariableType::Binary, 0.0, 1.0)
    });
    let routes: Vec<Var> = (0..m)
        .map(|i| builder.add_variable(format!("r_{}", i), VariableType::Binary, 0.0, 1.0))
        .collect();

    let objective = (0..m).map(|i| tour_length(instance, &arcs, i)).sum();
    builder.set_objective(objective, OptimizationSense::Minimize);

    for i in 0..m {
        // A tour is active exactly when it leaves the depot
        let departures: Expr = (1..n).map(|k| arcs.get(i, 0, k)).sum();
        builder.add_constraint(constraint!(
            format!("activation_{}", i),
            (routes[i] - departures) == 0.0
        ));

        for (j, k) in iproduct!(1..n, 1..n) {
            builder.add_constraint(constraint!(
                format!("arc_active_{}_{}_{}", i, j, k),
                (arcs.get(i, j, k) - routes[i]) <= 0.0
            ));
        }

        for (j, k) in iproduct!(0..n, 0..n) {
            if is_forbidden_arc(instance, j, k) {
                builder.add_constraint(constraint!(
                    format!("forbidden_{}_{}_{}", i, j, k),
                    (arcs.get(i, j, k)) == 0.0
                ));
            }
        }
    }

    for j in instance.demand_nodes() {
        let outgoing: Expr = iproduct!(0..m, 0..n)
            .filter(|&(_, k)| k == 0 || instance.is_supply_node(k))
            .map(|(i, k)| arcs.get(i, j, k))
            .sum();
        builder.add_constraint(constraint!(format!("demand_{}", j), (outgoing) == 1.0));
    }

    for j in instance.supply_nodes() {
        let outgoing: Expr = iproduct!(0..m, 0..n)
            .filter(|&(_, k)| instance.is_demand_node(k))
            .map(|(i, k)| arcs.get(i, j, k))
            .sum();
        builder.add_constraint(constraint!(format!("supply_{}", j), (outgoing) <= 1.0));
    }

    let fan_out: Expr = iproduct!(0..m, 0..n).map(|(i, k)| arcs.get(i, 0, k)).sum();
    builder.add_constraint(constraint!("depot_fanout", (fan_out) <= m as f64));

    for (i, j) in iproduct!(0..m, 0..n) {
        let inflow: Expr = (0..n).map(|k| arcs.get(i, k, j)).sum();
        let outflow: Expr = (0..n).map(|k| arcs.get(i, j, k)).sum();
        builder.add_constraint(constraint!(
            format!("balance_{}_{}", i, j),
            (inflow - outflow) == 0.0
        ));
    }

    // Added even for an unbounded budget so every formulation has the same row set
    for i in 0..m {
        builder.add_constraint(constraint!(
            format!("budget_{}", i),
            (tour_length(instance, &arcs, i)) <= instance.budget()
        ));
    }

    debug!(
        variables = builder.num_variables(),
        constraints = builder.num_constraints(),
        "scaffold built"
    );

    (arcs, routes)
}
