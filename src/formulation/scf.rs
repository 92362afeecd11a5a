//! Single-commodity flow subtour elimination.
//!
//! Each tour carries its own commodity. The depot injects one unit per node the tour
//! visits and every visited node consumes one unit, so a cycle that does not pass through
//! the depot cannot be fed.

use itertools::iproduct;

use super::{Expr, TourModel, vars::Grid3};
use crate::constraint;
use crate::instance::Instance;
use crate::lp_solver::*;

/// ½ Σ_{k≠j} (t[tour][k][j] + t[tour][j][k]): one for every node the tour visits
fn half_degree(arcs: &Grid3, n: usize, tour: usize, node: usize) -> Expr {
    (0..n)
        .filter(|&k| k != node)
        .map(|k| 0.5 * (arcs.get(tour, k, node) + arcs.get(tour, node, k)))
        .sum()
}

pub(super) fn add_single_commodity_flow(
    builder: &mut LPModelBuilder<TourModel>,
    instance: &Instance,
    arcs: &Grid3,
) -> Grid3 {
    let n = instance.n();
    let m = instance.m();

    let flow = Grid3::new([m, n, n], |i, j, k| {
        let ub = if j == k { 0.0 } else { f64::INFINITY };
        builder.add_variable(format!("f_{}_{}_{}", i, j, k), VariableType::Continuous, 0.0, ub)
    });

    for i in 0..m {
        let injected: Expr = (1..n).map(|j| flow.get(i, 0, j)).sum();
        let visited: Expr = (1..n).map(|j| half_degree(arcs, n, i, j)).sum();
        builder.add_constraint(constraint!(
            format!("scf_source_{}", i),
            (injected - visited) == 0.0
        ));

        for j in 1..n {
            let inflow: Expr = (0..n).filter(|&k| k != j).map(|k| flow.get(i, k, j)).sum();
            let outflow: Expr = (0..n).filter(|&k| k != j).map(|k| flow.get(i, j, k)).sum();
            builder.add_constraint(constraint!(
                format!("scf_consume_{}_{}", i, j),
                (inflow - outflow - half_degree(arcs, n, i, j)) == 0.0
            ));
        }

        for (j, k) in iproduct!(0..n, 0..n).filter(|&(j, k)| j != k) {
            builder.add_constraint(constraint!(
                format!("scf_capacity_{}_{}_{}", i, j, k),
                (flow.get(i, j, k) - n as f64 * arcs.get(i, j, k)) <= 0.0
            ));
        }
    }

    flow
}
