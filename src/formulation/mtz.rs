//! Miller-Tucker-Zemlin ordering constraints.
//!
//! `u[i][j]` is the position of node `j` in tour `i`. Using arc `j -> k` forces `k` to sit
//! strictly after `j`, which no cycle avoiding the depot can satisfy.

use itertools::iproduct;

use super::{Expr, TourModel, vars::Grid2, vars::Grid3};
use crate::constraint;
use crate::instance::Instance;
use crate::lp_solver::*;

pub(super) fn add_order_potentials(
    builder: &mut LPModelBuilder<TourModel>,
    instance: &Instance,
    arcs: &Grid3,
) -> Grid2 {
    let n = instance.n();
    let m = instance.m();
    let big_m = n as f64 - 1.0;

    let order = Grid2::new([m, n], |i, j| {
        let ub = if j == 0 { 0.0 } else { f64::INFINITY };
        builder.add_variable(format!("u_{}_{}", i, j), VariableType::Continuous, 0.0, ub)
    });

    for i in 0..m {
        let arcs_used: Expr = iproduct!(0..n, 0..n).map(|(a, b)| arcs.get(i, a, b)).sum();
        for j in 1..n {
            builder.add_constraint(constraint!(
                format!("mtz_bound_{}_{}", i, j),
                (order.get(i, j) - arcs_used.clone()) <= 0.0
            ));
        }

        for (j, k) in iproduct!(1..n, 1..n).filter(|&(j, k)| j != k) {
            // u_j - u_k + 1 <= (n-1)(1 - t_jk)
            builder.add_constraint(constraint!(
                format!("mtz_order_{}_{}_{}", i, j, k),
                (order.get(i, j) - order.get(i, k) + 1.0 + big_m * arcs.get(i, j, k)) <= big_m
            ));
        }
    }

    order
}
