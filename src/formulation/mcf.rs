//! Multi-commodity flow subtour elimination.
//!
//! There is one commodity per non-depot node, routed over the arcs used by any tour. A
//! visited node must be reachable from the depot by its own commodity.

use itertools::iproduct;

use super::{Expr, TourModel, Var, vars::Grid3};
use crate::constraint;
use crate::instance::Instance;
use crate::lp_solver::*;

/// Σ_l t[l][from][to] for every `from` in `sources`
fn tour_arcs_into<'a>(
    arcs: &'a Grid3,
    m: usize,
    sources: impl Iterator<Item = usize> + Clone + 'a,
    to: usize,
) -> impl Iterator<Item = Var> + 'a {
    iproduct!(0..m, sources).map(move |(l, from)| arcs.get(l, from, to))
}

/// Flow variables indexed by commodity node `k`, then arc `i -> j`
///
/// Commodity `k` lives at slot `k - 1`; the depot has no commodity.
#[derive(Debug, Clone)]
pub struct CommodityFlow {
    flow: Grid3,
}

impl CommodityFlow {
    pub fn get(&self, k: usize, i: usize, j: usize) -> Var {
        self.flow.get(k - 1, i, j)
    }

    pub fn commodities(&self) -> usize {
        self.flow.shape()[0]
    }
}

pub(super) fn add_multi_commodity_flow(
    builder: &mut LPModelBuilder<TourModel>,
    instance: &Instance,
    arcs: &Grid3,
) -> CommodityFlow {
    let n = instance.n();
    let m = instance.m();

    let flow = CommodityFlow {
        flow: Grid3::new([n.saturating_sub(1), n, n], |c, i, j| {
            let ub = if i == j { 0.0 } else { f64::INFINITY };
            builder.add_variable(
                format!("f_{}_{}_{}", c + 1, i, j),
                VariableType::Continuous,
                0.0,
                ub,
            )
        }),
    };

    for k in 1..n {
        // Commodity k reaches node k once per tour arc entering it
        let delivered: Expr = (0..n).filter(|&i| i != k).map(|i| flow.get(k, i, k)).sum();
        let entering: Expr = tour_arcs_into(arcs, m, 0..n, k).sum();
        builder.add_constraint(constraint!(
            format!("mcf_origin_{}", k),
            (delivered - entering) == 0.0
        ));

        let depot_out: Expr = (1..n).map(|j| flow.get(k, 0, j)).sum();
        let depot_in: Expr = (1..n).map(|j| flow.get(k, j, 0)).sum();
        let entering_from_nodes: Expr = tour_arcs_into(arcs, m, 1..n, k).sum();
        builder.add_constraint(constraint!(
            format!("mcf_depot_{}", k),
            (depot_out - depot_in - entering_from_nodes) == 0.0
        ));

        for j in (1..n).filter(|&j| j != k) {
            let inflow: Expr = (0..n).filter(|&i| i != j).map(|i| flow.get(k, i, j)).sum();
            let outflow: Expr = (0..n).filter(|&i| i != j).map(|i| flow.get(k, j, i)).sum();
            builder.add_constraint(constraint!(
                format!("mcf_conserve_{}_{}", k, j),
                (inflow - outflow) == 0.0
            ));
        }

        for (i, j) in iproduct!(0..n, 0..n).filter(|&(i, j)| i != j) {
            let used: Expr = (0..m).map(|l| arcs.get(l, i, j)).sum();
            builder.add_constraint(constraint!(
                format!("mcf_capacity_{}_{}_{}", k, i, j),
                (flow.get(k, i, j) - used) <= 0.0
            ));
        }
    }

    flow
}
