//! Decoding of solved arc variables into tours, and an independent feasibility check.
//!
//! The check restates the routing rules directly on the decoded arcs rather than on
//! the model rows, so it also catches rows a formulation forgot to add.

use std::fmt;

use itertools::Itertools;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Dfs;

use crate::formulation::{TcbvrpModel, TourModel, is_forbidden_arc};
use crate::instance::Instance;
use crate::lp_solver::LPSolution;

/// Binary values above this are read as 1
const ARC_THRESHOLD: f64 = 0.5;

/// Slack allowed on the distance budget
const BUDGET_TOLERANCE: f64 = 1e-6;

/// A closed walk from the depot, `nodes` starts and ends with `0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    pub vehicle: usize,
    pub nodes: Vec<usize>,
}

impl Tour {
    pub fn distance(&self, instance: &Instance) -> f64 {
        self.nodes
            .iter()
            .tuple_windows()
            .map(|(&a, &b)| instance.distance(a, b))
            .sum()
    }
}

impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nodes.iter().join(" -> "))
    }
}

/// A routing rule broken by a solution
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// A demand node must leave exactly once towards a supply node or the depot
    DemandCoverage { node: usize, outgoing: usize },
    /// A supply node may feed at most one demand node
    SupplyOutDegree { node: usize, outgoing: usize },
    /// More tours leave the depot than there are vehicles
    DepotFanOut { departures: usize, vehicles: usize },
    DegreeBalance {
        tour: usize,
        node: usize,
        inflow: usize,
        outflow: usize,
    },
    Budget { tour: usize, distance: f64, budget: f64 },
    ForbiddenArc { tour: usize, from: usize, to: usize },
    /// The activation flag disagrees with the number of depot departures
    Activation {
        tour: usize,
        active: bool,
        departures: usize,
    },
    /// An arc that cannot be reached from the depot along its own tour
    Subtour { tour: usize, from: usize, to: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DemandCoverage { node, outgoing } => write!(
                f,
                "demand node {} has {} outgoing arcs, expected 1",
                node, outgoing
            ),
            Violation::SupplyOutDegree { node, outgoing } => write!(
                f,
                "supply node {} feeds {} demand nodes",
                node, outgoing
            ),
            Violation::DepotFanOut {
                departures,
                vehicles,
            } => write!(
                f,
                "{} departures from the depot with {} vehicles",
                departures, vehicles
            ),
            Violation::DegreeBalance {
                tour,
                node,
                inflow,
                outflow,
            } => write!(
                f,
                "tour {} enters node {} {} times and leaves it {} times",
                tour, node, inflow, outflow
            ),
            Violation::Budget {
                tour,
                distance,
                budget,
            } => write!(
                f,
                "tour {} covers {:.3} over a budget of {:.3}",
                tour, distance, budget
            ),
            Violation::ForbiddenArc { tour, from, to } => {
                write!(f, "tour {} uses forbidden arc {} -> {}", tour, from, to)
            }
            Violation::Activation {
                tour,
                active,
                departures,
            } => write!(
                f,
                "tour {} is {} but leaves the depot {} times",
                tour,
                if *active { "active" } else { "inactive" },
                departures
            ),
            Violation::Subtour { tour, from, to } => write!(
                f,
                "arc {} -> {} of tour {} is not connected to the depot",
                from, to, tour
            ),
        }
    }
}

/// Arcs used by each tour of a solved model
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingSolution {
    arcs: Vec<Vec<(usize, usize)>>,
    active: Vec<bool>,
}

impl RoutingSolution {
    pub fn new(arcs: Vec<Vec<(usize, usize)>>, active: Vec<bool>) -> Self {
        Self { arcs, active }
    }

    /// Read the arc and activation variables of `model` out of `solution`
    ///
    /// A variable without a value counts as zero.
    pub fn from_values(model: &TcbvrpModel<'_>, solution: &LPSolution<TourModel>) -> Self {
        let instance = model.instance();
        let n = instance.n();
        let is_set = |value: Option<f64>| value.unwrap_or(0.0) > ARC_THRESHOLD;

        let arcs = (0..instance.m())
            .map(|i| {
                (0..n)
                    .cartesian_product(0..n)
                    .filter(|&(j, k)| is_set(solution.get_value(model.arc(i, j, k))))
                    .collect()
            })
            .collect();
        let active = (0..instance.m())
            .map(|i| is_set(solution.get_value(model.route(i))))
            .collect();

        Self { arcs, active }
    }

    pub fn num_tours(&self) -> usize {
        self.arcs.len()
    }

    pub fn arcs(&self, tour: usize) -> &[(usize, usize)] {
        &self.arcs[tour]
    }

    pub fn is_active(&self, tour: usize) -> bool {
        self.active[tour]
    }

    /// Number of arcs used over all tours
    pub fn num_arcs(&self) -> usize {
        self.arcs.iter().map(Vec::len).sum()
    }

    pub fn distance(&self, tour: usize, instance: &Instance) -> f64 {
        self.arcs[tour]
            .iter()
            .map(|&(j, k)| instance.distance(j, k))
            .sum()
    }

    pub fn total_distance(&self, instance: &Instance) -> f64 {
        (0..self.num_tours())
            .map(|i| self.distance(i, instance))
            .sum()
    }

    fn tour_graph(&self, tour: usize) -> DiGraphMap<usize, ()> {
        let mut graph = DiGraphMap::from_edges(self.arcs[tour].iter().copied());
        graph.add_node(0);
        graph
    }

    /// Walk every tour that leaves the depot until it returns
    ///
    /// Arcs not on the walk (subtours) are ignored here; see [`Self::violations`].
    pub fn tours(&self) -> Vec<Tour> {
        (0..self.num_tours())
            .filter_map(|vehicle| {
                let graph = self.tour_graph(vehicle);
                let mut nodes = vec![0];
                let mut current = 0;
                for _ in 0..self.arcs[vehicle].len() {
                    match graph.neighbors(current).next() {
                        Some(next) => {
                            nodes.push(next);
                            if next == 0 {
                                break;
                            }
                            current = next;
                        }
                        None => break,
                    }
                }
                (nodes.len() > 1).then_some(Tour { vehicle, nodes })
            })
            .collect()
    }

    /// Every routing rule the solution breaks, empty for a feasible solution
    pub fn violations(&self, instance: &Instance) -> Vec<Violation> {
        let n = instance.n();
        let mut violations = Vec::new();

        let all_arcs = || self.arcs.iter().flatten().copied();

        for node in instance.demand_nodes() {
            let outgoing = all_arcs()
                .filter(|&(j, k)| j == node && (k == 0 || instance.is_supply_node(k)))
                .count();
            if outgoing != 1 {
                violations.push(Violation::DemandCoverage { node, outgoing });
            }
        }

        for node in instance.supply_nodes() {
            let outgoing = all_arcs()
                .filter(|&(j, k)| j == node && instance.is_demand_node(k))
                .count();
            if outgoing > 1 {
                violations.push(Violation::SupplyOutDegree { node, outgoing });
            }
        }

        let departures = all_arcs().filter(|&(j, _)| j == 0).count();
        if departures > instance.m() {
            violations.push(Violation::DepotFanOut {
                departures,
                vehicles: instance.m(),
            });
        }

        for (tour, arcs) in self.arcs.iter().enumerate() {
            for node in 0..n {
                let inflow = arcs.iter().filter(|&&(_, k)| k == node).count();
                let outflow = arcs.iter().filter(|&&(j, _)| j == node).count();
                if inflow != outflow {
                    violations.push(Violation::DegreeBalance {
                        tour,
                        node,
                        inflow,
                        outflow,
                    });
                }
            }

            let distance = self.distance(tour, instance);
            if distance > instance.budget() + BUDGET_TOLERANCE {
                violations.push(Violation::Budget {
                    tour,
                    distance,
                    budget: instance.budget(),
                });
            }

            for &(from, to) in arcs {
                if is_forbidden_arc(instance, from, to) {
                    violations.push(Violation::ForbiddenArc { tour, from, to });
                }
            }

            let active = self.active.get(tour).copied().unwrap_or(false);
            let departures = arcs.iter().filter(|&&(j, _)| j == 0).count();
            if active != (departures == 1) || departures > 1 || (!active && !arcs.is_empty()) {
                violations.push(Violation::Activation {
                    tour,
                    active,
                    departures,
                });
            }

            let graph = self.tour_graph(tour);
            let mut dfs = Dfs::new(&graph, 0);
            let mut reachable = Vec::new();
            while let Some(node) = dfs.next(&graph) {
                reachable.push(node);
            }
            for &(from, to) in arcs {
                if !reachable.contains(&from) {
                    violations.push(Violation::Subtour { tour, from, to });
                }
            }
        }

        violations
    }
}
