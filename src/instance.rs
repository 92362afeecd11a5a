//! Problem data: the depot, supply and demand nodes, the fleet size and the tour budget.
//!
//! An [`Instance`] is immutable once constructed. The model generator borrows it for the
//! duration of model building and reads it only through the accessors below.
//!
//! Instances can be loaded from a JSON document:
//!
//! ```json
//! {
//!   "vehicles": 2,
//!   "budget": 120.0,
//!   "nodes": ["depot", "supply", "supply", "demand"],
//!   "distances": [[0, 4, 6, 3], [4, 0, 2, 5], [6, 2, 0, 7], [3, 5, 7, 0]]
//! }
//! ```
//!
//! `coordinates` (a list of `[x, y]` pairs) may be given instead of `distances`, in which
//! case Euclidean distances are used. A missing or `null` budget means tours are unbounded.

use std::{error::Error, fmt, fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, warn};

/// Role of a node in the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The originator: start and end of every tour
    Depot,
    /// A node holding a surplus
    Supply,
    /// A node with a deficit
    Demand,
}

/// Reasons an instance is rejected
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceError {
    /// There are no nodes at all
    Empty,
    /// Node 0 must be the depot and no other node may be
    DepotPlacement(usize),
    /// There is not one distance row or coordinate per node
    RowCount { expected: usize, found: usize },
    /// A distance row does not have one entry per node
    MatrixShape { expected: usize, row: usize, len: usize },
    /// A distance is negative or not finite
    InvalidDistance { from: usize, to: usize, value: f64 },
    /// At least one tour is needed
    NoVehicles,
    /// The budget is negative or NaN
    InvalidBudget(f64),
    /// Neither `distances` nor `coordinates` were given, or both were
    DistanceSource,
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceError::Empty => write!(f, "Instance has no nodes."),
            InstanceError::DepotPlacement(node) => write!(
                f,
                "Node 0 must be the only depot, but node {} is misplaced.",
                node
            ),
            InstanceError::RowCount { expected, found } => write!(
                f,
                "Expected {} distance rows or coordinates, found {}.",
                expected, found
            ),
            InstanceError::MatrixShape { expected, row, len } => write!(
                f,
                "Distance matrix must be {0}x{0}, row {1} has {2} entries.",
                expected, row, len
            ),
            InstanceError::InvalidDistance { from, to, value } => {
                write!(f, "Invalid distance {} from {} to {}.", value, from, to)
            }
            InstanceError::NoVehicles => write!(f, "At least one vehicle is required."),
            InstanceError::InvalidBudget(budget) => write!(f, "Invalid tour budget {}.", budget),
            InstanceError::DistanceSource => write!(
                f,
                "Exactly one of `distances` or `coordinates` must be given."
            ),
        }
    }
}

impl Error for InstanceError {}

/// Immutable routing instance
///
/// Node `0` is the depot, every other node is a supply or a demand node. The distance
/// matrix is expected to be symmetric with a zero diagonal; violations are logged but
/// accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    vehicles: usize,
    budget: f64,
    kinds: Vec<NodeKind>,
    distances: Vec<f64>,
}

impl Instance {
    /// Build and validate an instance from a distance matrix
    pub fn new(
        vehicles: usize,
        budget: f64,
        kinds: Vec<NodeKind>,
        distances: Vec<Vec<f64>>,
    ) -> Result<Self, InstanceError> {
        let n = kinds.len();
        if n == 0 {
            return Err(InstanceError::Empty);
        }
        if let Some(node) = kinds
            .iter()
            .enumerate()
            .find(|&(j, kind)| (j == 0) != (*kind == NodeKind::Depot))
            .map(|(j, _)| j)
        {
            return Err(InstanceError::DepotPlacement(node));
        }
        if vehicles == 0 {
            return Err(InstanceError::NoVehicles);
        }
        if budget.is_nan() || budget < 0.0 {
            return Err(InstanceError::InvalidBudget(budget));
        }
        if distances.len() != n {
            return Err(InstanceError::RowCount {
                expected: n,
                found: distances.len(),
            });
        }

        let mut flat = Vec::with_capacity(n * n);
        for (from, row) in distances.into_iter().enumerate() {
            if row.len() != n {
                return Err(InstanceError::MatrixShape {
                    expected: n,
                    row: from,
                    len: row.len(),
                });
            }
            for (to, value) in row.into_iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(InstanceError::InvalidDistance { from, to, value });
                }
                flat.push(value);
            }
        }

        let instance = Self {
            vehicles,
            budget,
            kinds,
            distances: flat,
        };
        instance.warn_on_asymmetry();
        Ok(instance)
    }

    /// Build an instance with Euclidean distances between planar points
    pub fn from_coordinates(
        vehicles: usize,
        budget: f64,
        kinds: Vec<NodeKind>,
        points: &[(f64, f64)],
    ) -> Result<Self, InstanceError> {
        let distances = points
            .iter()
            .map(|&(x1, y1)| {
                points
                    .iter()
                    .map(|&(x2, y2)| ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt())
                    .collect()
            })
            .collect();
        Self::new(vehicles, budget, kinds, distances)
    }

    fn warn_on_asymmetry(&self) {
        let n = self.n();
        for j in 0..n {
            if self.distance(j, j) != 0.0 {
                warn!(node = j, "distance matrix has a non-zero diagonal entry");
            }
            for k in (j + 1)..n {
                if (self.distance(j, k) - self.distance(k, j)).abs() > 1e-9 {
                    warn!(from = j, to = k, "distance matrix is not symmetric");
                }
            }
        }
    }

    /// Number of nodes including the depot
    pub fn n(&self) -> usize {
        self.kinds.len()
    }

    /// Maximum number of tours
    pub fn m(&self) -> usize {
        self.vehicles
    }

    /// Distance budget of a single tour, `f64::INFINITY` when unbounded
    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances[from * self.n() + to]
    }

    pub fn kind(&self, node: usize) -> NodeKind {
        self.kinds[node]
    }

    pub fn is_supply_node(&self, node: usize) -> bool {
        self.kinds[node] == NodeKind::Supply
    }

    pub fn is_demand_node(&self, node: usize) -> bool {
        self.kinds[node] == NodeKind::Demand
    }

    pub fn supply_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.n()).filter(|&j| self.is_supply_node(j))
    }

    pub fn demand_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.n()).filter(|&j| self.is_demand_node(j))
    }
}

/// On-disk representation of an instance
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InstanceDocument {
    vehicles: usize,
    #[serde(default)]
    budget: Option<f64>,
    nodes: Vec<NodeKind>,
    #[serde(default)]
    distances: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    coordinates: Option<Vec<(f64, f64)>>,
}

impl TryFrom<InstanceDocument> for Instance {
    type Error = InstanceError;

    fn try_from(doc: InstanceDocument) -> Result<Self, Self::Error> {
        let budget = doc.budget.unwrap_or(f64::INFINITY);
        match (doc.distances, doc.coordinates) {
            (Some(distances), None) => Instance::new(doc.vehicles, budget, doc.nodes, distances),
            (None, Some(points)) => {
                if points.len() != doc.nodes.len() {
                    return Err(InstanceError::RowCount {
                        expected: doc.nodes.len(),
                        found: points.len(),
                    });
                }
                Instance::from_coordinates(doc.vehicles, budget, doc.nodes, &points)
            }
            _ => Err(InstanceError::DistanceSource),
        }
    }
}

/// Parse an instance from a JSON string
pub fn parse_instance(json: &str) -> anyhow::Result<Instance> {
    let doc: InstanceDocument = serde_json::from_str(json)?;
    Ok(Instance::try_from(doc)?)
}

/// Read and validate an instance from a JSON file
pub fn read_instance(path: &Path) -> anyhow::Result<Instance> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read instance {}", path.display()))?;
    let instance = parse_instance(&contents)
        .with_context(|| format!("Invalid instance {}", path.display()))?;
    debug!(
        nodes = instance.n(),
        vehicles = instance.m(),
        budget = instance.budget(),
        "instance loaded"
    );
    Ok(instance)
}
