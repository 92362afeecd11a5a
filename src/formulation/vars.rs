//! Fixed-shape variable arenas addressed by a computed linear index.

use super::Var;

/// Three-dimensional block of variables, row-major
#[derive(Debug, Clone)]
pub struct Grid3 {
    shape: [usize; 3],
    vars: Vec<Var>,
}

impl Grid3 {
    /// Allocate every cell in index order by calling `make(a, b, c)`
    pub fn new(shape: [usize; 3], mut make: impl FnMut(usize, usize, usize) -> Var) -> Self {
        let [d0, d1, d2] = shape;
        let mut vars = Vec::with_capacity(d0 * d1 * d2);
        for a in 0..d0 {
            for b in 0..d1 {
                for c in 0..d2 {
                    vars.push(make(a, b, c));
                }
            }
        }
        Self { shape, vars }
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    #[inline]
    pub fn get(&self, a: usize, b: usize, c: usize) -> Var {
        let [d0, d1, d2] = self.shape;
        debug_assert!(a < d0 && b < d1 && c < d2, "index out of shape");
        self.vars[(a * d1 + b) * d2 + c]
    }

    /// Every cell with its indices, in allocation order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize, Var)> + '_ {
        let [_, d1, d2] = self.shape;
        self.vars
            .iter()
            .enumerate()
            .map(move |(idx, &var)| (idx / (d1 * d2), (idx / d2) % d1, idx % d2, var))
    }
}

/// Two-dimensional block of variables, row-major
#[derive(Debug, Clone)]
pub struct Grid2 {
    shape: [usize; 2],
    vars: Vec<Var>,
}

impl Grid2 {
    pub fn new(shape: [usize; 2], mut make: impl FnMut(usize, usize) -> Var) -> Self {
        let [d0, d1] = shape;
        let mut vars = Vec::with_capacity(d0 * d1);
        for a in 0..d0 {
            for b in 0..d1 {
                vars.push(make(a, b));
            }
        }
        Self { shape, vars }
    }

    pub fn shape(&self) -> [usize; 2] {
        self.shape
    }

    #[inline]
    pub fn get(&self, a: usize, b: usize) -> Var {
        let [d0, d1] = self.shape;
        debug_assert!(a < d0 && b < d1, "index out of shape");
        self.vars[a * d1 + b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulation::TourModel;
    use crate::lp_solver::{LPModelBuilder, VariableType};

    #[test]
    fn test_grid3_addressing_matches_allocation_order() {
        let mut builder = LPModelBuilder::<TourModel>::new();
        let grid = Grid3::new([2, 3, 4], |a, b, c| {
            builder.add_variable(format!("v_{}_{}_{}", a, b, c), VariableType::Binary, 0.0, 1.0)
        });

        assert_eq!(grid.shape(), [2, 3, 4]);
        assert_eq!(builder.num_variables(), 24);
        assert_eq!(builder.variable_name(grid.get(1, 2, 3)), "v_1_2_3");
        assert_eq!(builder.variable_name(grid.get(0, 1, 0)), "v_0_1_0");

        for (a, b, c, var) in grid.iter() {
            assert_eq!(var, grid.get(a, b, c));
        }
        assert_eq!(grid.iter().count(), 24);
    }

    #[test]
    fn test_grid2_addressing() {
        let mut builder = LPModelBuilder::<TourModel>::new();
        let grid = Grid2::new([3, 2], |a, b| {
            builder.add_variable(format!("u_{}_{}", a, b), VariableType::Continuous, 0.0, 1.0)
        });

        assert_eq!(grid.shape(), [3, 2]);
        assert_eq!(builder.variable_name(grid.get(2, 1)), "u_2_1");
        assert_eq!(builder.variable_name(grid.get(1, 0)), "u_1_0");
    }
}
