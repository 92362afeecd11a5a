//! Operator overloading for linear programming expressions
//!
//! This module provides convenient operator overloading for building linear expressions
//! using natural mathematical notation.
//!
//! ```ignore
//! let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);
//! let y = builder.add_variable("y", VariableType::Continuous, 0.0, 10.0);
//!
//! let expr1 = x + y;             // Addition
//! let expr2 = x - y;             // Subtraction
//! let expr3 = 2.0 * x;           // Scalar multiplication (left)
//! let expr4 = x * 2.0;           // Scalar multiplication (right)
//! let expr5 = x + 2.0 * y + 5.0; // Complex expressions
//! let expr6 = (x + y) * 3.0;     // Parentheses work
//! ```
//!
//! Sums over index ranges are written with [`Iterator::sum`], either over variables or
//! over expressions:
//!
//! ```ignore
//! let out_degree: LinearExpression<_> = (1..n).map(|k| arcs.get(tour, 0, k)).sum();
//! let length: LinearExpression<_> = arcs_of(tour).map(|(j, k, t)| d(j, k) * t).sum();
//! ```
//!
//! All operations maintain the brand type parameter, ensuring variables from different
//! models cannot be accidentally mixed.

use super::{LinearExpression, LinearTerm, VariableId};

// ============================================================================
// Operators for LinearExpression
// ============================================================================

impl<Brand> std::ops::Add<LinearExpression<Brand>> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn add(self, other: LinearExpression<Brand>) -> Self::Output {
        let mut terms = self.terms;
        terms.extend(other.terms);
        LinearExpression {
            terms,
            constant: self.constant + other.constant,
        }
    }
}

impl<Brand> std::ops::Add<VariableId<Brand>> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn add(mut self, other: VariableId<Brand>) -> Self::Output {
        self.add_term(1.0, other);
        self
    }
}

impl<Brand> std::ops::Add<f64> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn add(self, other: f64) -> Self::Output {
        LinearExpression {
            terms: self.terms,
            constant: self.constant + other,
        }
    }
}

impl<Brand> std::ops::AddAssign<LinearExpression<Brand>> for LinearExpression<Brand> {
    fn add_assign(&mut self, other: LinearExpression<Brand>) {
        self.terms.extend(other.terms);
        self.constant += other.constant;
    }
}

impl<Brand> std::ops::AddAssign<VariableId<Brand>> for LinearExpression<Brand> {
    fn add_assign(&mut self, other: VariableId<Brand>) {
        self.add_term(1.0, other);
    }
}

impl<Brand> std::ops::Sub<LinearExpression<Brand>> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn sub(self, other: LinearExpression<Brand>) -> Self::Output {
        self + (-other)
    }
}

impl<Brand> std::ops::Sub<VariableId<Brand>> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn sub(mut self, other: VariableId<Brand>) -> Self::Output {
        self.add_term(-1.0, other);
        self
    }
}

impl<Brand> std::ops::Sub<f64> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn sub(self, other: f64) -> Self::Output {
        LinearExpression {
            terms: self.terms,
            constant: self.constant - other,
        }
    }
}

impl<Brand> std::ops::Neg for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

impl<Brand> std::ops::Mul<f64> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn mul(self, other: f64) -> Self::Output {
        LinearExpression {
            terms: self
                .terms
                .into_iter()
                .map(|term| LinearTerm {
                    coefficient: term.coefficient * other,
                    variable: term.variable,
                })
                .collect(),
            constant: self.constant * other,
        }
    }
}

impl<Brand> std::ops::Mul<LinearExpression<Brand>> for f64 {
    type Output = LinearExpression<Brand>;

    fn mul(self, other: LinearExpression<Brand>) -> Self::Output {
        other * self
    }
}

impl<Brand> std::iter::Sum<LinearExpression<Brand>> for LinearExpression<Brand> {
    fn sum<I: Iterator<Item = LinearExpression<Brand>>>(iter: I) -> Self {
        iter.fold(LinearExpression::new(0.0), |mut acc, expr| {
            acc += expr;
            acc
        })
    }
}

impl<Brand> std::iter::Sum<VariableId<Brand>> for LinearExpression<Brand> {
    fn sum<I: Iterator<Item = VariableId<Brand>>>(iter: I) -> Self {
        let mut expr = LinearExpression::new(0.0);
        for variable in iter {
            expr.add_term(1.0, variable);
        }
        expr
    }
}

// ============================================================================
// Operators for VariableId
// ============================================================================

impl<Brand> std::ops::Add<LinearExpression<Brand>> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn add(self, other: LinearExpression<Brand>) -> Self::Output {
        LinearExpression::from_variable(self) + other
    }
}

impl<Brand> std::ops::Add<VariableId<Brand>> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn add(self, other: VariableId<Brand>) -> Self::Output {
        LinearExpression::from_variable(self) + other
    }
}

impl<Brand> std::ops::Add<f64> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn add(self, other: f64) -> Self::Output {
        LinearExpression::from_variable(self) + other
    }
}

impl<Brand> std::ops::Sub<VariableId<Brand>> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn sub(self, other: VariableId<Brand>) -> Self::Output {
        LinearExpression::from_variable(self) - other
    }
}

impl<Brand> std::ops::Sub<LinearExpression<Brand>> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn sub(self, other: LinearExpression<Brand>) -> Self::Output {
        LinearExpression::from_variable(self) - other
    }
}

impl<Brand> std::ops::Sub<f64> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn sub(self, other: f64) -> Self::Output {
        LinearExpression::from_variable(self) - other
    }
}

impl<Brand> std::ops::Mul<f64> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn mul(self, other: f64) -> Self::Output {
        LinearExpression::from_variable(self) * other
    }
}

impl<Brand> std::ops::Mul<VariableId<Brand>> for f64 {
    type Output = LinearExpression<Brand>;

    fn mul(self, other: VariableId<Brand>) -> Self::Output {
        other * self
    }
}

// ============================================================================
// Reverse operators for f64
// ============================================================================

impl<Brand> std::ops::Add<VariableId<Brand>> for f64 {
    type Output = LinearExpression<Brand>;

    fn add(self, other: VariableId<Brand>) -> Self::Output {
        LinearExpression::from_variable(other) + self
    }
}

impl<Brand> std::ops::Sub<VariableId<Brand>> for f64 {
    type Output = LinearExpression<Brand>;

    fn sub(self, other: VariableId<Brand>) -> Self::Output {
        LinearExpression::new(self) - other
    }
}

impl<Brand> std::ops::Sub<LinearExpression<Brand>> for f64 {
    type Output = LinearExpression<Brand>;

    fn sub(self, other: LinearExpression<Brand>) -> Self::Output {
        LinearExpression::new(self) - other
    }
}

#[cfg(test)]
mod tests {
    use crate::lp_model_builder;
    use crate::lp_solver::{LinearExpression, VariableType};

    #[test]
    fn test_expression_operations() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);
        let y = builder.add_variable("y", VariableType::Continuous, 0.0, 10.0);

        let expr = 2.0 * x + 3.0 * y + 5.0;
        assert_eq!(expr.constant, 5.0);
        assert_eq!(expr.terms.len(), 2);

        assert_eq!((x + y).terms.len(), 2);
        assert_eq!((x - y).terms.len(), 2);
        assert_eq!((2.0 * x).terms.len(), 1);
        assert_eq!((x * 2.0).terms.len(), 1);
    }

    #[test]
    fn test_constant_minus_variable() {
        let mut builder = lp_model_builder!();
        let t = builder.add_variable("t", VariableType::Binary, 0.0, 1.0);

        // (n - 1) * (1 - t) as used by ordering constraints
        let expr = 4.0 * (1.0 - t);
        assert_eq!(expr.constant, 4.0);
        assert_eq!(expr.terms[0].coefficient, -4.0);
        assert_eq!(expr.evaluate(|_| 1.0), 0.0);
        assert_eq!(expr.evaluate(|_| 0.0), 4.0);
    }

    #[test]
    fn test_sum_of_variables_and_expressions() {
        let mut builder = lp_model_builder!();
        let vars: Vec<_> = (0..4)
            .map(|i| builder.add_variable(format!("v_{}", i), VariableType::Continuous, 0.0, 1.0))
            .collect();

        let plain: LinearExpression<_> = vars.iter().copied().sum();
        assert_eq!(plain.terms.len(), 4);
        assert_eq!(plain.evaluate(|_| 1.0), 4.0);

        let weighted: LinearExpression<_> = vars
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64) * v)
            .sum();
        assert_eq!(weighted.evaluate(|_| 2.0), 12.0);

        let empty: LinearExpression<_> = vars.iter().copied().take(0).sum();
        assert!(empty.terms.is_empty());
        assert_eq!(empty.constant, 0.0);
    }

    #[test]
    fn test_subtraction_negates_terms_and_constant() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);
        let y = builder.add_variable("y", VariableType::Continuous, 0.0, 10.0);

        let expr = (x + 1.0) - (2.0 * y + 3.0);
        assert_eq!(expr.constant, -2.0);
        assert_eq!(expr.terms[1].coefficient, -2.0);
        assert_eq!(expr.evaluate(|v| if v == x { 5.0 } else { 1.0 }), 1.0);
    }

    #[test]
    fn test_variable_id_debug() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);

        let debug_str = format!("{:?}", x);
        assert!(debug_str.contains("VariableId"));
    }
}
