//! Macros for the LP solver module
//!
//! This module contains all the macros used by the LP solver, providing
//! convenient syntax for creating models and constraints.

/// Create a new LP model builder with a unique brand
///
/// This macro ensures that each model builder has a unique type-level brand,
/// preventing accidental mixing of variables between different models.
///
/// # Examples
///
/// ```rust
/// use tcbvrp::lp_model_builder;
/// use tcbvrp::lp_solver::VariableType;
///
/// // Anonymous brand (each call creates unique anonymous type)
/// let mut builder = lp_model_builder!();
/// let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);
///
/// // Named brand (easier to identify in type system and errors)
/// let mut routing = lp_model_builder!(RoutingModel);
/// let mut matching = lp_model_builder!(MatchingModel);
///
/// let arc = routing.add_variable("t_0_0_1", VariableType::Binary, 0.0, 1.0);
/// let pair = matching.add_variable("p_1_2", VariableType::Binary, 0.0, 1.0);
///
/// // This would cause a compile-time error due to different brands:
/// // matching.add_constraint(constraint!((arc) <= 1.0)); // ERROR!
/// ```
#[macro_export]
macro_rules! lp_model_builder {
    // Named brand - user provides the brand name
    ($brand_name:ident) => {{
        struct $brand_name;
        $crate::lp_solver::LPModelBuilder::<$brand_name>::new()
    }};

    // Anonymous brand - the `UniqueBrand` struct is defined locally within the `{{ ... }}` block,
    // so each macro invocation creates a fresh scope with its own distinct `UniqueBrand` type
    () => {{
        struct UniqueBrand;
        $crate::lp_solver::LPModelBuilder::<UniqueBrand>::new()
    }};
}

/// Create constraints using natural comparison syntax
///
/// This macro provides a declarative way to create `Constraint` objects using
/// comparison-like syntax. The left-hand side must be in parentheses. An optional
/// leading name labels the row in diagnostic exports.
///
/// # Examples
///
/// ```rust
/// use tcbvrp::constraint;
/// use tcbvrp::lp_model_builder;
/// use tcbvrp::lp_solver::VariableType;
///
/// let mut builder = lp_model_builder!(OptimisationModel);
/// let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);
/// let y = builder.add_variable("y", VariableType::Continuous, 0.0, 10.0);
///
/// let c1 = constraint!((x + y) == 10.0);
/// let c2 = constraint!((2.0 * x) <= 5.0);
/// let c3 = constraint!((x - y) >= 0.0);
/// let c4 = constraint!((x) > 1.0);
///
/// builder.add_constraint(constraint!(format!("cap_{}", 0), (2.0 * x) <= 15.0));
/// ```
#[macro_export]
macro_rules! constraint {
    (($lhs:expr) == $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $lhs,
            $crate::lp_solver::ConstraintSense::Equal,
            $rhs as f64,
        )
    };
    (($lhs:expr) <= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $lhs,
            $crate::lp_solver::ConstraintSense::LessEqual,
            $rhs as f64,
        )
    };
    (($lhs:expr) >= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $lhs,
            $crate::lp_solver::ConstraintSense::GreaterEqual,
            $rhs as f64,
        )
    };
    (($lhs:expr) > $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $lhs,
            $crate::lp_solver::ConstraintSense::Greater,
            $rhs as f64,
        )
    };

    // Named constraints (with name parameter)
    ($name:expr, ($lhs:expr) == $rhs:expr) => {
        $crate::constraint!(($lhs) == $rhs).with_name($name)
    };
    ($name:expr, ($lhs:expr) <= $rhs:expr) => {
        $crate::constraint!(($lhs) <= $rhs).with_name($name)
    };
    ($name:expr, ($lhs:expr) >= $rhs:expr) => {
        $crate::constraint!(($lhs) >= $rhs).with_name($name)
    };
    ($name:expr, ($lhs:expr) > $rhs:expr) => {
        $crate::constraint!(($lhs) > $rhs).with_name($name)
    };
}
