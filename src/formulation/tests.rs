#[cfg(test)]
mod formulation_unit_tests {
    use std::time::Duration;

    use crate::constraint;
    use crate::formulation::*;
    use crate::instance::{Instance, NodeKind::*};
    use crate::lp_solver::{OptimizationStatus, SolverConfig, VariableId};
    use crate::solution::RoutingSolution;

    /// Quiet single-threaded search with a short limit
    fn test_config() -> SolverConfig {
        SolverConfig {
            time_limit: Duration::from_secs(60),
            display_level: 0,
            ..SolverConfig::default()
        }
    }

    /// Depot, supplies 1 and 2 to the north and east, demands 3 and 4 just beyond them
    fn two_pair_instance(vehicles: usize, budget: f64) -> Instance {
        Instance::from_coordinates(
            vehicles,
            budget,
            vec![Depot, Supply, Supply, Demand, Demand],
            &[(0.0, 0.0), (0.0, 10.0), (10.0, 0.0), (0.0, 11.0), (11.0, 0.0)],
        )
        .expect("valid instance")
    }

    fn solve(instance: &Instance, formulation: Formulation) -> (f64, RoutingSolution) {
        let model = TcbvrpModel::build(instance, formulation);
        let solution = model
            .solve(&test_config())
            .expect("solver should run");
        assert_eq!(
            solution.status,
            OptimizationStatus::Optimal,
            "{} should be solved to optimality",
            formulation
        );
        (
            solution.objective_value,
            RoutingSolution::from_values(&model, &solution),
        )
    }

    #[test]
    fn test_formulation_from_str() {
        assert_eq!("scf".parse::<Formulation>(), Ok(Formulation::Scf));
        assert_eq!("MCF".parse::<Formulation>(), Ok(Formulation::Mcf));
        assert_eq!("mtz".parse::<Formulation>(), Ok(Formulation::Mtz));
        assert_eq!(
            "dfj".parse::<Formulation>(),
            Err(crate::AppError::UnknownFormulation("dfj".to_string()))
        );
        for formulation in Formulation::ALL {
            assert_eq!(formulation.to_string().parse::<Formulation>(), Ok(formulation));
        }
    }

    #[test]
    fn test_variable_families_per_formulation() {
        let instance = two_pair_instance(2, f64::INFINITY);
        let (n, m) = (instance.n(), instance.m());
        let scaffold = m * n * n + m;

        let scf = TcbvrpModel::build(&instance, Formulation::Scf);
        assert_eq!(scf.builder().num_variables(), scaffold + m * n * n);
        assert!(matches!(scf.strategy(), StrategyVars::Scf { .. }));

        let mcf = TcbvrpModel::build(&instance, Formulation::Mcf);
        assert_eq!(mcf.builder().num_variables(), scaffold + (n - 1) * n * n);
        if let StrategyVars::Mcf { flow } = mcf.strategy() {
            assert_eq!(flow.commodities(), n - 1);
            assert_eq!(mcf.builder().variable_name(flow.get(4, 2, 1)), "f_4_2_1");
        } else {
            panic!("MCF model should carry commodity flows");
        }

        let mtz = TcbvrpModel::build(&instance, Formulation::Mtz);
        assert_eq!(mtz.builder().num_variables(), scaffold + m * n);
        if let StrategyVars::Mtz { order } = mtz.strategy() {
            assert_eq!(mtz.builder().variable_bounds(order.get(1, 0)), (0.0, 0.0));
            assert_eq!(mtz.builder().variable_name(order.get(1, 3)), "u_1_3");
        } else {
            panic!("MTZ model should carry order potentials");
        }

        assert_eq!(mtz.builder().variable_name(mtz.arc(1, 2, 4)), "t_1_2_4");
        assert_eq!(mtz.builder().variable_name(mtz.route(0)), "r_0");
        assert_eq!(mtz.formulation(), Formulation::Mtz);
    }

    #[test]
    fn test_flow_on_self_loops_is_fixed() {
        let instance = two_pair_instance(1, f64::INFINITY);
        let model = TcbvrpModel::build(&instance, Formulation::Scf);
        if let StrategyVars::Scf { flow } = model.strategy() {
            assert_eq!(model.builder().variable_bounds(flow.get(0, 2, 2)), (0.0, 0.0));
            assert_eq!(
                model.builder().variable_bounds(flow.get(0, 2, 4)),
                (0.0, f64::INFINITY)
            );
        } else {
            panic!("SCF model should carry tour flows");
        }
    }

    /// One supply and one demand worth visiting: the tour is depot, supply, demand, depot
    #[test]
    fn test_single_pair_tour() {
        let instance = Instance::from_coordinates(
            1,
            f64::INFINITY,
            vec![Depot, Supply, Supply, Demand],
            &[(0.0, 0.0), (0.0, 5.0), (20.0, 20.0), (0.0, 8.0)],
        )
        .expect("valid instance");

        for formulation in Formulation::ALL {
            let model = TcbvrpModel::build(&instance, formulation);
            let solution = model.solve(&test_config()).expect("solver should run");
            assert_eq!(solution.status, OptimizationStatus::Optimal);
            assert!((solution.objective_value - 16.0).abs() < 1e-6);
            assert_eq!(solution.get_value(model.route(0)), Some(1.0));

            let arcs: Vec<_> = model
                .builder()
                .nonzero_values(&solution)
                .filter(|(name, value)| name.starts_with("t_") && *value > 0.5)
                .collect();
            assert_eq!(arcs.len(), 3, "{}: {:?}", formulation, arcs);

            let routing = RoutingSolution::from_values(&model, &solution);
            let tours = routing.tours();
            assert_eq!(tours.len(), 1);
            assert_eq!(tours[0].nodes, vec![0, 1, 3, 0]);
            assert!(routing.violations(&instance).is_empty());
        }
    }

    #[test]
    fn test_formulations_agree_on_optimum() {
        let instance = two_pair_instance(1, 1000.0);
        let d = |a, b| instance.distance(a, b);
        let expected = d(0, 1) + d(1, 3) + d(3, 2) + d(2, 4) + d(4, 0);

        let objectives: Vec<f64> = Formulation::ALL
            .iter()
            .map(|&formulation| {
                let (objective, routing) = solve(&instance, formulation);
                assert!(
                    routing.violations(&instance).is_empty(),
                    "{}: {:?}",
                    formulation,
                    routing.violations(&instance)
                );
                assert_eq!(routing.num_arcs(), 5);
                assert!((routing.total_distance(&instance) - objective).abs() < 1e-4);
                objective
            })
            .collect();

        for objective in objectives {
            assert!(
                (objective - expected).abs() < 1e-4,
                "objective {} differs from {}",
                objective,
                expected
            );
        }
    }

    #[test]
    fn test_budget_splits_into_two_tours() {
        // One tour over both pairs is about 37.9 long, two separate tours are 22 each
        let unbounded = two_pair_instance(2, f64::INFINITY);
        let (objective, routing) = solve(&unbounded, Formulation::Scf);
        assert_eq!(routing.tours().len(), 1);
        assert!(objective < 40.0);

        let bounded = two_pair_instance(2, 30.0);
        for formulation in Formulation::ALL {
            let (objective, routing) = solve(&bounded, formulation);
            assert!((objective - 44.0).abs() < 1e-4, "{}: {}", formulation, objective);

            let tours = routing.tours();
            assert_eq!(tours.len(), 2);
            for tour in &tours {
                assert_eq!(tour.nodes.len(), 4);
                assert!(tour.distance(&bounded) <= 30.0 + 1e-6);
            }
            assert!(routing.violations(&bounded).is_empty());
        }
    }

    #[test]
    fn test_budget_too_tight_is_infeasible() {
        let instance = two_pair_instance(2, 15.0);
        for formulation in Formulation::ALL {
            let model = TcbvrpModel::build(&instance, formulation);
            let solution = model.solve(&test_config()).expect("solver should run");
            assert!(
                !matches!(
                    solution.status,
                    OptimizationStatus::Optimal | OptimizationStatus::Feasible
                ),
                "{} should not find a tour within the budget",
                formulation
            );
            assert!(!solution.has_values());
        }
    }

    /// Assigning both arcs of the 1 <-> 3 cycle breaks the two ordering rows
    #[test]
    fn test_mtz_rejects_two_cycle_assignment() {
        let instance = two_pair_instance(1, f64::INFINITY);
        let model = TcbvrpModel::build(&instance, Formulation::Mtz);
        let (t13, t31) = (model.arc(0, 1, 3), model.arc(0, 3, 1));

        let value = |v: VariableId<TourModel>| if v == t13 || v == t31 { 1.0 } else { 0.0 };
        let violated: Vec<_> = model
            .builder()
            .violated_constraints(value, 1e-9)
            .into_iter()
            .filter_map(|c| c.name())
            .filter(|name| name.starts_with("mtz_order"))
            .collect();

        assert_eq!(violated, vec!["mtz_order_0_1_3", "mtz_order_0_3_1"]);
    }

    /// 0 -> 2 -> 4 -> 0 plus a detached 1 <-> 3 cycle satisfies the scaffold rows only
    #[test]
    fn test_detached_cycle_is_infeasible() {
        let instance = two_pair_instance(1, f64::INFINITY);

        for formulation in Formulation::ALL {
            let mut model = TcbvrpModel::build(&instance, formulation);
            for (j, k) in [(1, 3), (3, 1)] {
                let arc = model.arc(0, j, k);
                model.add_constraint(constraint!(format!("fix_{}_{}", j, k), (arc) == 1.0));
            }

            let solution = model.solve(&test_config()).expect("solver should run");
            assert!(
                !matches!(
                    solution.status,
                    OptimizationStatus::Optimal | OptimizationStatus::Feasible
                ),
                "{} accepted a detached cycle",
                formulation
            );
            assert!(!solution.has_values());
        }
    }

    #[test]
    fn test_lp_export_names_rows() {
        let instance = two_pair_instance(1, f64::INFINITY);
        let model = TcbvrpModel::build(&instance, Formulation::Mcf);

        let mut out = Vec::new();
        model.write_lp(&mut out).expect("writing to a Vec cannot fail");
        let text = String::from_utf8(out).expect("LP export is UTF-8");

        assert!(text.starts_with("\\ "));
        assert!(text.contains("Minimize\n obj:"));
        assert!(text.contains(" depot_fanout:"));
        assert!(text.contains(" mcf_origin_1:"));
        assert!(text.contains(" budget_0:"));
        assert!(text.contains("<= +inf\n"));
        assert!(text.contains("Binaries\n t_0_0_0"));
        assert!(text.trim_end().ends_with("End"));
    }
}
