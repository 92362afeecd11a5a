use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Depot, two supplies, one demand close to supply 1
const SINGLE_PAIR: &str = r#"{
    "vehicles": 1,
    "budget": null,
    "nodes": ["depot", "supply", "supply", "demand"],
    "coordinates": [[0, 0], [0, 5], [20, 20], [0, 8]]
}"#;

/// Two supply/demand pairs that only fit the budget as separate tours
const TWO_PAIRS: &str = r#"{
    "vehicles": 2,
    "budget": 30,
    "nodes": ["depot", "supply", "supply", "demand", "demand"],
    "coordinates": [[0, 0], [0, 10], [10, 0], [0, 11], [11, 0]]
}"#;

// Helper function to create a temporary instance file
fn create_instance(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("instance.json");
    fs::write(&file_path, content).expect("Failed to write instance file");
    (temp_dir, file_path)
}

// Helper function to run the tcbvrp binary
fn run_tcbvrp(command: &str, input: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tcbvrp"))
        .arg(command)
        .arg(input)
        .args(args)
        .env("TCBVRP_LP_SOLVER", "cbc")
        .output()
        .expect("Failed to run tcbvrp")
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_solve_writes_report() {
        let (temp_dir, input) = create_instance(SINGLE_PAIR);
        let report = temp_dir.path().join("out.rpt");

        for model in ["scf", "mcf", "mtz"] {
            let output = run_tcbvrp(
                "solve",
                &input,
                &[
                    "--model",
                    model,
                    "--display-level",
                    "0",
                    "--report",
                    report.to_str().expect("temp path is UTF-8"),
                ],
            );
            assert!(
                output.status.success(),
                "{} should succeed. stderr: {}",
                model,
                String::from_utf8_lossy(&output.stderr)
            );

            let content = fs::read_to_string(&report).expect("report should be written");
            assert!(content.contains(&format!("Formulation: {}", model)));
            assert!(content.contains("Status: Optimal"));
            assert!(content.contains("Branch-and-Bound nodes:"));
            assert!(content.contains("Objective value: 16"));
            assert!(content.contains("Elapsed time:"));
            assert!(content.contains("t_0_0_1"));
            assert!(content.contains("r_0"));
            assert!(content.contains("0 -> 1 -> 3 -> 0"));
            assert!(!content.contains("Violation"));
        }
    }

    #[test]
    fn test_solve_splits_tours_under_budget() {
        let (temp_dir, input) = create_instance(TWO_PAIRS);
        let report = temp_dir.path().join("out.rpt");

        let output = run_tcbvrp(
            "solve",
            &input,
            &[
                "-m",
                "mtz",
                "-d",
                "0",
                "--report",
                report.to_str().expect("temp path is UTF-8"),
            ],
        );
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let content = fs::read_to_string(&report).expect("report should be written");
        assert!(content.contains("0 -> 1 -> 3 -> 0"));
        assert!(content.contains("0 -> 2 -> 4 -> 0"));
        assert!(content.contains("total distance 44.000"));
    }

    #[test]
    fn test_solve_prints_to_stdout_without_report() {
        let (_temp_dir, input) = create_instance(SINGLE_PAIR);
        let output = run_tcbvrp("solve", &input, &["--model", "scf", "--display-level", "0"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Status: Optimal"));
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let (temp_dir, input) = create_instance(SINGLE_PAIR);
        let lp = temp_dir.path().join("model.lp");

        let output = run_tcbvrp(
            "export",
            &input,
            &["--model", "dfj", "--lp", lp.to_str().expect("temp path is UTF-8")],
        );

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown formulation 'dfj'"));
        assert!(!lp.exists(), "No model should be written");
    }

    #[test]
    fn test_export_writes_lp_file() {
        let (temp_dir, input) = create_instance(TWO_PAIRS);
        let lp = temp_dir.path().join("model.lp");

        let output = run_tcbvrp(
            "export",
            &input,
            &["--model", "scf", "--lp", lp.to_str().expect("temp path is UTF-8")],
        );
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let content = fs::read_to_string(&lp).expect("LP file should be written");
        assert!(content.contains("Minimize"));
        assert!(content.contains("Subject To"));
        assert!(content.contains(" scf_source_1:"));
        assert!(content.contains(" budget_1:"));
        assert!(content.contains("<= 30\n"));
        assert!(content.contains("Binaries"));
        assert!(content.trim_end().ends_with("End"));
    }

    #[test]
    fn test_invalid_instance_is_reported() {
        let (_temp_dir, input) = create_instance(
            r#"{"vehicles": 1, "nodes": ["supply", "depot"], "distances": [[0, 1], [1, 0]]}"#,
        );
        let output = run_tcbvrp("solve", &input, &["--model", "mtz"]);

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Invalid instance"), "stderr: {}", stderr);
    }

    #[test]
    fn test_infeasible_budget_fails() {
        let (_temp_dir, input) = create_instance(&TWO_PAIRS.replace("\"budget\": 30", "\"budget\": 15"));
        let output = run_tcbvrp("solve", &input, &["--model", "scf", "--display-level", "0"]);

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("Status:"));
    }
}
