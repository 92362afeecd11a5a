//! Plain-text export of a model in CPLEX LP format
//!
//! The export is a debugging artifact: it lets a model be inspected, diffed between
//! formulations, or fed to a standalone solver. Variables are written by name; constraints
//! without a name are written as `c<index>`.

use std::io::{self, Write};

use super::*;

/// Terms per line, keeps rows well below the 560 character limit of LP readers
const TERMS_PER_LINE: usize = 8;

fn fmt_number(value: f64) -> String {
    if value == f64::INFINITY {
        "+inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{}", value)
    }
}

fn write_terms<Brand, W: Write>(
    out: &mut W,
    builder: &LPModelBuilder<Brand>,
    expression: &LinearExpression<Brand>,
) -> io::Result<()> {
    if expression.terms.is_empty() {
        return write!(out, " 0");
    }

    for (idx, term) in expression.terms.iter().enumerate() {
        if idx > 0 && idx % TERMS_PER_LINE == 0 {
            write!(out, "\n   ")?;
        }
        let sign = if term.coefficient < 0.0 { '-' } else { '+' };
        let name = &builder.variables[term.variable.id].name;
        let magnitude = term.coefficient.abs();
        if idx == 0 && sign == '+' {
            write!(out, " {} {}", fmt_number(magnitude), name)?;
        } else {
            write!(out, " {} {} {}", sign, fmt_number(magnitude), name)?;
        }
    }
    Ok(())
}

/// Write `builder` to `out` in CPLEX LP format
pub fn write_lp<Brand, W: Write>(builder: &LPModelBuilder<Brand>, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "\\ {} variables, {} constraints",
        builder.variables.len(),
        builder.constraints.len()
    )?;

    match &builder.objective {
        Some(obj) => {
            match obj.sense {
                OptimizationSense::Minimize => writeln!(out, "Minimize")?,
                OptimizationSense::Maximize => writeln!(out, "Maximize")?,
            }
            write!(out, " obj:")?;
            write_terms(out, builder, &obj.expression)?;
            if obj.expression.constant != 0.0 {
                write!(out, " + {}", fmt_number(obj.expression.constant))?;
            }
            writeln!(out)?;
        }
        None => {
            writeln!(out, "Minimize")?;
            writeln!(out, " obj: 0")?;
        }
    }

    writeln!(out, "Subject To")?;
    for (idx, constraint) in builder.constraints.iter().enumerate() {
        match constraint.name() {
            Some(name) => write!(out, " {}:", name)?,
            None => write!(out, " c{}:", idx)?,
        }
        write_terms(out, builder, &constraint.expression)?;

        let rhs = constraint.rhs - constraint.expression.constant;
        let (op, rhs) = match constraint.sense {
            ConstraintSense::LessEqual => ("<=", rhs),
            ConstraintSense::Equal => ("=", rhs),
            ConstraintSense::GreaterEqual => (">=", rhs),
            // LP files have no strict inequalities
            ConstraintSense::Greater => (">=", rhs + 1e-10),
        };
        writeln!(out, " {} {}", op, fmt_number(rhs))?;
    }

    writeln!(out, "Bounds")?;
    for info in &builder.variables {
        if info.var_type == VariableType::Binary {
            continue;
        }
        match (info.lower_bound, info.upper_bound) {
            (lb, ub) if lb == 0.0 && ub == f64::INFINITY => {}
            (lb, ub) if lb == f64::NEG_INFINITY && ub == f64::INFINITY => {
                writeln!(out, " {} free", info.name)?
            }
            (lb, ub) if lb == ub => writeln!(out, " {} = {}", info.name, fmt_number(lb))?,
            (lb, ub) => writeln!(
                out,
                " {} <= {} <= {}",
                fmt_number(lb),
                info.name,
                fmt_number(ub)
            )?,
        }
    }

    let binaries: Vec<&str> = builder
        .variables
        .iter()
        .filter(|info| info.var_type == VariableType::Binary)
        .map(|info| info.name.as_ref())
        .collect();
    if !binaries.is_empty() {
        writeln!(out, "Binaries")?;
        for chunk in binaries.chunks(TERMS_PER_LINE) {
            writeln!(out, " {}", chunk.join(" "))?;
        }
    }

    let generals: Vec<&str> = builder
        .variables
        .iter()
        .filter(|info| info.var_type == VariableType::Integer)
        .map(|info| info.name.as_ref())
        .collect();
    if !generals.is_empty() {
        writeln!(out, "Generals")?;
        for chunk in generals.chunks(TERMS_PER_LINE) {
            writeln!(out, " {}", chunk.join(" "))?;
        }
    }

    writeln!(out, "End")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constraint, lp_model_builder};

    #[test]
    fn test_lp_export_sections() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", VariableType::Binary, 0.0, 1.0);
        let y = builder.add_variable("y", VariableType::Continuous, 0.0, f64::INFINITY);
        let z = builder.add_variable("z", VariableType::Integer, -2.0, 4.0);

        builder.add_constraint(constraint!("link", (y - 3.0 * x) <= 0.0));
        builder.add_constraint(constraint!((x + z + 1.0) == 2.0));
        builder.set_objective(2.0 * x + y, OptimizationSense::Minimize);

        let mut out = Vec::new();
        write_lp(&builder, &mut out).expect("writing to a Vec cannot fail");
        let text = String::from_utf8(out).expect("LP export is UTF-8");

        assert!(text.contains("Minimize\n obj: 2 x + 1 y\n"));
        assert!(text.contains(" link: 1 y - 3 x <= 0\n"));
        assert!(text.contains(" c1: 1 x + 1 z = 1\n"));
        assert!(text.contains(" -2 <= z <= 4\n"));
        assert!(!text.contains(" y free"));
        assert!(text.contains("Binaries\n x\n"));
        assert!(text.contains("Generals\n z\n"));
        assert!(text.trim_end().ends_with("End"));
    }

    #[test]
    fn test_lp_export_infinite_rhs_and_fixed_bounds() {
        let mut builder = lp_model_builder!();
        let f = builder.add_variable("f_0_1_1", VariableType::Continuous, 0.0, 0.0);
        let u = builder.add_variable("u", VariableType::Continuous, f64::NEG_INFINITY, f64::INFINITY);
        builder.add_constraint(constraint!("budget_0", (f + u) <= f64::INFINITY));

        let mut out = Vec::new();
        write_lp(&builder, &mut out).expect("writing to a Vec cannot fail");
        let text = String::from_utf8(out).expect("LP export is UTF-8");

        assert!(text.contains(" budget_0: 1 f_0_1_1 + 1 u <= +inf\n"));
        assert!(text.contains(" f_0_1_1 = 0\n"));
        assert!(text.contains(" u free\n"));
        assert!(!text.contains("Binaries"));
    }
}
