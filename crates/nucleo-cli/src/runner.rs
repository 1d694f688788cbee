//! Composition runner: ties together the job file, mixture table, and builder.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use nucleo_core::{build_from_params, CompositionMap, CompositionSummary};
use nucleo_mixture::load_mixture;

use crate::config::JobConfig;

/// Build the initial composition described by a job.
pub fn run_build(job: &JobConfig) -> Result<CompositionMap> {
    let params = job.composition_params();
    println!(
        "  X={}, Z={}, grid {}x{}, mixture {}",
        params.hydrogen_fraction,
        params.metallicity,
        params.grid.nr,
        params.grid.nth,
        params.mixture_table.display()
    );

    let comp = build_from_params(&params)?;

    let norm = comp.normalization_error();
    if !norm.is_finite() {
        anyhow::bail!(
            "Composition is not finite (check X={}, Z={} and the mixture table)",
            params.hydrogen_fraction,
            params.metallicity
        );
    }
    if norm > 1e-12 {
        log::warn!("Composition departs from unit sum by {:.2e}", norm);
    }
    Ok(comp)
}

/// Print the bulk quantities and per-species means.
pub fn print_summary(summary: &CompositionSummary) {
    println!("  X = {:.6}", summary.x);
    println!("  Y = {:.6}", summary.y);
    println!("  Z = {:.6}", summary.z);
    println!("  max |sum - 1| = {:.2e}", summary.normalization_error);
    println!("  {:<8} {:>14}", "species", "mass fraction");
    for s in &summary.species {
        if s.min == s.max {
            println!("  {:<8} {:>14.6e}", s.label, s.mean);
        } else {
            println!(
                "  {:<8} {:>14.6e}  [{:.6e}, {:.6e}]",
                s.label, s.mean, s.min, s.max
            );
        }
    }
}

/// Write every species field, one row per grid point, with a metadata header.
pub fn write_composition_csv(comp: &CompositionMap, path: &Path, job: &JobConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writeln!(file, "# Nucleo - Initial Composition")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# hydrogen_fraction: {}", job.composition.hydrogen_fraction)?;
    writeln!(file, "# metallicity: {}", job.composition.metallicity)?;
    writeln!(file, "# mixture_table: {}", job.composition.mixture_table.display())?;
    let grid = comp.grid();
    writeln!(file, "# grid: {}x{} ({} points)", grid.nr, grid.nth, grid.points())?;
    writeln!(file, "#")?;

    let labels: Vec<&str> = comp.labels().collect();
    writeln!(file, "ir,ith,{}", labels.join(","))?;

    let fields = labels
        .iter()
        .map(|label| comp.get(label))
        .collect::<Result<Vec<_>, _>>()?;

    for ir in 0..grid.nr {
        for ith in 0..grid.nth {
            let row = fields
                .iter()
                .map(|f| format!("{:.12e}", f.values()[[ir, ith]]))
                .collect::<Vec<_>>()
                .join(",");
            writeln!(file, "{},{},{}", ir, ith, row)?;
        }
    }

    println!("Composition written to: {}", path.display());
    Ok(())
}

/// Write the composition summary to a JSON file.
pub fn write_composition_json(summary: &CompositionSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    println!("Summary (JSON) written to: {}", path.display());
    Ok(())
}

/// List the entries of a mixture table, scaled by `metallicity` when given.
pub fn describe_mixture(path: &Path, metallicity: Option<f64>) -> Result<()> {
    let table = load_mixture(path)?;

    println!("Mixture table: {}", path.display());
    println!("  {} entries, total fraction of Z = {:.6}", table.len(), table.total_fraction());
    for entry in &table {
        match metallicity {
            Some(z) => println!(
                "  {:<6} {:>10.6}  -> {:.6e}   (line {})",
                entry.label,
                entry.fraction_of_z,
                z * entry.fraction_of_z,
                entry.line
            ),
            None => println!(
                "  {:<6} {:>10.6}   (line {})",
                entry.label, entry.fraction_of_z, entry.line
            ),
        }
    }
    if let Some(z) = metallicity {
        println!("  residual Ex = {:.6e}", z * (1.0 - table.total_fraction()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nucleo_core::GridShape;
    use std::path::PathBuf;

    use crate::config::{CompositionConfig, OutputConfig};

    fn job_with_table(table: PathBuf, grid: GridShape) -> JobConfig {
        JobConfig {
            composition: CompositionConfig {
                hydrogen_fraction: 0.7,
                metallicity: 0.02,
                mixture_table: table,
            },
            grid,
            output: OutputConfig::default(),
        }
    }

    #[test]
    fn test_run_build_and_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("metal-mix.cfg");
        std::fs::write(&table, "O 0.5\nC 0.3\n").unwrap();

        let job = job_with_table(table, GridShape::new(2, 3));
        let comp = run_build(&job).unwrap();
        assert_relative_eq!(comp.get("Ex").unwrap().mean(), 0.004, epsilon = 1e-14);

        let csv = dir.path().join("out").join("composition.csv");
        write_composition_csv(&comp, &csv, &job).unwrap();
        let text = std::fs::read_to_string(&csv).unwrap();
        let data: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(data[0], "ir,ith,C,Ex,H,He3,He4,O");
        assert_eq!(data.len(), 1 + 6);
        assert!(data[6].starts_with("1,2,"));
        assert!(text.contains("# grid: 2x3 (6 points)"));
    }

    #[test]
    fn test_run_build_missing_table() {
        let job = job_with_table(PathBuf::from("/nonexistent/mix.cfg"), GridShape::default());
        let err = run_build(&job).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/mix.cfg"));
    }

    #[test]
    fn test_run_build_rejects_nan_hydrogen() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("metal-mix.cfg");
        std::fs::write(&table, "O 0.5\n").unwrap();

        let mut job = job_with_table(table, GridShape::default());
        job.composition.hydrogen_fraction = f64::NAN;
        let err = run_build(&job).unwrap_err();
        assert!(err.to_string().contains("not finite"), "{}", err);
    }

    #[test]
    fn test_write_json_summary() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("metal-mix.cfg");
        std::fs::write(&table, "O 1.0\n").unwrap();

        let job = job_with_table(table, GridShape::default());
        let comp = run_build(&job).unwrap();
        let path = dir.path().join("summary.json");
        write_composition_json(&comp.summary().unwrap(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_relative_eq!(value["x"].as_f64().unwrap(), 0.7);
        assert_eq!(value["species"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_describe_mixture_reports_syntax_error() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("bad.cfg");
        std::fs::write(&table, "O 0.5\nC\n").unwrap();
        let err = describe_mixture(&table, Some(0.02)).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
