//! TOML configuration deserialisation for composition jobs.
//!
//! ```toml
//! [composition]
//! hydrogen_fraction = 0.70
//! metallicity = 0.02
//! mixture_table = "metal-mix.cfg"
//!
//! [grid]
//! nr = 64
//! nth = 8
//!
//! [output]
//! directory = "./output"
//! save_json = true
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use nucleo_core::{CompositionParams, GridShape};
use nucleo_mixture::DEFAULT_MIXTURE_FILE;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub composition: CompositionConfig,
    #[serde(default)]
    pub grid: GridShape,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Bulk composition parameters from TOML.
#[derive(Debug, Deserialize)]
pub struct CompositionConfig {
    /// Hydrogen mass fraction X.
    pub hydrogen_fraction: f64,
    /// Metallicity Z.
    pub metallicity: f64,
    /// Mixture-table file. Relative paths are taken from the job file's
    /// directory. Default: "metal-mix.cfg".
    #[serde(default = "default_mixture_table")]
    pub mixture_table: PathBuf,
}

fn default_mixture_table() -> PathBuf {
    PathBuf::from(DEFAULT_MIXTURE_FILE)
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save the per-point fields as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_csv: bool,
    /// Whether to also save a JSON summary (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_csv: true,
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

impl JobConfig {
    /// Builder inputs for this job.
    pub fn composition_params(&self) -> CompositionParams {
        CompositionParams {
            hydrogen_fraction: self.composition.hydrogen_fraction,
            metallicity: self.composition.metallicity,
            mixture_table: self.composition.mixture_table.clone(),
            grid: self.grid,
        }
    }
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file {}", path.display()))?;
    let mut config: JobConfig = toml::from_str(&content)
        .with_context(|| format!("Invalid job file {}", path.display()))?;

    if config.grid.points() == 0 {
        anyhow::bail!(
            "Invalid job file {}: grid {}x{} has no points (nr and nth must be at least 1)",
            path.display(),
            config.grid.nr,
            config.grid.nth
        );
    }

    if config.composition.mixture_table.is_relative() {
        if let Some(dir) = path.parent() {
            config.composition.mixture_table = dir.join(&config.composition.mixture_table);
        }
    }
    log::debug!(
        "Job {}: mixture table {}",
        path.display(),
        config.composition.mixture_table.display()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: JobConfig = toml::from_str(
            "[composition]\nhydrogen_fraction = 0.7\nmetallicity = 0.02\n",
        )
        .unwrap();
        assert_eq!(config.composition.mixture_table, PathBuf::from("metal-mix.cfg"));
        assert_eq!(config.grid, GridShape::new(1, 1));
        assert_eq!(config.output.directory, "./output");
        assert!(config.output.save_csv);
        assert!(!config.output.save_json);
    }

    #[test]
    fn test_full_config() {
        let config: JobConfig = toml::from_str(
            r#"
            [composition]
            hydrogen_fraction = 0.71
            metallicity = 0.014
            mixture_table = "tables/agss09.cfg"

            [grid]
            nr = 64
            nth = 8

            [output]
            directory = "runs/solar"
            save_csv = false
            save_json = true
            "#,
        )
        .unwrap();
        let params = config.composition_params();
        assert_eq!(params.hydrogen_fraction, 0.71);
        assert_eq!(params.metallicity, 0.014);
        assert_eq!(params.grid, GridShape::new(64, 8));
        assert_eq!(params.mixture_table, PathBuf::from("tables/agss09.cfg"));
        assert!(!config.output.save_csv);
        assert!(config.output.save_json);
    }

    #[test]
    fn test_missing_metallicity_rejected() {
        let result: Result<JobConfig, _> =
            toml::from_str("[composition]\nhydrogen_fraction = 0.7\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_relative_table_resolved_against_job_dir() {
        let dir = tempfile::tempdir().unwrap();
        let job_path = dir.path().join("job.toml");
        let mut file = std::fs::File::create(&job_path).unwrap();
        writeln!(file, "[composition]").unwrap();
        writeln!(file, "hydrogen_fraction = 0.7").unwrap();
        writeln!(file, "metallicity = 0.02").unwrap();
        writeln!(file, "mixture_table = \"mix.cfg\"").unwrap();
        drop(file);

        let config = load_config(&job_path).unwrap();
        assert_eq!(config.composition.mixture_table, dir.path().join("mix.cfg"));
    }

    #[test]
    fn test_empty_grid_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let job_path = dir.path().join("job.toml");
        std::fs::write(
            &job_path,
            "[composition]\nhydrogen_fraction = 0.7\nmetallicity = 0.02\n\n[grid]\nnr = 0\nnth = 4\n",
        )
        .unwrap();
        let err = load_config(&job_path).unwrap_err();
        assert!(err.to_string().contains("0x4"), "{}", err);
    }

    #[test]
    fn test_absolute_table_kept() {
        let dir = tempfile::tempdir().unwrap();
        let job_path = dir.path().join("job.toml");
        std::fs::write(
            &job_path,
            "[composition]\nhydrogen_fraction = 0.7\nmetallicity = 0.02\nmixture_table = \"/opt/mix.cfg\"\n",
        )
        .unwrap();
        let config = load_config(&job_path).unwrap();
        assert_eq!(config.composition.mixture_table, PathBuf::from("/opt/mix.cfg"));
    }
}
