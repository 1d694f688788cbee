//! Nucleo command-line interface.
//!
//! Build initial stellar compositions from TOML job files:
//! ```sh
//! nucleo-cli build job.toml
//! nucleo-cli validate job.toml
//! nucleo-cli mixture metal-mix.cfg --metallicity 0.02
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nucleo-cli")]
#[command(about = "Nucleo: initial chemical composition for stellar models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the initial composition from a TOML job file.
    Build {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a job file and its mixture table without writing output.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// List the entries of a mixture table.
    Mixture {
        /// Path to the mixture-table file.
        table: PathBuf,
        /// Scale entries by this metallicity.
        #[arg(short = 'z', long)]
        metallicity: Option<f64>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { config, output } => {
            println!("Nucleo Initial Composition");
            println!("==========================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let comp = runner::run_build(&job)?;
            let summary = comp.summary()?;
            runner::print_summary(&summary);

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_csv {
                let csv_path = out_dir.join("composition.csv");
                runner::write_composition_csv(&comp, &csv_path, &job)?;
            }

            if job.output.save_json {
                let json_path = out_dir.join("composition.json");
                runner::write_composition_json(&summary, &json_path)?;
            }

            println!("Composition complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let comp = runner::run_build(&job)?;
            println!(
                "Configuration is valid: {} ({} species, max |sum - 1| = {:.2e})",
                config.display(),
                comp.len(),
                comp.normalization_error()
            );
            Ok(())
        }
        Commands::Mixture { table, metallicity } => runner::describe_mixture(&table, metallicity),
    }
}
