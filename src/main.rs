use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use std::path::{Path, PathBuf};

use sumo_builder::codegen;
use sumo_builder::export::{self, ExportError};
use sumo_builder::scenario::{self, DrivingSide, EntityStore, ValidationReport};

#[derive(Parser)]
#[command(name = "sumo_builder")]
#[command(about = "Build a SUMO scenario package from a scenario description")]
struct Cli {
    /// Scenario file (.toml or .json); the demo scenario is used when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Project name, also the name of the output directory
    #[arg(long, default_value = "sumo_project")]
    project: String,

    /// Directory the project directory is created in
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Override the scenario's driving side
    #[arg(long, value_enum)]
    driving_side: Option<DrivingSide>,

    /// Only validate and report findings
    #[arg(long)]
    check: bool,

    /// Print the network build command and exit
    #[arg(long)]
    print_command: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut store = load_store(cli.scenario.as_deref())?;
    if let Some(side) = cli.driving_side {
        store.settings.driving_side = side;
    }

    if cli.print_command {
        println!("{}", codegen::build_command(&store.settings));
        return Ok(());
    }

    if cli.check {
        let report = scenario::validate(&store.snapshot());
        print_report(&report);
        if report.has_errors() {
            bail!("scenario has {} validation errors", report.error_count());
        }
        println!("Scenario is valid ({} warnings)", report.warning_count());
        return Ok(());
    }

    run_export(&store, &cli.project, &cli.out)
}

/// Loads the scenario file, or the demo scenario when none is given
fn load_store(path: Option<&Path>) -> Result<EntityStore> {
    match path {
        Some(path) => scenario::load_scenario(path)
            .with_context(|| format!("Failed to load scenario {}", path.display())),
        None => {
            info!("No scenario given, using the demo scenario");
            EntityStore::create_demo_scenario().context("Failed to build demo scenario")
        }
    }
}

fn print_report(report: &ValidationReport) {
    for finding in &report.findings {
        eprintln!("{}", finding);
    }
}

fn run_export(store: &EntityStore, project: &str, out: &Path) -> Result<()> {
    let outcome = match export::export_project(store, project) {
        Ok(outcome) => outcome,
        Err(ExportError::ValidationFailed { report }) => {
            print_report(&report);
            bail!("Export refused: scenario has {} validation errors", report.error_count());
        }
        Err(e) => return Err(e).context("Export failed"),
    };

    let dir = out.join(project);
    outcome
        .package
        .write_to_dir(&dir)
        .context("Failed to write project package")?;

    println!("=== Export Summary ===");
    println!("Project: {}", project);
    println!("Directory: {}", dir.display());
    for name in outcome.package.file_names() {
        println!("  {}", name);
    }
    println!("Warnings: {}", outcome.report.warning_count());
    println!();
    println!("Build the network with:");
    println!("  {}", codegen::build_command(&store.settings));
    Ok(())
}
