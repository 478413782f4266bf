mod error;
mod trajectory;

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use mc_core::Parallelism;
use mc_problem::Registry;
use mc_rep::ProblemRep;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "mc-cli")]
#[command(about = "Muscollo CLI - optimal-control problem checking and evaluation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, compile and reconcile a problem file
    Validate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Print the reconciled problem
    Describe {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Write the description to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List registered goal and path-constraint types
    Types,
    /// Evaluate goals and path constraints on a trajectory
    Evaluate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Trajectory table (.sto or .csv) with state and control columns;
        /// zeros are used when omitted
        #[arg(short, long)]
        trajectory: Option<PathBuf>,
        /// Resample the trajectory table onto this many uniform points
        #[arg(long)]
        resample: Option<usize>,
        /// Number of time points of the zero trajectory
        #[arg(long, default_value_t = 11)]
        num_times: usize,
        /// Final time of the zero trajectory
        #[arg(long, default_value_t = 1.0)]
        final_time: f64,
        /// Parameter values, in declaration order
        #[arg(long, value_delimiter = ',')]
        parameters: Vec<f64>,
        /// Worker threads for per-point evaluation (0 = serial)
        #[arg(long)]
        threads: Option<usize>,
        /// Write path-constraint errors to a .sto or .csv file
        #[arg(long)]
        errors: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = Registry::with_builtin();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path, &registry),
        Commands::Describe {
            project_path,
            output,
        } => cmd_describe(&project_path, &registry, output.as_deref()),
        Commands::Types => {
            cmd_types(&registry);
            Ok(())
        }
        Commands::Evaluate {
            project_path,
            trajectory,
            resample,
            num_times,
            final_time,
            parameters,
            threads,
            errors,
        } => cmd_evaluate(
            &project_path,
            &registry,
            EvaluateOptions {
                trajectory: trajectory.as_deref(),
                resample,
                num_times,
                final_time,
                parameters: &parameters,
                threads,
                errors: errors.as_deref(),
            },
        ),
    }
}

fn load_rep(project_path: &Path, registry: &Registry) -> CliResult<ProblemRep> {
    let project = mc_project::load(project_path)?;
    let base_dir = project_path.parent().unwrap_or(Path::new("."));
    let problem = mc_project::compile(&project, registry, base_dir)?;
    let rep = ProblemRep::new(&problem)?;
    debug!(path = %project_path.display(), problem = %rep.name(), "problem reconciled");
    Ok(rep)
}

fn cmd_validate(project_path: &Path, registry: &Registry) -> CliResult<()> {
    println!("Validating project: {}", project_path.display());
    let rep = load_rep(project_path, registry)?;
    println!("✓ Problem '{}' is valid", rep.name());
    println!(
        "  {} states, {} controls, {} multipliers, {} path-constraint equations",
        rep.state_info_names().len(),
        rep.control_info_names().len(),
        rep.multiplier_info_names().len(),
        rep.num_path_constraint_equations()
    );
    Ok(())
}

fn cmd_describe(project_path: &Path, registry: &Registry, output: Option<&Path>) -> CliResult<()> {
    let rep = load_rep(project_path, registry)?;
    match output {
        Some(path) => {
            let mut file = std::fs::File::create(path)?;
            rep.print_description(&mut file)?;
            println!("✓ Wrote description to {}", path.display());
        }
        None => rep.print_description(&mut io::stdout().lock())?,
    }
    Ok(())
}

fn cmd_types(registry: &Registry) {
    println!("Goal types:");
    for (name, description) in registry.goal_types() {
        println!("  {:<20} {}", name, description);
    }
    println!("Path constraint types:");
    for (name, description) in registry.path_constraint_types() {
        println!("  {:<20} {}", name, description);
    }
}

struct EvaluateOptions<'a> {
    trajectory: Option<&'a Path>,
    resample: Option<usize>,
    num_times: usize,
    final_time: f64,
    parameters: &'a [f64],
    threads: Option<usize>,
    errors: Option<&'a Path>,
}

fn cmd_evaluate(project_path: &Path, registry: &Registry, opts: EvaluateOptions<'_>) -> CliResult<()> {
    let mut rep = load_rep(project_path, registry)?;
    if let Some(threads) = opts.threads {
        let parallelism = match threads {
            0 => Parallelism::Serial,
            n => Parallelism::Threads(n),
        };
        debug!(?parallelism, "evaluation parallelism overridden");
        rep = rep.with_parallelism(parallelism);
    }
    if !opts.parameters.is_empty() {
        rep.apply_parameters_to_model(opts.parameters)?;
    }

    let traj = match opts.trajectory {
        Some(path) => {
            let table = match path.extension().and_then(|e| e.to_str()) {
                Some("csv") => mc_table::read_csv(path)?,
                Some("sto" | "mot") => mc_table::read_sto(path)?,
                _ => {
                    return Err(CliError::InvalidArg {
                        what: format!("unsupported trajectory file {}", path.display()),
                    });
                }
            };
            let table = match opts.resample {
                Some(n) => trajectory::resample(&table, n)?,
                None => table,
            };
            trajectory::from_table(&rep, &table)?
        }
        None => trajectory::zeros(&rep, opts.num_times, opts.final_time)?,
    };

    println!(
        "Evaluating problem: {} ({} time points)",
        rep.name(),
        traj.num_times()
    );
    println!("Goals:");
    for goal in rep.evaluate_goals(&traj)? {
        let values: Vec<String> = goal.values.iter().map(|v| format!("{:.6e}", v)).collect();
        println!("  {} [{}]: {}", goal.name, goal.mode.as_str(), values.join(", "));
    }
    println!("Total cost: {:.6e}", rep.evaluate_cost(&traj)?);
    println!(
        "Max path-constraint violation: {:.6e}",
        rep.path_constraint_violation(&traj)?
    );

    if let Some(path) = opts.errors {
        let errors = rep.evaluate_path_constraints(&traj)?;
        let table = trajectory::errors_table(&rep, &traj, errors)?;
        info!(path = %path.display(), columns = table.num_columns(), "writing path-constraint errors");
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => mc_table::write_csv(path, &table)?,
            _ => mc_table::write_sto(path, &table)?,
        }
        println!("✓ Wrote path-constraint errors to {}", path.display());
    }
    Ok(())
}
