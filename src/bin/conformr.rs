//! `conformr` command-line runner
//!
//! ```text
//! conformr run --reference reference --candidate parallel --precision complex64
//! conformr version get
//! conformr version set 1.2.3
//! ```

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use conformr::backend::{self, Backend, DfsParams};
use conformr::check::Tolerance;
use conformr::dtype::Precision;
use conformr::suite::{ConformanceConfig, ConformanceSuite, Operation};
use conformr::version::VersionFiles;

/// Top-level CLI argument parser
#[derive(Parser)]
#[command(
    name = "conformr",
    about = "Numerical conformance checks for complex linear-algebra backends",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the conformance suite for each requested precision
    Run(RunArgs),
    /// Inspect or synchronize the project version
    Version {
        #[command(subcommand)]
        action: VersionAction,
        /// Directory holding pyproject.toml, Cargo.toml and README.md
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Reference backend name
    #[arg(long, default_value = "reference")]
    reference: String,
    /// Candidate backend name
    #[arg(long, default_value = "parallel")]
    candidate: String,
    /// Precisions to check (repeatable or comma separated)
    #[arg(long, value_delimiter = ',', value_parser = Precision::parse,
          default_values = ["complex64", "complex128"])]
    precision: Vec<Precision>,
    /// Fixture seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Side of the square fixture matrices and length of the fixture vectors
    #[arg(long, default_value_t = 5)]
    size: usize,
    /// Side of the matrix fed to expand_d_fs
    #[arg(long, default_value_t = 32)]
    large_size: usize,
    /// Absolute tolerance; defaults to the precision's own
    #[arg(long)]
    tolerance: Option<f64>,
    /// Operations to check (comma separated); defaults to all
    #[arg(long, value_delimiter = ',')]
    ops: Vec<Operation>,
    /// Draws per backend for the Haar checks
    #[arg(long)]
    haar_draws: Option<usize>,
    /// Draws per backend for the random unitary check
    #[arg(long)]
    unitary_draws: Option<usize>,
    /// Local dimension for expand_d_fs / random_unitary_d_fs
    #[arg(long, default_value_t = 5)]
    depth: usize,
    /// Number of sites for expand_d_fs / random_unitary_d_fs
    #[arg(long, default_value_t = 2)]
    quantity: usize,
    /// Site the operator acts on
    #[arg(long, default_value_t = 0)]
    idx: usize,
    /// Worker threads for the parallel backend
    #[cfg(feature = "rayon")]
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum VersionAction {
    /// Print the current version after checking both manifests agree
    Get,
    /// Propagate a version to the manifests and README
    Set {
        /// Version in MAJOR.MINOR.PATCH form
        version: String,
    },
}

fn resolve_backend(name: &str, args: &RunArgs) -> conformr::Result<Box<dyn Backend>> {
    #[cfg(feature = "rayon")]
    if name == backend::ParallelBackend::NAME && args.threads.is_some() {
        let config = backend::ParallelismConfig::new(args.threads, None);
        return Ok(Box::new(backend::ParallelBackend::with_parallelism(config)?));
    }
    let _ = args;
    backend::backend_by_name(name)
}

fn config_for(args: &RunArgs, precision: Precision) -> ConformanceConfig {
    let mut config = ConformanceConfig::for_precision(precision);
    config.fixtures.seed = args.seed;
    config.fixtures.size = args.size;
    config.fixtures.large_size = args.large_size;
    config.dfs = DfsParams::new(args.depth, args.quantity, args.idx);
    if let Some(eps) = args.tolerance {
        config.tolerance = Tolerance::Absolute(eps);
    }
    if !args.ops.is_empty() {
        config = config.with_operations(args.ops.iter().copied());
    }
    let haar = args.haar_draws.unwrap_or(config.haar_draws);
    let unitary = args.unitary_draws.unwrap_or(config.unitary_draws);
    config.with_draws(haar, unitary)
}

/// Returns whether every class passed
fn run(args: &RunArgs) -> conformr::Result<bool> {
    let reference = resolve_backend(&args.reference, args)?;
    let candidate = resolve_backend(&args.candidate, args)?;

    let mut all_passed = true;
    for &precision in &args.precision {
        let suite = ConformanceSuite::new(
            config_for(args, precision),
            reference.as_ref(),
            candidate.as_ref(),
        );
        let report = suite.run()?;
        print!("{report}");
        all_passed &= report.all_passed();
    }
    Ok(all_passed)
}

fn version(action: VersionAction, dir: PathBuf) -> conformr::Result<()> {
    let files = VersionFiles::in_dir(dir);
    match action {
        VersionAction::Get => {
            let current = files.check_consistency()?;
            println!("Current version: {current}");
        }
        VersionAction::Set { version } => {
            let set = files.set_version(&version)?;
            println!("Version set to: {set}");
        }
    }
    Ok(())
}

fn main() {
    use tracing_subscriber::{EnvFilter, fmt};
    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => run(&args),
        Commands::Version { action, dir } => version(action, dir).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error [{}]: {e}", e.kind());
            process::exit(2);
        }
    }
}
