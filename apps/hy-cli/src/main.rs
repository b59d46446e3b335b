use clap::{Parser, Subcommand};
use hy_app::store::plan;
use hy_app::{
    AcceptAllResolver, AppError, AppResult, ArtifactStore, BatchSummary, FsMetFileResolver,
    MetFileResolver, load_defaults, load_job_def, translate, translate_batch,
};
use hy_compose::PhysicsDefaults;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hy-cli")]
#[command(about = "HYSPLIT job translator - validate jobs and compose model input files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a job description and list every problem found
    Validate {
        /// Path to the job file (.json, .yaml or .yml)
        job_path: PathBuf,
    },
    /// Compose CONTROL, SETUP.CFG and EMITIMES for one job
    Compose {
        /// Path to the job file (.json, .yaml or .yml)
        job_path: PathBuf,
        #[command(flatten)]
        options: ComposeOptions,
        /// Print the artifacts instead of writing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Compose several jobs in parallel
    Batch {
        /// Job files
        #[arg(required = true)]
        job_paths: Vec<PathBuf>,
        #[command(flatten)]
        options: ComposeOptions,
    },
    /// Print the built-in model defaults as YAML
    Defaults,
}

#[derive(clap::Args)]
struct ComposeOptions {
    /// Directory the job's output directory is resolved against
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    /// Model defaults file (YAML or JSON)
    #[arg(short, long)]
    defaults: Option<PathBuf>,
    /// Require every met file to exist, relative to this directory
    #[arg(long)]
    met_root: Option<PathBuf>,
}

impl ComposeOptions {
    fn resolver(&self) -> Box<dyn MetFileResolver> {
        match &self.met_root {
            Some(root) => Box::new(FsMetFileResolver::with_base(root)),
            None => Box::new(AcceptAllResolver),
        }
    }

    fn defaults(&self) -> AppResult<PhysicsDefaults> {
        load_defaults(self.defaults.as_deref())
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { job_path } => cmd_validate(&job_path),
        Commands::Compose {
            job_path,
            options,
            dry_run,
        } => cmd_compose(&job_path, &options, dry_run),
        Commands::Batch { job_paths, options } => cmd_batch(&job_paths, &options),
        Commands::Defaults => cmd_defaults(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn report_error(err: &AppError) {
    match err.report() {
        Some(report) => {
            eprintln!("✗ Job rejected ({} problem(s)):", report.len());
            for e in report.errors() {
                eprintln!("  - {}", e);
            }
        }
        None => eprintln!("✗ {}", err),
    }
}

fn cmd_validate(job_path: &Path) -> AppResult<()> {
    println!("Validating job: {}", job_path.display());
    let def = load_job_def(job_path)?;
    let job = hy_job::validate_job(&def)?;
    println!("✓ Job is valid");
    println!("  Mode: {}", job.mode());
    println!("  Points: {}", job.points().len());
    println!("  Met files: {}", job.met_files().len());
    if let Some((pollutants, grids)) = job.variant().concentration() {
        println!("  Pollutants: {}", pollutants.len());
        println!("  Grids: {}", grids.len());
    }
    Ok(())
}

fn cmd_compose(job_path: &Path, options: &ComposeOptions, dry_run: bool) -> AppResult<()> {
    let def = load_job_def(job_path)?;
    let defaults = options.defaults()?;
    let translation = translate(&def, options.resolver().as_ref(), &defaults)?;

    if dry_run {
        for artifact in plan(&translation) {
            println!("==> {} <==", artifact.path.display());
            print!("{}", artifact.content);
        }
        return Ok(());
    }

    let store = ArtifactStore::for_translation(&options.out_dir, &translation)?;
    let manifest = store.write(&translation)?;
    println!(
        "✓ {} artifacts written to {}",
        manifest.artifacts.len(),
        store.root_dir().display()
    );
    for entry in &manifest.artifacts {
        println!("  {} ({} bytes)", entry.path.display(), entry.bytes);
    }
    if let Some(plot) = &translation.plot {
        println!(
            "  Plot: {} at {} m AGL",
            plot.config.pollutant_id, plot.config.plot_level_m_agl
        );
    }
    Ok(())
}

fn cmd_batch(job_paths: &[PathBuf], options: &ComposeOptions) -> AppResult<()> {
    tracing::debug!(
        jobs = job_paths.len(),
        out_dir = %options.out_dir.display(),
        "batch requested"
    );
    let defaults = options.defaults()?;
    let resolver = options.resolver();
    let outcomes = translate_batch(job_paths, resolver.as_ref(), &defaults);

    for outcome in &outcomes {
        match &outcome.result {
            Ok(translation) => {
                let store = ArtifactStore::for_translation(&options.out_dir, translation)?;
                store.write(translation)?;
                println!("✓ {}", outcome.source.display());
            }
            Err(err) => {
                println!("✗ {}", outcome.source.display());
                report_error(err);
            }
        }
    }

    let summary = BatchSummary::of(&outcomes);
    println!(
        "Translated: {}, rejected: {}, failed: {}",
        summary.translated, summary.rejected, summary.failed
    );
    if summary.translated == outcomes.len() {
        Ok(())
    } else {
        Err(AppError::BatchIncomplete {
            failed: outcomes.len() - summary.translated,
            total: outcomes.len(),
        })
    }
}

fn cmd_defaults() -> AppResult<()> {
    let yaml = serde_yaml::to_string(&PhysicsDefaults::default())
        .map_err(|e| AppError::Compose(format!("Failed to serialize defaults: {}", e)))?;
    print!("{}", yaml);
    Ok(())
}
