// Command-line entry point for testable-rewrite.

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use testable_rewrite::application::{RewriteJob, RewriteUsecase};
use testable_rewrite::config::RewriteConfig;
use testable_rewrite::infrastructure::concurrency::init_thread_pool;
use testable_rewrite::infrastructure::{JsonExporter, ManifestShadowResolver, UnitLoader};
use testable_rewrite::ports::java_exporter::JavaSourceExporter;
use testable_rewrite::ports::UnitExporter;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Java,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input unit file (JSON syntax tree, can specify multiple)
    #[arg(short, long)]
    input: Vec<PathBuf>,

    /// Input unit folder(s), searched recursively
    #[arg(short = 'd', long)]
    folder: Vec<PathBuf>,

    /// Root holding compiled shadow-type descriptors (searched in order)
    #[arg(short, long = "shadow-path")]
    shadow_path: Vec<PathBuf>,

    /// Class under test, overriding the name derived from the test class
    #[arg(long)]
    class: Option<String>,

    /// Rewrite config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "java")]
    format: OutputFormat,

    /// Worker threads (defaults to half the cores)
    #[arg(long)]
    jobs: Option<usize>,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,
}

fn setup_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => RewriteConfig::load(path)?,
        None => RewriteConfig::default(),
    };

    let mut units = Vec::new();
    for input in &cli.input {
        units.push((input.display().to_string(), UnitLoader::load_file(input)?));
    }
    for folder in &cli.folder {
        units.extend(UnitLoader::load_dir(folder)?);
    }
    if units.is_empty() {
        bail!("Please provide at least one --input <file> or --folder <dir>");
    }
    if cli.class.is_some() && units.len() > 1 {
        bail!("--class applies to a single unit, got {}", units.len());
    }

    let mut jobs = Vec::with_capacity(units.len());
    for (source, unit) in units {
        match &cli.class {
            Some(class) => jobs.push(RewriteJob {
                package: unit.package.clone().unwrap_or_default(),
                class_under_test: class.clone(),
                source,
                unit,
            }),
            None => match RewriteJob::from_unit(&source, unit, &config) {
                Ok(job) => jobs.push(job),
                Err(e) => warn!("skipping {}: {:#}", source, e),
            },
        }
    }

    if cli.shadow_path.is_empty() {
        warn!("no --shadow-path given, stubborn field writes will not be rewritten");
    }
    let resolver = ManifestShadowResolver::new(
        cli.shadow_path.clone(),
        &config.testable_suffix,
        &config.stubborn_field_accessor,
    );
    let exporter: &dyn UnitExporter = match cli.format {
        OutputFormat::Java => &JavaSourceExporter,
        OutputFormat::Json => &JsonExporter,
    };

    init_thread_pool(cli.jobs)?;

    let usecase = RewriteUsecase { resolver: &resolver, exporter, config: &config };
    let written = usecase.run(&mut jobs, &cli.output)?;

    info!(
        units = written.len(),
        output = %cli.output.display(),
        "rewrite completed"
    );
    Ok(())
}
