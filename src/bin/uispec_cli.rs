//! UI-SPEC CLI
//!
//! Commands: preflight, assets, manifest
//! Exit codes: 0 = pass (warnings allowed), 1 = errors found, 2 = critical failure

use clap::{Parser, Subcommand};
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use uispec_preflight::{
    generate_manifest, scan_references, write_manifest, FsTree, Preflight, PreflightConfig,
    PreflightError, EXIT_FATAL,
};

#[derive(Parser)]
#[command(name = "uispec-cli")]
#[command(about = "UI-SPEC CLI - cross-document consistency checks for UI specs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root containing the spec directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Optional YAML config file, relative to the project root
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every spec document and write the preflight report
    Preflight {
        /// Also print info-level issues
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check asset files and element asset references
    Assets,

    /// Generate manifest.json inside the spec directory
    Manifest,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let tree = FsTree::new(&cli.root);

    let config = match cli.config.as_deref() {
        Some(path) => match PreflightConfig::load(&tree, path) {
            Ok(config) => config,
            Err(source) => {
                return fatal(&PreflightError::Config {
                    path: path.to_string(),
                    source,
                })
            }
        },
        None => PreflightConfig::default(),
    };

    let result = match cli.command {
        Commands::Preflight { verbose } => run_preflight(&tree, config, verbose),
        Commands::Assets => run_assets(&tree, config),
        Commands::Manifest => run_manifest(&tree, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => fatal(err.as_ref()),
    }
}

fn fatal(err: &dyn Error) -> ExitCode {
    eprintln!("CRITICAL: {}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
    ExitCode::from(EXIT_FATAL)
}

fn run_preflight(tree: &FsTree, config: PreflightConfig, verbose: bool) -> Result<u8, Box<dyn Error>> {
    let report_file = config.report_file.clone();
    let mut run = Preflight::new(tree, config).run()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "{} assets, {} routes, {} slices validated ({} planned)\n",
        run.stats.assets,
        run.stats.routes.routes,
        run.stats.routes.slices,
        run.stats.routes.planned.len()
    )?;
    run.report.render(&mut out, verbose)?;

    run.persist(&tree.root().join(&report_file))?;
    writeln!(out, "Full results saved to: {}", report_file)?;

    Ok(run.outcome().exit_code())
}

fn run_assets(tree: &FsTree, config: PreflightConfig) -> Result<u8, Box<dyn Error>> {
    let scan = scan_references(tree, &config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Total assets defined:   {}", scan.counts.assets_defined)?;
    writeln!(out, "Missing asset files:    {}", scan.counts.missing_files)?;
    writeln!(out, "Total asset references: {}", scan.counts.references_total)?;
    writeln!(out, "Invalid references:     {}\n", scan.counts.references_invalid)?;

    if scan.report.is_empty() {
        writeln!(out, "All asset validations passed")?;
        return Ok(0);
    }

    scan.report.render(&mut out, false)?;
    let path = tree.root().join(&config.references_report_file);
    scan.report.persist(&path)?;
    writeln!(out, "Full results saved to: {}", config.references_report_file)?;
    Ok(scan.report.outcome().exit_code())
}

fn run_manifest(tree: &FsTree, config: PreflightConfig) -> Result<u8, Box<dyn Error>> {
    let manifest = match generate_manifest(tree, &config, chrono::Utc::now()) {
        Ok(manifest) => manifest,
        Err(err) => {
            eprintln!("Error generating manifest: {}", err);
            return Ok(1);
        }
    };
    let path = tree.resolve(&config.spec_path(&config.manifest_file));
    write_manifest(&manifest, &path)?;

    let body = &manifest.body;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Manifest generated: {}", path.display())?;
    writeln!(out, "   Project: {}", body.project.name)?;
    writeln!(
        out,
        "   Assets: {} ({} SVG, {} PNG, {} Lottie)",
        body.assets.total, body.assets.by_type.svg, body.assets.by_type.png, body.assets.by_type.lottie
    )?;
    writeln!(out, "   Routes: {}/{} implemented", body.routes.implemented, body.routes.total)?;
    writeln!(out, "   Slices: {} total", body.slices.total)?;
    writeln!(out, "   Overlays: {} PNG references", body.overlays.total)?;
    writeln!(
        out,
        "   Code-gen ready: {}",
        if body.readiness.code_gen { "yes" } else { "not yet" }
    )?;
    writeln!(out, "   Content hash: {}", manifest.content_hash)?;
    Ok(0)
}
