//! Next.js to Vite Project Converter CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use next2vite::models::{ConversionOptions, TargetStack, TargetSyntax};
use next2vite::transformer::convert_routes;
use next2vite::{analyze_project, convert_project, extract_routes, packager, RuleEngine};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "next2vite")]
#[command(about = "Migrate Next.js (pages router) projects to Vite + React Router", long_about = None)]
#[command(version)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    ReactVite,
    ReactCra,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Next.js project
    Convert {
        /// Path to the project (directory or ZIP)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for the converted project
        #[arg(short, long)]
        output: PathBuf,

        /// JSON file with conversion options
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Target stack
        #[arg(long, value_enum)]
        target: Option<Target>,

        /// Generate JavaScript (.jsx) instead of TypeScript
        #[arg(long)]
        javascript: bool,

        /// Keep Next.js routing code untouched
        #[arg(long)]
        no_router: bool,

        /// Leave package.json alone
        #[arg(long)]
        no_deps: bool,

        /// Skip legacy component replacement
        #[arg(long)]
        no_components: bool,

        /// Skip deployment/CI templates
        #[arg(long)]
        no_deploy: bool,

        /// Remove whole-line comments from transformed files
        #[arg(long)]
        strip_comments: bool,

        /// Files transformed concurrently per batch
        #[arg(long)]
        batch_size: Option<usize>,

        /// Write a markdown conversion report next to the output
        #[arg(short, long)]
        report: bool,

        /// Also package the output directory as a ZIP
        #[arg(long)]
        zip: bool,
    },

    /// Analyze a project without converting
    Analyze {
        /// Path to the project
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the route table with React Router paths
    Routes {
        /// Path to the project
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn load_options(config: Option<&Path>) -> Result<ConversionOptions> {
    match config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content).with_context(|| format!("Invalid options in {}", path.display()))
        }
        None => Ok(ConversionOptions::default()),
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let outcome = match cli.command {
        Commands::Convert {
            input,
            output,
            config,
            target,
            javascript,
            no_router,
            no_deps,
            no_components,
            no_deploy,
            strip_comments,
            batch_size,
            report,
            zip,
        } => load_options(config.as_deref()).and_then(|mut options| {
            if let Some(target) = target {
                options.target = match target {
                    Target::ReactVite => TargetStack::ReactVite,
                    Target::ReactCra => TargetStack::ReactCra,
                };
            }
            if javascript {
                options.syntax = TargetSyntax::Javascript;
            }
            options.use_react_router &= !no_router;
            options.update_dependencies &= !no_deps;
            options.replace_components &= !no_components;
            options.generate_deploy_configs &= !no_deploy;
            options.preserve_comments &= !strip_comments;
            if let Some(batch_size) = batch_size {
                options.batch_size = batch_size;
            }
            convert(&input, &output, &options, report, zip)
        }),
        Commands::Analyze { input } => analyze(&input),
        Commands::Routes { input } => routes(&input),
    };

    if let Err(e) = outcome {
        eprintln!("{}", "❌ Conversion failed!".red().bold());
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

fn convert(input: &Path, output: &Path, options: &ConversionOptions, report: bool, zip: bool) -> Result<()> {
    println!("{}", "Next.js to Vite Converter".bold().blue());
    println!("{}", "=".repeat(50).blue());
    println!();

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .context("Invalid progress template")?,
    );
    let on_progress = |percent: u8, message: &str| {
        bar.set_position(percent as u64);
        bar.set_message(message.to_string());
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let result = runtime.block_on(convert_project(input, output, options, Some(&on_progress)))?;
    bar.finish_and_clear();

    if result.success {
        println!("{}", "✅ Conversion completed successfully!".green().bold());
    } else {
        println!("{}", "⚠️  Conversion finished with errors".yellow().bold());
    }
    println!();
    println!("📊 Summary:");
    println!("  - Files: {}", result.stats.total_files);
    println!(
        "  - Files modified: {} ({:.1}%)",
        result.stats.modified_files,
        result.stats.transformation_rate * 100.0
    );
    println!("  - Files added: {}", result.new_files.len());
    println!("  - Routes: {}", result.stats.route_changes);
    println!("  - Dependency changes: {}", result.stats.dependency_changes);
    println!("  - Output: {}", output.display());

    if report {
        let report_path = output.with_extension("md");
        let content = next2vite::report::generate_report(&result)?;
        std::fs::write(&report_path, content)
            .with_context(|| format!("Failed to write {}", report_path.display()))?;
        println!("  - Report: {}", report_path.display());
    }

    if zip {
        let zip_path = output.with_extension("zip");
        packager::create_zip_from_directory(output, &zip_path)?;
        println!("  - Archive: {}", zip_path.display());
    }

    if !result.errors.is_empty() {
        println!();
        println!("{}", "⛔ Errors:".red().bold());
        for error in &result.errors {
            println!("  - {}", error);
        }
    }

    if !result.warnings.is_empty() {
        println!();
        println!("{}", "⚠️  Warnings:".yellow().bold());
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    Ok(())
}

fn analyze(input: &Path) -> Result<()> {
    println!("{}", "Analyzing project...".bold());
    println!();

    let loaded = packager::load_project(input)?;
    let engine = RuleEngine::next_to_vite();
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let analyses = runtime.block_on(analyze_project(&loaded.project, &engine))?;

    println!("{}", "📊 Analysis Results".bold().blue());
    println!("{}", "=".repeat(50).blue());
    println!();
    println!("Files: {}", loaded.project.len());
    println!("Source files: {}", analyses.len());
    println!();

    let mut needs_work = 0;
    for analysis in &analyses {
        if analysis.rule_stats.applied_rules == 0 && analysis.usages.is_empty() {
            continue;
        }
        needs_work += 1;

        let component = analysis
            .component
            .as_ref()
            .map(|c| format!(" ({})", c.name))
            .unwrap_or_default();
        println!("{}{}", analysis.path.bold(), component.dimmed());
        println!(
            "  {} of {} rules match ({:.0}%)",
            analysis.rule_stats.applied_rules,
            analysis.rule_stats.total_rules,
            analysis.rule_stats.modification_rate * 100.0
        );
        for (component, usage) in &analysis.usages {
            println!("  {} {} × {}", "↳".blue(), component, usage.count);
        }
    }

    println!();
    if needs_work == 0 {
        println!("{}", "✅ Nothing to convert!".green());
    } else {
        println!("{}", format!("{} files need conversion", needs_work).yellow());
    }

    Ok(())
}

fn routes(input: &Path) -> Result<()> {
    let loaded = packager::load_project(input)?;
    let routes = extract_routes(&loaded.project.paths());

    if routes.is_empty() {
        println!("{}", "No pages/ directory found".yellow());
        return Ok(());
    }

    println!("{}", "Route Table".bold().blue());
    println!("{}", "=".repeat(50).blue());
    for target in convert_routes(&routes) {
        println!(
            "{:<30} {} {:<30} {}",
            target.original_path,
            "→".blue(),
            target.path.green(),
            target.file.dimmed()
        );
    }
    let api = routes.iter().filter(|r| r.path.starts_with("/api/")).count();
    if api > 0 {
        println!();
        println!("{}", format!("{} API routes need a server runtime", api).yellow());
    }

    Ok(())
}
