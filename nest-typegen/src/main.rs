//! # nest-typegen
//!
//! CLI for generating structural TypeScript declarations from the NEST
//! client's type universe.
//!
//! ## Usage
//!
//! ```bash
//! # Generate using nest-typegen.toml (or defaults)
//! nest-typegen
//!
//! # Override the source root and output file
//! nest-typegen generate --root ../../src/Nest --output ./typedefinitions.ts
//!
//! # Dry run to preview the declaration file
//! nest-typegen generate --dry-run
//!
//! # Initialize configuration
//! nest-typegen init
//!
//! # Check that an existing declaration file is up-to-date
//! nest-typegen validate --path ./typedefinitions.ts
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use nest_typegen::{
    config::{CliArgs, Config, ConfigManager, CONFIG_FILENAME},
    error::GenError,
    writer::{FileWriter, WriteResult},
    GeneratedOutput,
};

#[derive(Parser)]
#[command(name = "nest-typegen")]
#[command(author, version, about = "Generate TypeScript declarations for the NEST client types", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the declaration file (default)
    Generate {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Root directory of the client sources
        #[arg(long)]
        root: Option<PathBuf>,

        /// Type registry file
        #[arg(long)]
        registry: Option<PathBuf>,

        /// Output declaration file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preview the output without writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Initialize a new nest-typegen configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = CONFIG_FILENAME)]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Validate that a generated declaration file is up-to-date
    Validate {
        /// Path to the generated declaration file
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nest_typegen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            match e {
                GenError::Validation(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: Cli) -> Result<(), GenError> {
    let command = cli.command.unwrap_or(Commands::Generate {
        config: None,
        root: None,
        registry: None,
        output: None,
        dry_run: false,
    });

    match command {
        Commands::Generate {
            config,
            root,
            registry,
            output,
            dry_run,
        } => {
            let args = CliArgs {
                root,
                registry,
                output,
            };
            cmd_generate(config, &args, dry_run)
        }

        Commands::Init { output, force } => cmd_init(output, force),

        Commands::Validate { path, config } => cmd_validate(path, config),
    }
}

/// Load configuration and apply CLI overrides.
fn load_config(config_path: Option<PathBuf>, args: &CliArgs) -> Result<Config, GenError> {
    let config = ConfigManager::load(config_path.as_deref())?;
    Ok(ConfigManager::merge_cli_args(config, args))
}

/// Generate command implementation.
fn cmd_generate(
    config_path: Option<PathBuf>,
    args: &CliArgs,
    dry_run: bool,
) -> Result<(), GenError> {
    let config = load_config(config_path, args)?;

    println!("{} {}", "Scanning".cyan(), config.source.root.display());

    let output = nest_typegen::generate(&config)?;
    print_report(&output);

    let writer = FileWriter::new(dry_run);

    match writer.write(&config.output.file, &output.content)? {
        WriteResult::Written { path, bytes } => {
            println!(
                "{} Written {} bytes to {}",
                "✓".green(),
                bytes,
                path.display()
            );
        }
        WriteResult::Unchanged { path } => {
            println!("{} {} is already up-to-date", "✓".green(), path.display());
        }
        WriteResult::DryRun { content, path } => {
            println!(
                "{} Would write to {}:",
                "[dry-run]".yellow(),
                path.display()
            );
            println!("{}", "─".repeat(60).dimmed());
            println!("{}", content);
            println!("{}", "─".repeat(60).dimmed());
        }
    }

    Ok(())
}

fn print_report(output: &GeneratedOutput) {
    let report = &output.report;
    println!(
        "  Generated {} declaration(s) with {} member(s)",
        report.declarations.to_string().green(),
        report.members.to_string().green()
    );
    if report.referenced > 0 {
        println!(
            "  {} referenced type(s) declared",
            report.referenced.to_string().green()
        );
    }
    if report.requests_with_parameters > 0 {
        println!(
            "  {} request(s) have low level parameters",
            report.requests_with_parameters.to_string().green()
        );
    }
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), GenError> {
    if output.exists() && !force {
        println!("  Use --force to overwrite");
        return Err(GenError::Validation(format!(
            "Configuration file already exists: {}",
            output.display()
        )));
    }

    std::fs::write(&output, ConfigManager::default_config_content())?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

/// Validate command implementation.
fn cmd_validate(path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<(), GenError> {
    let config = load_config(config_path, &CliArgs::default())?;
    let path = path.unwrap_or_else(|| config.output.file.clone());

    println!("{} {}", "Validating".cyan(), path.display());

    match nest_typegen::validate_artifact(&config, &path) {
        Ok(()) => {
            println!("{} Declarations are up-to-date", "✓".green());
            Ok(())
        }
        Err(e @ GenError::Validation(_)) => {
            println!("{} Declarations are out of date", "✗".red());
            println!("  Run 'nest-typegen generate' to update");
            Err(e)
        }
        Err(e) => Err(e),
    }
}
