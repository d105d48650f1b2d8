use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use pokedex_catalog::app::{App, CatalogOptions, ProgressSinkKind};
use pokedex_catalog::cache::RecordCache;
use pokedex_catalog::catalog::CatalogFilter;
use pokedex_catalog::config::{Config, ConfigLoader};
use pokedex_catalog::error::CatalogError;
use pokedex_catalog::fetcher::HttpFetcher;
use pokedex_catalog::loader::Loader;
use pokedex_catalog::output::{JsonOutput, LogProgress, OutputMode, TextOutput};

#[derive(Parser)]
#[command(name = "pokedex")]
#[command(about = "Browse PokeAPI records with caching, retries and evolution chains")]
#[command(version)]
struct Cli {
    /// Path to a JSON config file (default: ./pokedex.json, then the user config dir)
    #[arg(long, global = true)]
    config: Option<String>,

    #[arg(long, global = true)]
    base_url: Option<String>,

    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show one record by name or number")]
    Show(IdArgs),
    #[command(about = "Load several records concurrently")]
    Batch(BatchArgs),
    #[command(about = "Resolve the evolution chain of a record")]
    Evolution(IdArgs),
    #[command(about = "Load the catalog and filter it")]
    Catalog(CatalogArgs),
}

#[derive(Args)]
struct IdArgs {
    identifier: String,
}

#[derive(Args)]
struct BatchArgs {
    #[arg(required = true)]
    identifiers: Vec<String>,
}

#[derive(Args)]
struct CatalogArgs {
    #[arg(long = "type")]
    type_name: Option<String>,

    #[arg(long)]
    ability: Option<String>,

    #[arg(long)]
    name: Option<String>,

    /// Number of listing entries to load (default: catalog_limit from config)
    #[arg(long)]
    limit: Option<usize>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<CatalogError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &CatalogError) -> u8 {
    match error.root_cause() {
        CatalogError::NotFound(_) | CatalogError::InvalidIdentifier(_) => 2,
        CatalogError::Timeout { .. }
        | CatalogError::Transport(_)
        | CatalogError::RequestFailed { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    // Overrides go through the same checks as a config file.
    let config =
        apply_overrides(ConfigLoader::resolve(cli.config.as_deref())?, &cli).validate()?;
    let fetcher = HttpFetcher::new(config.request_timeout())?;
    let loader = Loader::new(fetcher, Arc::new(RecordCache::new()), config);
    let app = App::new(loader);

    match cli.command {
        Commands::Show(args) => run_show(&app, &args.identifier, output_mode),
        Commands::Batch(args) => run_batch(&app, &args.identifiers, output_mode),
        Commands::Evolution(args) => run_evolution(&app, &args.identifier, output_mode),
        Commands::Catalog(args) => run_catalog(&app, args, output_mode),
    }
}

fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.request_timeout_ms = timeout_ms;
    }
    if let Some(max_retries) = cli.max_retries {
        config.max_retries = max_retries;
    }
    config
}

fn run_show(app: &App<HttpFetcher>, identifier: &str, output_mode: OutputMode) -> miette::Result<()> {
    match output_mode {
        OutputMode::Json => {
            let result = app.show(identifier, &JsonOutput)?;
            JsonOutput::print_show(&result).into_diagnostic()
        }
        OutputMode::Text => {
            let result = app.show(identifier, &LogProgress::new(ProgressSinkKind::Show))?;
            TextOutput::print_show(&result).into_diagnostic()
        }
    }
}

fn run_batch(
    app: &App<HttpFetcher>,
    identifiers: &[String],
    output_mode: OutputMode,
) -> miette::Result<()> {
    match output_mode {
        OutputMode::Json => {
            let result = app.batch(identifiers, &JsonOutput)?;
            JsonOutput::print_batch(&result).into_diagnostic()
        }
        OutputMode::Text => {
            let result = app.batch(identifiers, &LogProgress::new(ProgressSinkKind::Batch))?;
            TextOutput::print_batch(&result).into_diagnostic()
        }
    }
}

fn run_evolution(
    app: &App<HttpFetcher>,
    identifier: &str,
    output_mode: OutputMode,
) -> miette::Result<()> {
    match output_mode {
        OutputMode::Json => {
            let result = app.evolution(identifier, &JsonOutput)?;
            JsonOutput::print_evolution(&result).into_diagnostic()
        }
        OutputMode::Text => {
            let result =
                app.evolution(identifier, &LogProgress::new(ProgressSinkKind::Evolution))?;
            TextOutput::print_evolution(&result).into_diagnostic()
        }
    }
}

fn run_catalog(
    app: &App<HttpFetcher>,
    args: CatalogArgs,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let options = CatalogOptions {
        limit: args.limit,
        filter: CatalogFilter {
            type_name: args.type_name,
            ability: args.ability,
            name_query: args.name,
        },
    };
    match output_mode {
        OutputMode::Json => {
            let result = app.catalog(options, &JsonOutput)?;
            JsonOutput::print_catalog(&result).into_diagnostic()
        }
        OutputMode::Text => {
            let result = app.catalog(options, &LogProgress::new(ProgressSinkKind::Catalog))?;
            TextOutput::print_catalog(&result).into_diagnostic()
        }
    }
}
