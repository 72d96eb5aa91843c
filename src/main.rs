//! seriesql CLI
//!
//! Command-line front end for the series query engine:
//! - Explain the SQL a request would run
//! - Check a configuration and the handler table
//! - Print a default configuration

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use seriesql::config::{generate_default_config, Config};
use seriesql::filter::OrderFilter;
use seriesql::resolution::{ResolutionFactory, ResolutionUnit};
use seriesql::series::{SeriesPlanner, SeriesQueryRequest, SeriesStatement};
use seriesql::Dialect;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "seriesql")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dialect-aware time-series aggregation over SQL tables")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the statement a request would execute
    Explain {
        /// JSON request file
        #[arg(short, long)]
        request: PathBuf,
        /// Override the request dialect (mysql, pgsql)
        #[arg(short, long)]
        dialect: Option<String>,
        /// Override the resolution (hourly, daily, weekly, monthly, yearly)
        #[arg(long)]
        resolution: Option<String>,
        /// Override the timezone
        #[arg(long)]
        timezone: Option<String>,
        /// Order a grouping dimension, as dimension[:asc|desc]
        #[arg(short, long)]
        order: Vec<String>,
    },

    /// Validate the configuration and the resolution handler table
    Check,

    /// Print a default configuration file
    Config {
        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };

    init_logging(&config);

    match cli.command {
        Commands::Explain {
            request,
            dialect,
            resolution,
            timezone,
            order,
        } => {
            let mut request = read_request(&request, &config)?;
            if let Some(d) = dialect {
                request.dialect =
                    Dialect::from_token(&d).with_context(|| format!("unknown dialect '{}'", d))?;
            }
            if let Some(r) = resolution {
                request.resolution = ResolutionUnit::from_token(&r)
                    .with_context(|| format!("unknown resolution '{}'", r))?;
            }
            if timezone.is_some() {
                request.timezone = timezone;
            }
            request
                .filters
                .extend(order.iter().map(|arg| OrderFilter::parse(arg).to_filter()));

            let planner = planner(&config)?;
            let statement = planner.plan(&request)?;
            print_statement(&statement, &cli.format)?;
        }

        Commands::Check => {
            let source = config.data_source()?;
            let factory = ResolutionFactory::new(config.engine.week_start()?);
            factory.self_check()?;

            println!("Configuration OK");
            println!("  table:          {}", source.table);
            println!("  date dimension: {}", source.date_dimension);
            println!("  dimensions:     {}", source.dimensions.len());
            println!("  week start:     {}", factory.week_start().weekday());
            println!(
                "  handlers:       {} dialects x {} units",
                Dialect::ALL.len(),
                ResolutionUnit::ALL.len()
            );
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    if path.exists() {
                        bail!("{} already exists", path.display());
                    }
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote default config to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("seriesql={}", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn planner(config: &Config) -> Result<SeriesPlanner> {
    let source = config.data_source()?;
    let factory = ResolutionFactory::new(config.engine.week_start()?);
    Ok(SeriesPlanner::new(source, Arc::new(factory)))
}

/// Read a JSON request, filling dialect and timezone from the engine defaults
fn read_request(path: &Path, config: &Config) -> Result<SeriesQueryRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading request {}", path.display()))?;
    let mut value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

    if let Some(object) = value.as_object_mut() {
        object
            .entry("dialect")
            .or_insert_with(|| serde_json::json!(config.engine.default_dialect));
        if let Some(tz) = config.engine.timezone() {
            object
                .entry("timezone")
                .or_insert_with(|| serde_json::json!(tz));
        }
    }

    serde_json::from_value(value).with_context(|| format!("invalid request in {}", path.display()))
}

fn print_statement(statement: &SeriesStatement, format: &str) -> Result<()> {
    match format {
        "json" => {
            let out = serde_json::json!({
                "dialect": statement.dialect,
                "unit": statement.unit,
                "sql": statement.sql,
                "params": statement.params,
                "grouping": statement.grouping,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        _ => {
            println!("-- {} / {}", statement.dialect, statement.unit);
            println!("{}", statement.sql);
            for (i, param) in statement.params.iter().enumerate() {
                println!("--   {}: {}", i + 1, param);
            }
        }
    }
    Ok(())
}
