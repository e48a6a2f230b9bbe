//! Adhoc CLI - run and inspect ad-hoc reports
//!
//! Usage:
//!   adhoc report <request.json>
//!   adhoc compile <request.json> [--dialect <dialect>]
//!   adhoc tables
//!   adhoc columns <table>
//!   adhoc relations <table> [--used <table>...]
//!   adhoc foreign-keys <a> <b>
//!   adhoc functions
//!
//! Output is JSON on stdout. Failures print an error payload
//! (`{kind, message, causes}`) and exit non-zero.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use adhoc::config::Settings;
use adhoc::error::{AdhocError, AdhocResult};
use adhoc::report::ReportRequest;
use adhoc::service::ReportService;
use adhoc::sql::Dialect;

#[derive(Parser)]
#[command(name = "adhoc")]
#[command(about = "Adhoc - foreign-key driven ad-hoc reports over SQLite")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to $ADHOC_CONFIG, ./adhoc.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database path, overriding the settings file
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile and run a report request
    Report {
        /// Path to the request JSON file
        file: PathBuf,
    },

    /// Compile a report request without running it
    Compile {
        /// Path to the request JSON file
        file: PathBuf,

        /// SQL dialect to render (defaults to the configured dialect)
        #[arg(short, long)]
        dialect: Option<DialectArg>,
    },

    /// List user tables
    Tables,

    /// List the columns of a table
    Columns { table: String },

    /// Show direct and two-hop relations of a table
    Relations {
        table: String,

        /// Tables already used by the report
        #[arg(short, long, num_args = 1..)]
        used: Vec<String>,
    },

    /// Show the foreign keys linking two tables
    ForeignKeys { source: String, target: String },

    /// List the scalar functions usable in attributes and filters
    Functions,
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Sqlite,
    Postgres,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Postgres => Dialect::Postgres,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(s) => s,
        Err(e) => return report_error(&e),
    };
    init_tracing(&settings);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(cli.command, &settings))
}

fn load_settings(cli: &Cli) -> AdhocResult<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };
    if let Some(database) = &cli.database {
        settings.database.path = database.clone();
    }
    settings.validate()?;
    Ok(settings)
}

/// Log to stderr; `RUST_LOG` wins over the configured filter.
fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands, settings: &Settings) -> ExitCode {
    let service = match ReportService::from_settings(settings) {
        Ok(s) => s,
        Err(e) => return report_error(&e),
    };

    match command {
        Commands::Report { file } => cmd_report(&service, file).await,
        Commands::Compile { file, dialect } => cmd_compile(&service, file, dialect).await,
        Commands::Tables => emit(service.list_tables().await),
        Commands::Columns { table } => emit(service.table_columns(&table).await),
        Commands::Relations { table, used } => {
            emit(service.transitive_relations(&table, &used).await)
        }
        Commands::ForeignKeys { source, target } => {
            emit(service.foreign_key_relations(&source, &target).await)
        }
        Commands::Functions => emit(Ok(service.available_functions())),
    }
}

async fn cmd_report(service: &ReportService, file: PathBuf) -> ExitCode {
    let request = match read_request(&file) {
        Ok(r) => r,
        Err(code) => return code,
    };
    emit(service.generate_report(&request).await)
}

async fn cmd_compile(
    service: &ReportService,
    file: PathBuf,
    dialect: Option<DialectArg>,
) -> ExitCode {
    let request = match read_request(&file) {
        Ok(r) => r,
        Err(code) => return code,
    };
    emit(service.compile_report(&request, dialect.map(Dialect::from)).await)
}

fn read_request(file: &Path) -> Result<ReportRequest, ExitCode> {
    let source = fs::read_to_string(file).map_err(|e| {
        eprintln!("Error reading {}: {}", file.display(), e);
        ExitCode::from(2)
    })?;

    serde_json::from_str(&source).map_err(|e| report_error(&AdhocError::from(e)))
}

fn emit<T: Serialize>(result: AdhocResult<T>) -> ExitCode {
    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => report_error(&e),
    }
}

fn report_error(err: &AdhocError) -> ExitCode {
    match serde_json::to_string_pretty(&err.payload()) {
        Ok(json) => println!("{}", json),
        Err(_) => eprintln!("Error: {}", err),
    }
    ExitCode::FAILURE
}
