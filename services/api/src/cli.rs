use crate::commands::{run_export, run_import, run_match, ExportArgs, ImportArgs, MatchArgs};
use crate::server;
use admission_engine::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Admission API",
    about = "Serve, query and maintain historical admission statistics",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// List programmes within reach of a grade average
    Match(MatchArgs),
    /// Reconcile a CSV file into a snapshot and print the report
    Import(ImportArgs),
    /// Write a snapshot in the export format
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Match(args) => run_match(args),
        Command::Import(args) => run_import(args),
        Command::Export(args) => run_export(args),
    }
}
