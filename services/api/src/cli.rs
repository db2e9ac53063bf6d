use crate::demo::{run_demo, run_sweep, DemoArgs, SweepArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use vaxtrack::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "VaxTrack",
    about = "Run the child vaccination scheduling service from the command line",
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
    /// Run the no-show reconciliation sweep once and report the outcome
    Sweep(SweepArgs),
    /// Run an end-to-end CLI demo covering scheduling, booking, and payment
    Demo(DemoArgs),
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
        Command::Sweep(args) => run_sweep(args),
        Command::Demo(args) => run_demo(args),
    }
}
