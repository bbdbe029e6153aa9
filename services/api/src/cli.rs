use crate::report::{run_evaluate, run_questions, EvaluateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use skin_survey::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Skin Survey Service",
    about = "Score the Baumann skin-type survey and serve it over HTTP",
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
    /// Print the primary questions and tie-breakers grouped by axis
    Questions,
    /// Score a saved set of answers and print the per-axis breakdown
    Evaluate(EvaluateArgs),
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
        Command::Questions => {
            run_questions();
            Ok(())
        }
        Command::Evaluate(args) => run_evaluate(args),
    }
}
