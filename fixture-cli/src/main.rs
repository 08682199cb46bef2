use clap::Parser;

mod commands;
mod error;
mod progress;

use crate::commands::Commands;
use crate::error::AppError;

#[derive(Parser, Debug)]
#[clap(name = "fixture-cli")]
#[clap(
    about = "Generate a deterministic fixture file and stream it in chunks",
    long_about = None
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = Cli::parse();
    if let Err(e) = run(args.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Generate(generate) => generate.run(),
        Commands::Stream(stream) => stream.run().await,
        Commands::Verify(verify) => verify.run(),
    }
}
