use std::process;

use clap::Parser;
use llmkit::commands::smoke_test::{self, SmokeTestArgs};

#[derive(Debug, Parser)]
#[command(
    name = "llm-smoke",
    about = "Send one sample prompt to Groq, Google and OpenRouter",
    version = llmkit::VERSION
)]
struct Cli {
    #[command(flatten)]
    smoke: SmokeTestArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = smoke_test::run(cli.smoke).await {
        eprintln!("{err}");
        process::exit(1);
    }
}
