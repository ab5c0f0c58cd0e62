use std::process;

use clap::Parser;
use llmkit::commands::select_model::{self, SelectModelArgs};

#[derive(Debug, Parser)]
#[command(
    name = "llm-select",
    about = "Pick an LLM and an embedding model from local Ollama models",
    version = llmkit::VERSION
)]
struct Cli {
    #[command(flatten)]
    select: SelectModelArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = select_model::run(cli.select).await {
        eprintln!("{err}");
        process::exit(1);
    }
}
