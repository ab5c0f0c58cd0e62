use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, warn};

use crate::commands::{CommonArgs, prepare};
use crate::rchain::ollama::OllamaClient;
use crate::selection::{CONFIG_FILE_NAME, ConsoleSelector, SelectionError, select_and_save};

#[derive(Debug, Args, Clone)]
pub struct SelectModelArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    /// Where to write the selection
    #[arg(long, value_name = "PATH", default_value = CONFIG_FILE_NAME)]
    pub output: PathBuf,
}

/// Runs the interactive selection. Every failure is printed and the
/// command still succeeds.
pub async fn run(args: SelectModelArgs) -> Result<(), String> {
    let settings = prepare(&args.common)?;
    let ollama = OllamaClient::from_settings(settings.ollama.host.as_deref());
    let color = io::stdout().is_terminal();

    println!("Fetching available Ollama models...");

    let mut selector = ConsoleSelector::stdio();
    let result = select_and_save(&ollama, &mut selector, &args.output).await;
    if let Err(err) = &result {
        if err.is_soft() {
            debug!(host = ollama.host(), reason = %err, "nothing to select");
        } else {
            warn!(host = ollama.host(), error = %err, "model selection failed");
        }
    }

    match result {
        Ok((_, rendered)) => {
            println!("\nConfiguration saved to {}:", args.output.display());
            println!("{rendered}");
        }
        Err(SelectionError::MissingModels { raw }) => {
            print_error("Error: 'models' key not found in response from Ollama.", color);
            println!("Full response: {raw}");
        }
        Err(SelectionError::NoModels) => {
            println!("No local Ollama models found.");
            println!("Please pull a model first, for example: ollama pull gemma:2b");
        }
        Err(err) => {
            print_error(&format!("An error occurred: {err}"), color);
            println!("Please ensure the Ollama service is running.");
        }
    }

    Ok(())
}

fn print_error(message: &str, color: bool) {
    if color {
        println!("{}", message.red());
    } else {
        println!("{message}");
    }
}
