use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use llmkit::commands::config::{self, ConfigArgs};
use llmkit::commands::select_model::{self, SelectModelArgs};
use llmkit::commands::smoke_test::{self, SmokeTestArgs};

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  llmkit smoke-test\n  llmkit select-model --output ./config.json\n  llmkit config check --config ~/.config/llmkit/config.toml\n  llmkit completion bash > ~/.local/share/bash-completion/completions/llmkit";

#[derive(Debug, Parser)]
#[command(
    name = "llmkit",
    about = "Hosted LLM provider checks and local Ollama model selection",
    version = llmkit::VERSION,
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Send one sample prompt to Groq, Google and OpenRouter")]
    SmokeTest(SmokeTestArgs),
    #[command(about = "Pick an LLM and an embedding model from local Ollama models")]
    SelectModel(SelectModelArgs),
    #[command(about = "Manage the settings file")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "llmkit", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "llmkit", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "llmkit", &mut io::stdout()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::SmokeTest(args) => smoke_test::run(args).await,
        Commands::SelectModel(args) => select_model::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(1);
    }
}
