use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config;

#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand, Clone)]
enum ConfigSubcommand {
    /// Parse and validate the settings file
    Check {
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

pub fn run(args: ConfigArgs) -> Result<(), String> {
    match args.command {
        ConfigSubcommand::Check { config: explicit } => {
            dotenv::dotenv().ok();
            let path =
                config::validate_config(explicit.as_deref()).map_err(|err| err.to_string())?;
            println!("config OK: {}", path.display());
            Ok(())
        }
    }
}
