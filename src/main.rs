use std::process::ExitCode;

use clap::{Parser, Subcommand};

use std::path::PathBuf;

use rideops::commands::{
    cmd_config_get, cmd_config_set, cmd_config_show, cmd_export, cmd_run, cmd_status,
};

#[derive(Parser)]
#[command(name = "rideops")]
#[command(about = "Terminal admin console for a ride-dispatch operation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the live dashboard session
    Run,

    /// Fetch one dashboard snapshot and print it
    Status,

    /// Download a CSV export
    Export {
        /// What to export: drivers or earnings
        target: String,

        /// Output file (default: <target>-export.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the full configuration
    Show,

    /// Print one configuration value
    Get {
        /// Config key (e.g. api_base_url)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Config key (e.g. api_base_url)
        key: String,

        /// New value
        value: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => cmd_run().await,
        Commands::Status => cmd_status().await,
        Commands::Export { target, output } => cmd_export(&target, output).await,
        Commands::Config { command } => match command {
            ConfigCommands::Show => cmd_config_show(),
            ConfigCommands::Get { key } => cmd_config_get(&key),
            ConfigCommands::Set { key, value } => cmd_config_set(&key, &value),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
