pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "voz")]
#[command(about = "Voz Animal CLI - database and token maintenance for the adoption API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply the database schema")]
    Migrate,

    #[command(about = "Set the passwords of the demo accounts, creating them if missing")]
    InitPasswords,

    #[command(about = "Issue a bearer token for manual testing")]
    Token(commands::token::TokenArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Migrate => commands::db::migrate(&config, output_format).await,
        Commands::InitPasswords => commands::db::init_passwords(&config, output_format).await,
        Commands::Token(args) => commands::token::handle(&config, args, output_format),
    }
}
