use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod console;
mod session;

use commands::{
    CategoryCommand, ConfigCommand, ItemCommand, MenuCommand, Reported, SearchCommand,
    StatusCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "chef")]
#[command(version)]
#[command(about = "Manage a chef's menu on the marketplace", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// View the menu
    Menu(MenuCommand),

    /// Manage menu categories
    Category(CategoryCommand),

    /// Manage dishes
    Item(ItemCommand),

    /// Search chefs
    Search(SearchCommand),

    /// Manage configuration
    Config(ConfigCommand),

    /// Check the connection to the menu service
    Status(StatusCommand),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chef=warn,chef_menu_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        // Controller failures were already shown as notices.
        if !e.is::<Reported>() {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let cli_config_path = cli.config.clone();
    let config = Config::load(cli.config)?;

    match &cli.command {
        Some(Commands::Menu(cmd)) => cmd.run(&config)?,
        Some(Commands::Category(cmd)) => cmd.run(&config)?,
        Some(Commands::Item(cmd)) => cmd.run(&config)?,
        Some(Commands::Search(cmd)) => cmd.run(&config)?,
        Some(Commands::Config(cmd)) => cmd.run(&config, cli_config_path)?,
        Some(Commands::Status(cmd)) => cmd.run(&config)?,
        None => println!("Use --help to see available commands"),
    }

    Ok(())
}
