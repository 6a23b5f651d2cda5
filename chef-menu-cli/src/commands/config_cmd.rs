use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use super::OutputFormat;
use crate::config::{Config, DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        cli_config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&redacted(config))?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("server_url: {}", config.server_url.value);
                        println!("  source: {}", config.server_url.source);
                        println!();

                        match &config.api_key {
                            Some(key) => {
                                println!("api_key: ********");
                                println!("  source: {}", key.source);
                            }
                            None => println!("api_key: (not set)"),
                        }
                        println!();

                        match &config.chef_id {
                            Some(id) => {
                                println!("chef_id: {}", id.value);
                                println!("  source: {}", id.source);
                            }
                            None => println!("chef_id: (not set)"),
                        }
                        println!();

                        println!(
                            "request_timeout_secs: {}",
                            config.request_timeout_secs.value
                        );
                        println!("  source: {}", config.request_timeout_secs.source);
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = cli_config_path.unwrap_or_else(Config::default_config_path);

                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'chef config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                file.write_all(config_template().as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to set your chef id and API key.");
                Ok(())
            }
        }
    }
}

/// Copy of the config that never prints the API key.
fn redacted(config: &Config) -> Config {
    let mut copy = config.clone();
    if let Some(key) = copy.api_key.as_mut() {
        key.value = "********".to_string();
    }
    copy
}

fn config_template() -> String {
    format!(
        r#"# chef configuration

# Menu service base URL
server_url: {}

# API key issued for your chef account
# api_key: your-key

# Your chef id
# chef_id: 1

# Seconds before a request is abandoned
request_timeout_secs: {}
"#,
        DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS
    )
}
