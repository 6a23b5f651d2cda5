use clap::Args;

use crate::config::Config;
use chef_menu_core::HttpMenuApi;

/// Show the configured server and whether it is reachable
#[derive(Args)]
pub struct StatusCommand;

impl StatusCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        println!("Server:  {}", config.server_url.value);
        match &config.chef_id {
            Some(id) => println!("Chef:    {} ({})", id.value, id.source),
            None => println!("Chef:    (not configured)"),
        }
        match &config.api_key {
            Some(key) => println!("API key: configured ({})", key.source),
            None => println!("API key: (not configured)"),
        }

        // The health endpoint is public, so no key is needed to probe it.
        let api = HttpMenuApi::with_timeout(
            config.server_url.value.as_str(),
            "",
            config.request_timeout(),
        )?;
        let rt = tokio::runtime::Runtime::new()?;
        if rt.block_on(api.check_health()) {
            println!("Status:  ✓ reachable");
        } else {
            println!("Status:  ✗ unreachable");
        }
        Ok(())
    }
}
