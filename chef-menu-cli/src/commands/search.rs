use clap::Args;

use chef_menu_core::{ChefQuery, ChefSummary};

use super::OutputFormat;
use crate::config::Config;
use crate::session::connect;

/// Search chefs the way customers do
#[derive(Args)]
pub struct SearchCommand {
    /// Text matched against chef names, cuisines and featured dishes
    query: Option<String>,

    /// Only chefs cooking this cuisine
    #[arg(long)]
    cuisine: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl SearchCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let api = connect(config)?;
        let query = ChefQuery {
            text: self.query.clone(),
            cuisine: self.cuisine.clone(),
        };

        let rt = tokio::runtime::Runtime::new()?;
        let chefs = rt.block_on(api.search_chefs(&query))?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&chefs)?),
            OutputFormat::Text => {
                if chefs.is_empty() {
                    println!("No chefs found.");
                }
                for chef in &chefs {
                    print!("{}", summary_line(chef));
                }
            }
        }
        Ok(())
    }
}

fn summary_line(chef: &ChefSummary) -> String {
    let mut line = format!("[{}] {}", chef.chef_id, chef.name);
    if !chef.cuisines.is_empty() {
        line.push_str(&format!(" - {}", chef.cuisines.join(", ")));
    }
    line.push('\n');
    if !chef.featured_dishes.is_empty() {
        line.push_str(&format!("    featured: {}\n", chef.featured_dishes.join(", ")));
    }
    line
}
