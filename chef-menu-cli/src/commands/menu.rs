use clap::{Args, Subcommand};
use serde_json::{json, Value};

use chef_menu_core::{MenuItem, MenuTree};

use super::OutputFormat;
use crate::config::Config;
use crate::session::{uncategorized, Session};

#[derive(Args)]
pub struct MenuCommand {
    #[command(subcommand)]
    pub command: MenuSubcommand,
}

#[derive(Subcommand)]
pub enum MenuSubcommand {
    /// Show the chef's menu grouped by category
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl MenuCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let rt = tokio::runtime::Runtime::new()?;
        match &self.command {
            MenuSubcommand::Show { format } => {
                let session = rt.block_on(Session::open(config))?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&menu_json(&session.tree))?)
                    }
                    OutputFormat::Text => print!("{}", render_text(&session.tree)),
                }
                Ok(())
            }
        }
    }
}

fn render_text(tree: &MenuTree) -> String {
    let mut out = String::new();
    let title = format!("Menu for chef {}", tree.chef_id());
    out.push_str(&format!("{}\n{}\n", title, "=".repeat(title.len())));

    for category in tree.categories() {
        let id = category.id().map(|id| id.to_string()).unwrap_or_default();
        out.push_str(&format!("\n{} (#{})\n", category.name, id));
        let mut empty = true;
        for item in category.saved_items() {
            out.push_str(&item_line(item));
            empty = false;
        }
        if empty {
            out.push_str("  (no dishes)\n");
        }
    }

    let loose: Vec<&MenuItem> = uncategorized(tree).collect();
    if !loose.is_empty() {
        out.push_str("\nUncategorized\n");
        for item in loose {
            out.push_str(&item_line(item));
        }
    }
    out
}

fn item_line(item: &MenuItem) -> String {
    format!("  [{}] {}\n", item.id, item)
}

fn menu_json(tree: &MenuTree) -> Value {
    let categories: Vec<Value> = tree
        .categories()
        .iter()
        .map(|c| {
            json!({
                "category_id": c.id(),
                "name": c.name,
                "display_order": c.display_order,
                "items": c.saved_items().collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({
        "chef_id": tree.chef_id(),
        "categories": categories,
        "uncategorized": uncategorized(tree).collect::<Vec<_>>(),
    })
}
