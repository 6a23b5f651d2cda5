use clap::{Args, Subcommand};

use chef_menu_core::{CategoryController, MenuEvent};

use super::Reported;
use crate::config::Config;
use crate::console::PromptConfirm;
use crate::session::Session;

#[derive(Args)]
pub struct CategoryCommand {
    #[command(subcommand)]
    pub command: CategorySubcommand,
}

#[derive(Subcommand)]
pub enum CategorySubcommand {
    /// Add a new category
    Add {
        /// Category name
        name: String,
    },

    /// Rename a category
    Rename {
        /// Category ID or current name
        category: String,

        /// New name
        name: String,
    },

    /// Delete a category (its dishes become uncategorized)
    Delete {
        /// Category ID or name
        category: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

impl CategoryCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.execute(config))
    }

    async fn execute(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let mut session = Session::open(config).await?;

        let event = match &self.command {
            CategorySubcommand::Add { name } => {
                let draft = session.tree.add_category_draft();
                let mut controller = CategoryController::for_draft(draft);
                controller.set_input(name.as_str());
                controller.submit(&session.ctx).await
            }
            CategorySubcommand::Rename { category, name } => {
                let mut controller = CategoryController::new(session.find_category(category)?);
                controller.rename(&session.ctx, name).await
            }
            CategorySubcommand::Delete { category, yes } => {
                let mut controller = CategoryController::new(session.find_category(category)?);
                let confirm = PromptConfirm { assume_yes: *yes };
                controller.delete(&session.ctx, &confirm).await
            }
        }
        .map_err(|_| Reported)?;

        match &event {
            Some(MenuEvent::CategoryCreated { id, .. }) => println!("Category id: {}", id),
            None if matches!(self.command, CategorySubcommand::Rename { .. }) => {
                println!("Name unchanged.")
            }
            None if matches!(self.command, CategorySubcommand::Delete { .. }) => {
                println!("Cancelled.")
            }
            _ => {}
        }
        session.apply(event);
        Ok(())
    }
}
