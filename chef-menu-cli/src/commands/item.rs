use clap::{Args, Subcommand};
use std::path::PathBuf;

use chef_menu_core::{ItemController, ItemForm, MenuEvent, SpiceLevel};

use super::Reported;
use crate::config::Config;
use crate::console::{FilePicker, PromptConfirm};
use crate::session::Session;

#[derive(Args)]
pub struct ItemCommand {
    #[command(subcommand)]
    pub command: ItemSubcommand,
}

/// Optional dish details shared by `add` and `update`.
#[derive(Args)]
pub struct DishDetails {
    /// Description
    #[arg(long)]
    description: Option<String>,

    /// Number of servings (1-10)
    #[arg(long)]
    servings: Option<u8>,

    /// Prep time in minutes (0-120)
    #[arg(long)]
    prep_time: Option<u16>,

    /// Cuisine type
    #[arg(long)]
    cuisine: Option<String>,

    /// Dietary information
    #[arg(long)]
    dietary: Option<String>,

    /// Spice level (none, mild, medium, hot, volcanic)
    #[arg(long)]
    spice: Option<SpiceLevel>,

    /// Position within its category
    #[arg(long)]
    display_order: Option<i32>,
}

impl DishDetails {
    fn apply_to(&self, form: &mut ItemForm) {
        if let Some(description) = &self.description {
            form.description = description.clone();
        }
        if let Some(servings) = self.servings {
            form.servings = servings;
        }
        if let Some(prep_time) = self.prep_time {
            form.prep_time_minutes = prep_time;
        }
        if let Some(cuisine) = &self.cuisine {
            form.cuisine_type = cuisine.clone();
        }
        if let Some(dietary) = &self.dietary {
            form.dietary_info = dietary.clone();
        }
        if let Some(spice) = self.spice {
            form.spice_level = spice;
        }
        if let Some(order) = self.display_order {
            form.display_order = order;
        }
    }
}

#[derive(Subcommand)]
pub enum ItemSubcommand {
    /// Add a dish to the menu
    Add {
        /// Dish name
        name: String,

        /// Price, e.g. 12 or 12.50
        #[arg(long)]
        price: String,

        /// Category ID or name (omit for uncategorized)
        #[arg(long)]
        category: Option<String>,

        /// Add the dish as unavailable
        #[arg(long)]
        unavailable: bool,

        #[command(flatten)]
        details: DishDetails,
    },

    /// Update a dish
    Update {
        /// Dish ID or name
        item: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New price
        #[arg(long)]
        price: Option<String>,

        #[command(flatten)]
        details: DishDetails,
    },

    /// Delete a dish
    Delete {
        /// Dish ID or name
        item: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Toggle whether a dish can be ordered
    Availability {
        /// Dish ID or name
        item: String,
    },

    /// Toggle whether a dish is featured on the chef's profile
    Feature {
        /// Dish ID or name
        item: String,
    },

    /// Upload a photo for a dish
    Photo {
        /// Dish ID or name
        item: String,

        /// Image file to upload
        path: PathBuf,
    },
}

impl ItemCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.execute(config))
    }

    async fn execute(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let mut session = Session::open(config).await?;
        let ctx = session.ctx.clone();

        let result = match &self.command {
            ItemSubcommand::Add {
                name,
                price,
                category,
                unavailable,
                details,
            } => {
                let category_id = match category {
                    Some(ident) => session.find_category(ident)?.id(),
                    None => None,
                };
                let draft = session
                    .tree
                    .add_item_draft(category_id)
                    .ok_or("Category is not on this menu")?;
                let slot = session
                    .tree
                    .item_draft(draft)
                    .ok_or("Draft dish was not created")?;
                let mut controller = ItemController::for_draft(slot);
                if let Some(form) = controller.form_mut() {
                    form.name = name.clone();
                    form.price = price.clone();
                    form.is_available = !unavailable;
                    details.apply_to(form);
                }
                controller.save(&ctx).await
            }
            ItemSubcommand::Update {
                item,
                name,
                price,
                details,
            } => {
                let mut controller = ItemController::new(session.find_item(item)?.clone());
                controller.begin_edit();
                if let Some(form) = controller.form_mut() {
                    if let Some(name) = name {
                        form.name = name.clone();
                    }
                    if let Some(price) = price {
                        form.price = price.clone();
                    }
                    details.apply_to(form);
                }
                controller.save(&ctx).await
            }
            ItemSubcommand::Delete { item, yes } => {
                let mut controller = ItemController::new(session.find_item(item)?.clone());
                let confirm = PromptConfirm { assume_yes: *yes };
                let event = controller.delete(&ctx, &confirm).await;
                if matches!(event, Ok(None)) {
                    println!("Cancelled.");
                }
                event
            }
            ItemSubcommand::Availability { item } => {
                let mut controller = ItemController::new(session.find_item(item)?.clone());
                controller.toggle_availability(&ctx).await
            }
            ItemSubcommand::Feature { item } => {
                let mut controller = ItemController::new(session.find_item(item)?.clone());
                controller.toggle_featured(&ctx).await
            }
            ItemSubcommand::Photo { item, path } => {
                let mut controller = ItemController::new(session.find_item(item)?.clone());
                let picker = FilePicker { path: path.clone() };
                controller.pick_and_upload_image(&ctx, &picker).await
            }
        };
        let event = result.map_err(|_| Reported)?;

        match &event {
            Some(MenuEvent::ItemCreated { item, .. }) => println!("Dish id: {}", item.id),
            Some(MenuEvent::ItemChanged { item, .. }) => println!("{}", item),
            _ => {}
        }
        session.apply(event);
        Ok(())
    }
}
