//! A connected menu screen: the controller context plus the loaded tree.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use chef_menu_core::{
    Category, ChefId, HttpMenuApi, ItemSlot, MenuApi, MenuContext, MenuError, MenuEvent, MenuItem,
    MenuTree,
};

use crate::config::Config;
use crate::console::ConsoleNotifier;

/// Builds the HTTP client from configuration.
pub fn connect(config: &Config) -> Result<Arc<dyn MenuApi>, Box<dyn Error>> {
    let api = HttpMenuApi::with_timeout(
        config.server_url.value.as_str(),
        config.api_key()?,
        config.request_timeout(),
    )?;
    tracing::debug!(server = api.base_url(), "Connected menu client");
    Ok(Arc::new(api))
}

pub struct Session {
    pub ctx: MenuContext,
    pub tree: MenuTree,
}

impl Session {
    /// Connects and loads the configured chef's menu.
    pub async fn open(config: &Config) -> Result<Self, Box<dyn Error>> {
        let api = connect(config)?;
        let ctx = MenuContext::new(ChefId(config.chef_id()?), api, Arc::new(ConsoleNotifier));
        let tree = load_tree(&ctx).await?;
        Ok(Self { ctx, tree })
    }

    pub fn apply(&mut self, event: Option<MenuEvent>) {
        if let Some(event) = event {
            self.tree.apply(event);
        }
    }

    pub fn find_category(&self, ident: &str) -> Result<&Category, LookupError> {
        let matches: Vec<&Category> = self
            .tree
            .categories()
            .iter()
            .filter(|c| {
                c.id().is_some_and(|id| id.to_string() == ident)
                    || c.name.eq_ignore_ascii_case(ident.trim())
            })
            .collect();
        single("category", ident, matches)
    }

    pub fn find_item(&self, ident: &str) -> Result<&MenuItem, LookupError> {
        let matches: Vec<&MenuItem> = self
            .tree
            .items()
            .filter(|i| i.id.to_string() == ident || i.name.eq_ignore_ascii_case(ident.trim()))
            .collect();
        single("dish", ident, matches)
    }
}

/// Fetches the menu and the featured list and builds the tree from both.
pub async fn load_tree(ctx: &MenuContext) -> Result<MenuTree, MenuError> {
    let snapshot = ctx.request(ctx.api().fetch_menu(ctx.chef_id())).await?;
    let featured = ctx.request(ctx.api().featured(ctx.chef_id())).await?;
    Ok(MenuTree::from_snapshot(ctx.chef_id(), snapshot, &featured))
}

/// Saved items of the uncategorized bucket.
pub fn uncategorized(tree: &MenuTree) -> impl Iterator<Item = &MenuItem> {
    tree.uncategorized().iter().filter_map(ItemSlot::saved)
}

fn single<'a, T>(kind: &'static str, ident: &str, mut matches: Vec<&'a T>) -> Result<&'a T, LookupError> {
    match matches.len() {
        0 => Err(LookupError::NotFound(kind, ident.to_string())),
        1 => Ok(matches.remove(0)),
        n => Err(LookupError::Ambiguous(kind, ident.to_string(), n)),
    }
}

#[derive(Debug)]
pub enum LookupError {
    NotFound(&'static str, String),
    Ambiguous(&'static str, String, usize),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NotFound(kind, ident) => write!(f, "No {} matches '{}'", kind, ident),
            LookupError::Ambiguous(kind, ident, n) => write!(
                f,
                "'{}' matches {} {}s; use the numeric id instead",
                ident, n, kind
            ),
        }
    }
}

impl Error for LookupError {}
