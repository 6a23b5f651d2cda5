//! Access to the remote menu service.
//!
//! Controllers only ever talk to the service through [`MenuApi`], so tests and
//! alternative transports can stand in for [`HttpMenuApi`].

mod http;
pub mod wire;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;

use crate::error::MenuError;
use crate::models::{CategoryId, ChefId, ChefQuery, ChefSummary, ItemId, MenuItem};
use crate::picker::PickedImage;

pub use http::{HttpMenuApi, DEFAULT_TIMEOUT};
pub use wire::{CategoryRecord, ItemPayload};

/// A chef's menu as returned by the service, before featured projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuSnapshot {
    pub categories: Vec<CategoryRecord>,
    pub items: Vec<MenuItem>,
}

/// The chef's featured item ids at the moment they were read.
///
/// `version` is only present when the service supports conditional writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeaturedSnapshot {
    pub ids: Vec<ItemId>,
    pub version: Option<u64>,
}

impl FeaturedSnapshot {
    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }
}

/// Remote operations the menu controllers depend on.
///
/// Every method is a single request; none of them retry.
#[async_trait]
pub trait MenuApi: Send + Sync {
    async fn fetch_menu(&self, chef: ChefId) -> Result<MenuSnapshot, MenuError>;

    async fn create_category(&self, chef: ChefId, name: &str) -> Result<CategoryId, MenuError>;
    async fn rename_category(&self, id: CategoryId, name: &str) -> Result<(), MenuError>;
    async fn delete_category(&self, id: CategoryId) -> Result<(), MenuError>;

    async fn create_item(&self, chef: ChefId, item: &ItemPayload) -> Result<ItemId, MenuError>;
    async fn update_item(&self, id: ItemId, item: &ItemPayload) -> Result<(), MenuError>;
    async fn set_availability(&self, id: ItemId, available: bool) -> Result<(), MenuError>;
    async fn delete_item(&self, id: ItemId) -> Result<(), MenuError>;

    async fn featured(&self, chef: ChefId) -> Result<FeaturedSnapshot, MenuError>;
    /// Replaces the whole featured list.
    async fn set_featured(
        &self,
        chef: ChefId,
        ids: &[ItemId],
        version: Option<u64>,
    ) -> Result<(), MenuError>;

    /// Uploads a dish photo and returns its new URL.
    async fn upload_photo(&self, id: ItemId, image: PickedImage) -> Result<String, MenuError>;

    async fn search_chefs(&self, query: &ChefQuery) -> Result<Vec<ChefSummary>, MenuError>;
}
