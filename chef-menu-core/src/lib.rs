//! Chef Menu Core Library
//!
//! Menu models, the client-side draft tree and the controllers that keep a
//! chef's menu in sync with the marketplace service.

pub mod api;
pub mod controller;
pub mod error;
pub mod featured;
pub mod menu;
pub mod models;
pub mod picker;

pub use api::{FeaturedSnapshot, HttpMenuApi, MenuApi, MenuSnapshot};
pub use controller::{
    CategoryController, CategoryPhase, Confirm, ItemController, ItemOp, ItemPhase, MenuContext,
    Notice, NoticeLevel, Notifier, UploadPhase,
};
pub use error::{MenuError, GENERIC_FAILURE_MESSAGE, TRANSPORT_FAILURE_MESSAGE};
pub use menu::{ItemChange, MenuEvent, MenuTree};
pub use models::{
    Category, CategoryId, CategoryKey, CategoryPatch, ChefId, ChefQuery, ChefSummary, DraftId,
    ItemDraft, ItemFields, ItemForm, ItemId, ItemSlot, MenuItem, Price, PriceError, SpiceLevel,
    ValidationError,
};
pub use picker::{ImagePicker, PickedImage};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
