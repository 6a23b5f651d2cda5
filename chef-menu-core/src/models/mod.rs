mod category;
mod chef;
mod ids;
mod item;
mod price;

pub use category::{
    normalize_category_name, Category, CategoryKey, CategoryPatch, ItemDraft, ItemSlot,
    MAX_CATEGORY_NAME_LEN,
};
pub use chef::{ChefQuery, ChefSummary};
pub use ids::{CategoryId, ChefId, DraftId, ItemId};
pub use item::{
    ItemFields, ItemForm, MenuItem, SpiceLevel, ValidationError, MAX_PREP_TIME_MINUTES,
    MAX_SERVINGS, MIN_SERVINGS,
};
pub use price::{Price, PriceError};
