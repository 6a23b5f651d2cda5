//! JSON bodies exchanged with the menu service.
//!
//! Field names follow the service contract (`dish_name`, `prep_time`, ...),
//! which is why these types are kept apart from the domain models.

use serde::{Deserialize, Serialize};

use crate::models::{
    CategoryId, ChefId, ChefSummary, ItemFields, ItemId, MenuItem, Price, SpiceLevel,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub chef_id: ChefId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub dish_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub price: Price,
    pub servings: u8,
    pub prep_time: u16,
    #[serde(default)]
    pub cuisine_type: String,
    #[serde(default)]
    pub dietary_info: String,
    #[serde(default)]
    pub spice_level: SpiceLevel,
    pub is_available: bool,
    #[serde(default)]
    pub display_order: i32,
}

impl From<ItemRecord> for MenuItem {
    fn from(r: ItemRecord) -> Self {
        MenuItem {
            id: r.id,
            chef_id: r.chef_id,
            category_id: r.category_id,
            name: r.dish_name,
            description: r.description,
            photo_url: r.photo_url,
            price: r.price,
            servings: r.servings,
            prep_time_minutes: r.prep_time,
            cuisine_type: r.cuisine_type,
            dietary_info: r.dietary_info,
            spice_level: r.spice_level,
            is_available: r.is_available,
            is_featured: false,
            display_order: r.display_order,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuResponse {
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryResponse {
    pub category_id: CategoryId,
}

/// Item fields as sent on create and update.
///
/// `category_id` is only present on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    pub dish_name: String,
    pub description: String,
    pub price: Price,
    pub servings: u8,
    pub prep_time: u16,
    pub cuisine_type: String,
    pub dietary_info: String,
    pub spice_level: SpiceLevel,
    pub is_available: bool,
    pub display_order: i32,
}

impl ItemPayload {
    pub fn from_fields(fields: &ItemFields, category_id: Option<CategoryId>) -> Self {
        Self {
            category_id,
            dish_name: fields.name.clone(),
            description: fields.description.clone(),
            price: fields.price,
            servings: fields.servings,
            prep_time: fields.prep_time_minutes,
            cuisine_type: fields.cuisine_type.clone(),
            dietary_info: fields.dietary_info.clone(),
            spice_level: fields.spice_level,
            is_available: fields.is_available,
            display_order: fields.display_order,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AvailabilityPayload {
    pub is_available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemResponse {
    #[serde(default)]
    pub success: Option<bool>,
    pub item_id: ItemId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturedItemRecord {
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dish_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeaturedResponse {
    #[serde(default)]
    pub featured_items: Vec<FeaturedItemRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetFeaturedRequest {
    pub item_ids: Vec<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoResponse {
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub chefs: Vec<ChefSummary>,
}

/// Generic acknowledgement body (`{success, error}`) used for failures too.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusBody {
    pub fn ok() -> Self {
        Self {
            success: Some(true),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            error: Some(error.into()),
        }
    }
}
