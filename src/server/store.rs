//! In-memory menu storage for the reference server.
//!
//! All state lives behind one mutex that is never held across an await, so
//! every operation is atomic with respect to the others. The featured list of
//! each chef carries a version that is bumped on every write; a write naming
//! a different version is rejected.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chef_menu_core::api::wire::{
    CategoryRecord, FeaturedItemRecord, FeaturedResponse, ItemPayload, ItemRecord, MenuResponse,
};
use chef_menu_core::models::{
    normalize_category_name, CategoryId, ChefId, ChefQuery, ChefSummary, ItemId,
    MAX_PREP_TIME_MINUTES, MAX_SERVINGS, MIN_SERVINGS,
};
use serde::Deserialize;

/// A chef profile as listed in the server config.
#[derive(Debug, Clone, Deserialize)]
pub struct ChefProfile {
    pub chef_id: ChefId,
    pub name: String,
    #[serde(default)]
    pub cuisines: Vec<String>,
}

/// An uploaded photo kept in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Errors returned by store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The entity does not exist.
    NotFound(&'static str),
    /// The entity belongs to another chef.
    Forbidden,
    /// The featured list changed since the client read it.
    Conflict { current: u64 },
    /// The request content is not acceptable.
    Invalid(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(what) => write!(f, "{} not found", what),
            StoreError::Forbidden => write!(f, "You can only change your own menu"),
            StoreError::Conflict { .. } => write!(
                f,
                "Your featured dishes were changed elsewhere. Refresh and try again."
            ),
            StoreError::Invalid(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Clone)]
struct StoredCategory {
    chef_id: ChefId,
    name: String,
    display_order: i32,
}

#[derive(Debug, Clone, Default)]
struct FeaturedList {
    ids: Vec<ItemId>,
    version: u64,
}

#[derive(Debug, Default)]
struct StoreState {
    chefs: BTreeMap<ChefId, ChefProfile>,
    categories: BTreeMap<CategoryId, StoredCategory>,
    items: BTreeMap<ItemId, ItemRecord>,
    featured: HashMap<ChefId, FeaturedList>,
    photos: HashMap<String, StoredPhoto>,
    /// Current photo name of each dish, so replaced photos can be dropped.
    photo_names: HashMap<ItemId, String>,
    next_id: i64,
}

impl StoreState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn owned_category(&self, chef: ChefId, id: CategoryId) -> Result<&StoredCategory, StoreError> {
        let category = self
            .categories
            .get(&id)
            .ok_or(StoreError::NotFound("Category"))?;
        if category.chef_id != chef {
            return Err(StoreError::Forbidden);
        }
        Ok(category)
    }

    fn owned_item_mut(&mut self, chef: ChefId, id: ItemId) -> Result<&mut ItemRecord, StoreError> {
        let item = self.items.get_mut(&id).ok_or(StoreError::NotFound("Dish"))?;
        if item.chef_id != chef {
            return Err(StoreError::Forbidden);
        }
        Ok(item)
    }

    fn featured_mut(&mut self, chef: ChefId) -> &mut FeaturedList {
        self.featured.entry(chef).or_default()
    }
}

#[derive(Debug, Default)]
pub struct MenuStore {
    state: Mutex<StoreState>,
}

impl MenuStore {
    pub fn new(chefs: Vec<ChefProfile>) -> Self {
        let state = StoreState {
            chefs: chefs.into_iter().map(|c| (c.chef_id, c)).collect(),
            ..StoreState::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn menu(&self, chef: ChefId) -> MenuResponse {
        let state = self.lock();
        let mut categories: Vec<CategoryRecord> = state
            .categories
            .iter()
            .filter(|(_, c)| c.chef_id == chef)
            .map(|(id, c)| CategoryRecord {
                category_id: *id,
                name: c.name.clone(),
                display_order: c.display_order,
            })
            .collect();
        categories.sort_by_key(|c| c.display_order);

        let items = state
            .items
            .values()
            .filter(|i| i.chef_id == chef)
            .cloned()
            .collect();
        MenuResponse { categories, items }
    }

    pub fn create_category(&self, chef: ChefId, name: &str) -> Result<CategoryId, StoreError> {
        let name = normalize_category_name(name).map_err(|e| StoreError::Invalid(e.to_string()))?;
        let mut state = self.lock();
        let display_order = state
            .categories
            .values()
            .filter(|c| c.chef_id == chef)
            .count() as i32;
        let id = CategoryId(state.next_id());
        state.categories.insert(
            id,
            StoredCategory {
                chef_id: chef,
                name,
                display_order,
            },
        );
        tracing::info!(%chef, category = %id, "Category created");
        Ok(id)
    }

    pub fn rename_category(&self, chef: ChefId, id: CategoryId, name: &str) -> Result<(), StoreError> {
        let name = normalize_category_name(name).map_err(|e| StoreError::Invalid(e.to_string()))?;
        let mut state = self.lock();
        state.owned_category(chef, id)?;
        if let Some(category) = state.categories.get_mut(&id) {
            category.name = name;
        }
        Ok(())
    }

    /// Deletes a category. Its dishes stay on the menu, uncategorized.
    pub fn delete_category(&self, chef: ChefId, id: CategoryId) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.owned_category(chef, id)?;
        state.categories.remove(&id);
        let mut detached = 0;
        for item in state.items.values_mut().filter(|i| i.category_id == Some(id)) {
            item.category_id = None;
            detached += 1;
        }
        tracing::info!(%chef, category = %id, detached, "Category deleted");
        Ok(())
    }

    pub fn create_item(&self, chef: ChefId, payload: &ItemPayload) -> Result<ItemId, StoreError> {
        validate_item(payload)?;
        let mut state = self.lock();
        if let Some(category) = payload.category_id {
            state
                .owned_category(chef, category)
                .map_err(|_| StoreError::Invalid("Unknown category".to_string()))?;
        }
        let id = ItemId(state.next_id());
        let record = record_from_payload(id, chef, payload.category_id, None, payload);
        state.items.insert(id, record);
        tracing::info!(%chef, item = %id, "Dish created");
        Ok(id)
    }

    /// Replaces a dish's fields. The category and photo are kept unless the
    /// payload names a new category.
    pub fn update_item(&self, chef: ChefId, id: ItemId, payload: &ItemPayload) -> Result<(), StoreError> {
        validate_item(payload)?;
        let mut state = self.lock();
        if let Some(category) = payload.category_id {
            state
                .owned_category(chef, category)
                .map_err(|_| StoreError::Invalid("Unknown category".to_string()))?;
        }
        let item = state.owned_item_mut(chef, id)?;
        let category_id = payload.category_id.or(item.category_id);
        let photo_url = item.photo_url.take();
        *item = record_from_payload(id, chef, category_id, photo_url, payload);
        Ok(())
    }

    pub fn set_availability(&self, chef: ChefId, id: ItemId, available: bool) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.owned_item_mut(chef, id)?.is_available = available;
        Ok(())
    }

    pub fn delete_item(&self, chef: ChefId, id: ItemId) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.owned_item_mut(chef, id)?;
        state.items.remove(&id);
        if let Some(name) = state.photo_names.remove(&id) {
            state.photos.remove(&name);
        }
        let featured = state.featured_mut(chef);
        if featured.ids.contains(&id) {
            featured.ids.retain(|f| *f != id);
            featured.version += 1;
        }
        Ok(())
    }

    pub fn featured(&self, chef: ChefId) -> FeaturedResponse {
        let state = self.lock();
        let Some(list) = state.featured.get(&chef) else {
            return FeaturedResponse {
                featured_items: Vec::new(),
                version: Some(0),
            };
        };
        let featured_items = list
            .ids
            .iter()
            .map(|id| FeaturedItemRecord {
                id: *id,
                dish_name: state.items.get(id).map(|i| i.dish_name.clone()),
            })
            .collect();
        FeaturedResponse {
            featured_items,
            version: Some(list.version),
        }
    }

    /// Replaces the featured list.
    ///
    /// When `version` is given it must match the current one. Without a
    /// version the write is unconditional.
    pub fn set_featured(
        &self,
        chef: ChefId,
        ids: &[ItemId],
        version: Option<u64>,
    ) -> Result<u64, StoreError> {
        let mut state = self.lock();
        for id in ids {
            match state.items.get(id) {
                Some(item) if item.chef_id == chef => {}
                _ => return Err(StoreError::Invalid(format!("Dish {} is not on your menu", id))),
            }
        }

        let featured = state.featured_mut(chef);
        if let Some(expected) = version {
            if expected != featured.version {
                tracing::warn!(%chef, expected, current = featured.version, "Stale featured write");
                return Err(StoreError::Conflict {
                    current: featured.version,
                });
            }
        }

        let mut next: Vec<ItemId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !next.contains(id) {
                next.push(*id);
            }
        }
        featured.ids = next;
        featured.version += 1;
        Ok(featured.version)
    }

    /// Stores a photo for a dish and points the dish at `url`. The dish's
    /// previous photo is dropped.
    pub fn store_photo(
        &self,
        chef: ChefId,
        id: ItemId,
        name: String,
        url: String,
        photo: StoredPhoto,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.owned_item_mut(chef, id)?.photo_url = Some(url);
        if let Some(old) = state.photo_names.insert(id, name.clone()) {
            if old != name {
                state.photos.remove(&old);
            }
        }
        state.photos.insert(name, photo);
        Ok(())
    }

    pub fn photo(&self, name: &str) -> Option<StoredPhoto> {
        self.lock().photos.get(name).cloned()
    }

    pub fn search(&self, query: &ChefQuery) -> Vec<ChefSummary> {
        let state = self.lock();
        state
            .chefs
            .values()
            .map(|chef| {
                let featured_dishes = state
                    .featured
                    .get(&chef.chef_id)
                    .map(|list| {
                        list.ids
                            .iter()
                            .filter_map(|id| state.items.get(id))
                            .map(|i| i.dish_name.clone())
                            .collect()
                    })
                    .unwrap_or_default();
                ChefSummary {
                    chef_id: chef.chef_id,
                    name: chef.name.clone(),
                    cuisines: chef.cuisines.clone(),
                    featured_dishes,
                }
            })
            .filter(|summary| query.matches(summary))
            .collect()
    }
}

fn validate_item(payload: &ItemPayload) -> Result<(), StoreError> {
    if payload.dish_name.trim().is_empty() {
        return Err(StoreError::Invalid("Dish name is required".to_string()));
    }
    if !(MIN_SERVINGS..=MAX_SERVINGS).contains(&payload.servings) {
        return Err(StoreError::Invalid(format!(
            "Servings must be between {} and {}",
            MIN_SERVINGS, MAX_SERVINGS
        )));
    }
    if payload.prep_time > MAX_PREP_TIME_MINUTES {
        return Err(StoreError::Invalid(format!(
            "Prep time cannot exceed {} minutes",
            MAX_PREP_TIME_MINUTES
        )));
    }
    Ok(())
}

fn record_from_payload(
    id: ItemId,
    chef: ChefId,
    category_id: Option<CategoryId>,
    photo_url: Option<String>,
    payload: &ItemPayload,
) -> ItemRecord {
    ItemRecord {
        id,
        chef_id: chef,
        category_id,
        dish_name: payload.dish_name.trim().to_string(),
        description: payload.description.clone(),
        photo_url,
        price: payload.price,
        servings: payload.servings,
        prep_time: payload.prep_time,
        cuisine_type: payload.cuisine_type.clone(),
        dietary_info: payload.dietary_info.clone(),
        spice_level: payload.spice_level,
        is_available: payload.is_available,
        display_order: payload.display_order,
    }
}
