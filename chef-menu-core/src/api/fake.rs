//! In-memory [`MenuApi`] that records every request, for controller tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::wire::{CategoryRecord, ItemPayload};
use super::{FeaturedSnapshot, MenuApi, MenuSnapshot};
use crate::error::MenuError;
use crate::models::{CategoryId, ChefId, ChefQuery, ChefSummary, ItemId, MenuItem};
use crate::picker::PickedImage;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
pub(crate) struct FakeState {
    pub categories: Vec<CategoryRecord>,
    pub items: Vec<MenuItem>,
    pub featured: Vec<ItemId>,
    pub chefs: Vec<ChefSummary>,
    pub calls: Vec<Call>,
    next_id: i64,
    failures: VecDeque<MenuError>,
    /// Suspend after reading the featured list so another task can interleave.
    pub yield_after_featured_read: bool,
}

#[derive(Default)]
pub(crate) struct FakeMenuApi {
    state: Mutex<FakeState>,
}

impl FakeMenuApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(f: impl FnOnce(&mut FakeState)) -> Self {
        let api = Self::new();
        f(&mut api.state.lock().unwrap());
        api
    }

    /// Makes the next request fail with `err` (after being recorded).
    pub fn fail_next(&self, err: MenuError) {
        self.state.lock().unwrap().failures.push_back(err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_paths(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|c| format!("{} {}", c.method, c.path))
            .collect()
    }

    pub fn featured_ids(&self) -> Vec<ItemId> {
        self.state.lock().unwrap().featured.clone()
    }

    pub fn item(&self, id: ItemId) -> Option<MenuItem> {
        self.state
            .lock()
            .unwrap()
            .items
            .iter()
            .find(|i| i.id == id)
            .cloned()
    }

    fn record(
        &self,
        method: &'static str,
        path: String,
        body: Option<Value>,
    ) -> Result<std::sync::MutexGuard<'_, FakeState>, MenuError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call { method, path, body });
        match state.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }
}

impl FakeState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[async_trait]
impl MenuApi for FakeMenuApi {
    async fn fetch_menu(&self, chef: ChefId) -> Result<MenuSnapshot, MenuError> {
        let state = self.record("GET", format!("/menu/chef/{}", chef), None)?;
        Ok(MenuSnapshot {
            categories: state.categories.clone(),
            items: state
                .items
                .iter()
                .filter(|i| i.chef_id == chef)
                .cloned()
                .collect(),
        })
    }

    async fn create_category(&self, chef: ChefId, name: &str) -> Result<CategoryId, MenuError> {
        let mut state = self.record(
            "POST",
            format!("/menu/chef/{}/categories", chef),
            Some(json!({ "name": name })),
        )?;
        let id = CategoryId(state.next_id());
        state.categories.push(CategoryRecord {
            category_id: id,
            name: name.to_string(),
            display_order: 0,
        });
        Ok(id)
    }

    async fn rename_category(&self, id: CategoryId, name: &str) -> Result<(), MenuError> {
        let mut state = self.record(
            "PUT",
            format!("/menu/categories/{}", id),
            Some(json!({ "name": name })),
        )?;
        if let Some(category) = state.categories.iter_mut().find(|c| c.category_id == id) {
            category.name = name.to_string();
        }
        Ok(())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), MenuError> {
        let mut state = self.record("DELETE", format!("/menu/categories/{}", id), None)?;
        state.categories.retain(|c| c.category_id != id);
        for item in state.items.iter_mut().filter(|i| i.category_id == Some(id)) {
            item.category_id = None;
        }
        Ok(())
    }

    async fn create_item(&self, chef: ChefId, item: &ItemPayload) -> Result<ItemId, MenuError> {
        let mut state = self.record(
            "POST",
            format!("/menu/chef/{}", chef),
            Some(serde_json::to_value(item).unwrap()),
        )?;
        let id = ItemId(state.next_id());
        let mut created = MenuItem::new(id, chef, item.dish_name.clone(), item.price);
        created.category_id = item.category_id;
        created.is_available = item.is_available;
        state.items.push(created);
        Ok(id)
    }

    async fn update_item(&self, id: ItemId, item: &ItemPayload) -> Result<(), MenuError> {
        let mut state = self.record(
            "PUT",
            format!("/menu/item/{}", id),
            Some(serde_json::to_value(item).unwrap()),
        )?;
        if let Some(existing) = state.items.iter_mut().find(|i| i.id == id) {
            existing.name = item.dish_name.clone();
            existing.price = item.price;
            existing.is_available = item.is_available;
        }
        Ok(())
    }

    async fn set_availability(&self, id: ItemId, available: bool) -> Result<(), MenuError> {
        let mut state = self.record(
            "PUT",
            format!("/menu/item/{}", id),
            Some(json!({ "is_available": available })),
        )?;
        if let Some(existing) = state.items.iter_mut().find(|i| i.id == id) {
            existing.is_available = available;
        }
        Ok(())
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), MenuError> {
        let mut state = self.record("DELETE", format!("/menu/item/{}", id), None)?;
        state.items.retain(|i| i.id != id);
        state.featured.retain(|f| *f != id);
        Ok(())
    }

    async fn featured(&self, chef: ChefId) -> Result<FeaturedSnapshot, MenuError> {
        let (snapshot, pause) = {
            let state = self.record("GET", format!("/menu/chef/{}/featured", chef), None)?;
            (
                FeaturedSnapshot {
                    ids: state.featured.clone(),
                    version: None,
                },
                state.yield_after_featured_read,
            )
        };
        if pause {
            tokio::task::yield_now().await;
        }
        Ok(snapshot)
    }

    async fn set_featured(
        &self,
        chef: ChefId,
        ids: &[ItemId],
        version: Option<u64>,
    ) -> Result<(), MenuError> {
        let mut state = self.record(
            "POST",
            format!("/menu/chef/{}/featured", chef),
            Some(json!({ "item_ids": ids, "version": version })),
        )?;
        state.featured = ids.to_vec();
        Ok(())
    }

    async fn upload_photo(&self, id: ItemId, image: PickedImage) -> Result<String, MenuError> {
        let mut state = self.record(
            "POST",
            format!("/menu/item/{}/photo", id),
            Some(json!({ "file_name": image.file_name, "mime_type": image.mime_type })),
        )?;
        let url = format!("https://cdn.test/{}/{}", id, image.file_name);
        if let Some(existing) = state.items.iter_mut().find(|i| i.id == id) {
            existing.photo_url = Some(url.clone());
        }
        Ok(url)
    }

    async fn search_chefs(&self, query: &ChefQuery) -> Result<Vec<ChefSummary>, MenuError> {
        let state = self.record(
            "GET",
            "/search/chefs".to_string(),
            Some(serde_json::to_value(query).unwrap()),
        )?;
        Ok(state
            .chefs
            .iter()
            .filter(|c| query.matches(c))
            .cloned()
            .collect())
    }
}
