use serde::{Deserialize, Serialize};

use super::ids::{CategoryId, DraftId};
use super::item::{ItemForm, MenuItem, ValidationError};

pub const MAX_CATEGORY_NAME_LEN: usize = 100;

/// How a category is addressed inside a menu tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryKey {
    Persisted(CategoryId),
    Draft(DraftId),
}

impl CategoryKey {
    pub fn id(&self) -> Option<CategoryId> {
        match self {
            CategoryKey::Persisted(id) => Some(*id),
            CategoryKey::Draft(_) => None,
        }
    }
}

impl From<CategoryId> for CategoryKey {
    fn from(id: CategoryId) -> Self {
        CategoryKey::Persisted(id)
    }
}

/// An unsaved dish waiting in a category until its first create call succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub draft: DraftId,
    pub category_id: Option<CategoryId>,
    pub form: ItemForm,
}

/// One row under a category: either a saved dish or a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSlot {
    Saved(MenuItem),
    Draft(ItemDraft),
}

impl ItemSlot {
    pub fn saved(&self) -> Option<&MenuItem> {
        match self {
            ItemSlot::Saved(item) => Some(item),
            ItemSlot::Draft(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub key: CategoryKey,
    pub name: String,
    pub display_order: i32,
    pub items: Vec<ItemSlot>,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            key: CategoryKey::Persisted(id),
            name: name.into(),
            display_order: 0,
            items: Vec::new(),
        }
    }

    pub fn draft(draft: DraftId) -> Self {
        Self {
            key: CategoryKey::Draft(draft),
            name: String::new(),
            display_order: 0,
            items: Vec::new(),
        }
    }

    pub fn id(&self) -> Option<CategoryId> {
        self.key.id()
    }

    pub fn is_draft(&self) -> bool {
        matches!(self.key, CategoryKey::Draft(_))
    }

    pub fn saved_items(&self) -> impl Iterator<Item = &MenuItem> {
        self.items.iter().filter_map(ItemSlot::saved)
    }
}

/// Display fields that can be patched onto a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub display_order: Option<i32>,
}

impl CategoryPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            display_order: None,
        }
    }
}

/// Trims a proposed category name and checks it against the length limits.
pub fn normalize_category_name(input: &str) -> Result<String, ValidationError> {
    let name = input.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyCategoryName);
    }
    if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(ValidationError::CategoryNameTooLong {
            max: MAX_CATEGORY_NAME_LEN,
        });
    }
    Ok(name.to_string())
}
