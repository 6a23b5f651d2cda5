//! The client-side menu tree and the events that mutate it.
//!
//! `MenuTree` never performs I/O. Controllers report confirmed changes as
//! [`MenuEvent`]s and the owner of the tree feeds them to [`MenuTree::apply`].

use crate::api::{FeaturedSnapshot, MenuSnapshot};
use crate::models::{
    Category, CategoryId, CategoryKey, CategoryPatch, ChefId, DraftId, ItemDraft, ItemForm,
    ItemId, ItemSlot, MenuItem,
};

/// Which aspect of a saved item a [`MenuEvent::ItemChanged`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemChange {
    Fields,
    Availability,
    Featured,
    Photo,
}

/// A confirmed change coming out of a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    CategoryCreated {
        draft: DraftId,
        id: CategoryId,
        name: String,
    },
    CategoryRenamed {
        id: CategoryId,
        name: String,
    },
    CategoryDeleted {
        id: CategoryId,
    },
    CategoryDraftDiscarded {
        draft: DraftId,
    },
    ItemCreated {
        draft: DraftId,
        item: MenuItem,
    },
    ItemChanged {
        item: MenuItem,
        change: ItemChange,
    },
    ItemDeleted {
        id: ItemId,
    },
    ItemDraftDiscarded {
        draft: DraftId,
    },
}

/// Position of an item slot: category index (`None` = uncategorized) and index within it.
type SlotPos = (Option<usize>, usize);

/// One chef's menu: categories in display order plus an uncategorized bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuTree {
    chef_id: ChefId,
    categories: Vec<Category>,
    uncategorized: Vec<ItemSlot>,
    next_draft: u64,
}

impl MenuTree {
    pub fn new(chef_id: ChefId) -> Self {
        Self {
            chef_id,
            categories: Vec::new(),
            uncategorized: Vec::new(),
            next_draft: 0,
        }
    }

    /// Builds a tree from a fetched menu, projecting featured membership onto items.
    pub fn from_snapshot(
        chef_id: ChefId,
        snapshot: MenuSnapshot,
        featured: &FeaturedSnapshot,
    ) -> Self {
        let mut tree = Self::new(chef_id);

        let mut categories = snapshot.categories;
        categories.sort_by_key(|c| c.display_order);
        for record in categories {
            tree.upsert_category(
                CategoryKey::Persisted(record.category_id),
                CategoryPatch {
                    name: Some(record.name),
                    display_order: Some(record.display_order),
                },
            );
        }

        let mut items = snapshot.items;
        items.sort_by_key(|i| i.display_order);
        for mut item in items {
            item.is_featured = featured.contains(item.id);
            tree.upsert_item(item);
        }

        tree
    }

    pub fn chef_id(&self) -> ChefId {
        self.chef_id
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn uncategorized(&self) -> &[ItemSlot] {
        &self.uncategorized
    }

    pub fn category(&self, key: CategoryKey) -> Option<&Category> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// Every saved item in the tree, categorized or not.
    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .chain(self.uncategorized.iter())
            .filter_map(ItemSlot::saved)
    }

    pub fn item(&self, id: ItemId) -> Option<&MenuItem> {
        self.items().find(|i| i.id == id)
    }

    pub fn item_draft(&self, draft: DraftId) -> Option<&ItemDraft> {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .chain(self.uncategorized.iter())
            .find_map(|slot| match slot {
                ItemSlot::Draft(d) if d.draft == draft => Some(d),
                _ => None,
            })
    }

    /// Adds an empty, unsaved category at the end of the menu.
    pub fn add_category_draft(&mut self) -> DraftId {
        let draft = self.issue_draft_id();
        self.categories.push(Category::draft(draft));
        draft
    }

    /// Adds an empty dish draft under a saved category, or uncategorized for `None`.
    ///
    /// Returns `None` when the category is not in the tree.
    pub fn add_item_draft(&mut self, category_id: Option<CategoryId>) -> Option<DraftId> {
        if let Some(id) = category_id {
            self.category(CategoryKey::Persisted(id))?;
        }
        let draft = self.issue_draft_id();
        let slot = ItemSlot::Draft(ItemDraft {
            draft,
            category_id,
            form: ItemForm::default(),
        });
        self.bucket_mut(category_id).push(slot);
        Some(draft)
    }

    /// Replaces or inserts a category's display fields. Returns false if nothing changed.
    pub fn upsert_category(&mut self, key: CategoryKey, patch: CategoryPatch) -> bool {
        match self.categories.iter().position(|c| c.key == key) {
            Some(index) => {
                let category = &mut self.categories[index];
                let mut changed = false;
                if let Some(name) = patch.name {
                    if category.name != name {
                        category.name = name;
                        changed = true;
                    }
                }
                if let Some(order) = patch.display_order {
                    if category.display_order != order {
                        category.display_order = order;
                        changed = true;
                    }
                }
                changed
            }
            None => {
                self.categories.push(Category {
                    key,
                    name: patch.name.unwrap_or_default(),
                    display_order: patch.display_order.unwrap_or_default(),
                    items: Vec::new(),
                });
                true
            }
        }
    }

    /// Removes a category; its items (and item drafts) become uncategorized.
    pub fn remove_category(&mut self, id: CategoryId) -> bool {
        let Some(index) = self
            .categories
            .iter()
            .position(|c| c.key == CategoryKey::Persisted(id))
        else {
            return false;
        };

        let category = self.categories.remove(index);
        for mut slot in category.items {
            match &mut slot {
                ItemSlot::Saved(item) => item.category_id = None,
                ItemSlot::Draft(draft) => draft.category_id = None,
            }
            self.uncategorized.push(slot);
        }
        true
    }

    pub fn discard_category_draft(&mut self, draft: DraftId) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c.key != CategoryKey::Draft(draft));
        self.categories.len() != before
    }

    /// Inserts or wholesale-replaces an item, filing it under its category.
    ///
    /// An item pointing at a category that is not in the tree is filed as
    /// uncategorized with its `category_id` cleared.
    pub fn upsert_item(&mut self, mut item: MenuItem) -> bool {
        if let Some(id) = item.category_id {
            if self.category(CategoryKey::Persisted(id)).is_none() {
                item.category_id = None;
            }
        }
        let target = self.category_index(item.category_id);

        match self.locate_item(item.id) {
            Some((bucket, pos)) if bucket == target => {
                let slot = &mut self.bucket_at_mut(bucket)[pos];
                if slot.saved() == Some(&item) {
                    return false;
                }
                *slot = ItemSlot::Saved(item);
            }
            Some((bucket, pos)) => {
                self.bucket_at_mut(bucket).remove(pos);
                self.bucket_at_mut(target).push(ItemSlot::Saved(item));
            }
            None => self.bucket_at_mut(target).push(ItemSlot::Saved(item)),
        }
        true
    }

    pub fn remove_item(&mut self, id: ItemId) -> bool {
        match self.locate_item(id) {
            Some((bucket, pos)) => {
                self.bucket_at_mut(bucket).remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn discard_item_draft(&mut self, draft: DraftId) -> bool {
        match self.locate_draft(draft) {
            Some((bucket, pos)) => {
                self.bucket_at_mut(bucket).remove(pos);
                true
            }
            None => false,
        }
    }

    /// Applies a controller outcome. Returns false when the event changed nothing.
    pub fn apply(&mut self, event: MenuEvent) -> bool {
        tracing::debug!(?event, "Applying menu event");
        match event {
            MenuEvent::CategoryCreated { draft, id, name } => {
                match self
                    .categories
                    .iter()
                    .position(|c| c.key == CategoryKey::Draft(draft))
                {
                    Some(index) => {
                        let category = &mut self.categories[index];
                        category.key = CategoryKey::Persisted(id);
                        category.name = name;
                        true
                    }
                    None => {
                        self.upsert_category(CategoryKey::Persisted(id), CategoryPatch::name(name))
                    }
                }
            }
            MenuEvent::CategoryRenamed { id, name } => {
                self.upsert_category(CategoryKey::Persisted(id), CategoryPatch::name(name))
            }
            MenuEvent::CategoryDeleted { id } => self.remove_category(id),
            MenuEvent::CategoryDraftDiscarded { draft } => self.discard_category_draft(draft),
            MenuEvent::ItemCreated { draft, item } => self.promote_item(draft, item),
            MenuEvent::ItemChanged { item, .. } => self.upsert_item(item),
            MenuEvent::ItemDeleted { id } => self.remove_item(id),
            MenuEvent::ItemDraftDiscarded { draft } => self.discard_item_draft(draft),
        }
    }

    /// Replaces a dish draft with its saved item, keeping its position when it stays in the same bucket.
    fn promote_item(&mut self, draft: DraftId, item: MenuItem) -> bool {
        let Some((bucket, pos)) = self.locate_draft(draft) else {
            return self.upsert_item(item);
        };
        let target_category = item
            .category_id
            .filter(|id| self.category(CategoryKey::Persisted(*id)).is_some());

        if self.category_index(target_category) == bucket && self.locate_item(item.id).is_none() {
            let mut item = item;
            item.category_id = target_category;
            self.bucket_at_mut(bucket)[pos] = ItemSlot::Saved(item);
        } else {
            self.bucket_at_mut(bucket).remove(pos);
            self.upsert_item(item);
        }
        true
    }

    fn issue_draft_id(&mut self) -> DraftId {
        self.next_draft += 1;
        DraftId(self.next_draft)
    }

    fn category_index(&self, id: Option<CategoryId>) -> Option<usize> {
        let id = id?;
        self.categories
            .iter()
            .position(|c| c.key == CategoryKey::Persisted(id))
    }

    fn bucket_mut(&mut self, category_id: Option<CategoryId>) -> &mut Vec<ItemSlot> {
        let index = self.category_index(category_id);
        self.bucket_at_mut(index)
    }

    fn bucket_at_mut(&mut self, index: Option<usize>) -> &mut Vec<ItemSlot> {
        match index {
            Some(i) => &mut self.categories[i].items,
            None => &mut self.uncategorized,
        }
    }

    fn find_slot(&self, pred: impl Fn(&ItemSlot) -> bool) -> Option<SlotPos> {
        for (ci, category) in self.categories.iter().enumerate() {
            if let Some(pos) = category.items.iter().position(&pred) {
                return Some((Some(ci), pos));
            }
        }
        self.uncategorized
            .iter()
            .position(&pred)
            .map(|pos| (None, pos))
    }

    fn locate_item(&self, id: ItemId) -> Option<SlotPos> {
        self.find_slot(|slot| slot.saved().is_some_and(|i| i.id == id))
    }

    fn locate_draft(&self, draft: DraftId) -> Option<SlotPos> {
        self.find_slot(|slot| matches!(slot, ItemSlot::Draft(d) if d.draft == draft))
    }
}
