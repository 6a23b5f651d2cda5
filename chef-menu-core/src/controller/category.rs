use crate::error::MenuError;
use crate::menu::MenuEvent;
use crate::models::{normalize_category_name, Category, CategoryKey, DraftId};

use super::{BusyGuard, Confirm, MenuContext, Notice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryPhase {
    Viewing,
    Editing { buffer: String },
    Saving { buffer: String },
    Deleting,
}

/// Drives create/rename/delete for a single category.
///
/// A controller for a draft category starts in `Editing`; its first
/// successful submit promotes it to a persisted category.
#[derive(Debug, Clone)]
pub struct CategoryController {
    key: CategoryKey,
    name: String,
    phase: CategoryPhase,
}

impl CategoryController {
    pub fn new(category: &Category) -> Self {
        let phase = if category.is_draft() {
            CategoryPhase::Editing {
                buffer: category.name.clone(),
            }
        } else {
            CategoryPhase::Viewing
        };
        Self {
            key: category.key,
            name: category.name.clone(),
            phase,
        }
    }

    pub fn for_draft(draft: DraftId) -> Self {
        Self::new(&Category::draft(draft))
    }

    pub fn key(&self) -> CategoryKey {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> &CategoryPhase {
        &self.phase
    }

    pub fn is_draft(&self) -> bool {
        matches!(self.key, CategoryKey::Draft(_))
    }

    /// Enters edit mode with the current name. Returns false if not viewing.
    pub fn begin_edit(&mut self) -> bool {
        if self.phase != CategoryPhase::Viewing {
            return false;
        }
        self.phase = CategoryPhase::Editing {
            buffer: self.name.clone(),
        };
        true
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        if let CategoryPhase::Editing { buffer } = &mut self.phase {
            *buffer = text.into();
        }
    }

    /// Edits the name to `input` and submits it.
    pub async fn rename(
        &mut self,
        ctx: &MenuContext,
        input: &str,
    ) -> Result<Option<MenuEvent>, MenuError> {
        self.begin_edit();
        self.set_input(input);
        self.submit(ctx).await
    }

    /// Submits the edit buffer: creates a draft or renames a saved category.
    pub async fn submit(&mut self, ctx: &MenuContext) -> Result<Option<MenuEvent>, MenuError> {
        let CategoryPhase::Editing { buffer } = &self.phase else {
            return Ok(None);
        };
        let buffer = buffer.clone();

        match self.key {
            CategoryKey::Draft(draft) => {
                let name = match normalize_category_name(&buffer) {
                    Ok(name) => name,
                    Err(e) => {
                        let err = MenuError::from(e);
                        ctx.report("Invalid category", &err);
                        return Err(err);
                    }
                };

                let guard = BusyGuard::enter(
                    &mut self.phase,
                    CategoryPhase::Saving {
                        buffer: buffer.clone(),
                    },
                    CategoryPhase::Editing { buffer },
                );
                match ctx
                    .request(ctx.api().create_category(ctx.chef_id(), &name))
                    .await
                {
                    Ok(id) => {
                        guard.settle(CategoryPhase::Viewing);
                        tracing::info!(category = %id, name = %name, "Category created");
                        self.key = CategoryKey::Persisted(id);
                        self.name = name.clone();
                        ctx.notify(Notice::success(
                            "Category created",
                            format!("'{}' was added to your menu.", name),
                        ));
                        Ok(Some(MenuEvent::CategoryCreated { draft, id, name }))
                    }
                    Err(e) => {
                        drop(guard);
                        ctx.report("Could not create category", &e);
                        Err(e)
                    }
                }
            }
            CategoryKey::Persisted(id) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() || trimmed == self.name {
                    self.phase = CategoryPhase::Viewing;
                    return Ok(None);
                }
                let name = match normalize_category_name(trimmed) {
                    Ok(name) => name,
                    Err(e) => {
                        let err = MenuError::from(e);
                        ctx.report("Invalid category", &err);
                        return Err(err);
                    }
                };

                let guard = BusyGuard::enter(
                    &mut self.phase,
                    CategoryPhase::Saving { buffer },
                    CategoryPhase::Viewing,
                );
                let result = ctx.request(ctx.api().rename_category(id, &name)).await;
                guard.settle(CategoryPhase::Viewing);

                match result {
                    Ok(()) => {
                        tracing::info!(category = %id, name = %name, "Category renamed");
                        self.name = name.clone();
                        ctx.notify(Notice::success(
                            "Category updated",
                            format!("Renamed to '{}'.", name),
                        ));
                        Ok(Some(MenuEvent::CategoryRenamed { id, name }))
                    }
                    Err(e) => {
                        ctx.report("Could not rename category", &e);
                        Err(e)
                    }
                }
            }
        }
    }

    /// Abandons the edit. For a draft this removes it from the menu.
    pub fn cancel(&mut self) -> Option<MenuEvent> {
        self.phase = CategoryPhase::Viewing;
        match self.key {
            CategoryKey::Draft(draft) => Some(MenuEvent::CategoryDraftDiscarded { draft }),
            CategoryKey::Persisted(_) => None,
        }
    }

    /// Deletes the category after confirmation. Its dishes are kept, uncategorized.
    pub async fn delete(
        &mut self,
        ctx: &MenuContext,
        confirm: &dyn Confirm,
    ) -> Result<Option<MenuEvent>, MenuError> {
        let id = match self.key {
            CategoryKey::Draft(_) => return Ok(self.cancel()),
            CategoryKey::Persisted(id) => id,
        };

        let prompt = format!(
            "Delete category '{}'? Its dishes will be kept as uncategorized.",
            self.name
        );
        if !confirm.confirm(&prompt) {
            return Ok(None);
        }

        let guard = BusyGuard::enter(
            &mut self.phase,
            CategoryPhase::Deleting,
            CategoryPhase::Viewing,
        );
        match ctx.request(ctx.api().delete_category(id)).await {
            Ok(()) => {
                guard.settle(CategoryPhase::Viewing);
                tracing::info!(category = %id, "Category deleted");
                ctx.notify(Notice::success(
                    "Category deleted",
                    format!("'{}' was removed.", self.name),
                ));
                Ok(Some(MenuEvent::CategoryDeleted { id }))
            }
            Err(e) => {
                drop(guard);
                ctx.report("Could not delete category", &e);
                Err(e)
            }
        }
    }
}
