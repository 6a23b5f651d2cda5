use crate::api::ItemPayload;
use crate::error::MenuError;
use crate::featured;
use crate::menu::{ItemChange, MenuEvent};
use crate::models::{CategoryId, DraftId, ItemDraft, ItemForm, MenuItem};
use crate::picker::ImagePicker;

use super::{BusyGuard, Confirm, MenuContext, Notice};

/// Single-request operations that mark a saved item busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOp {
    Availability,
    Featured,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemPhase {
    Viewing,
    Editing { form: ItemForm },
    Saving { form: ItemForm },
    Busy(ItemOp),
}

/// Photo uploads run on their own axis so they can overlap an open edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Uploading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Subject {
    Saved(MenuItem),
    Draft {
        draft: DraftId,
        category_id: Option<CategoryId>,
    },
}

/// Drives the lifecycle of one dish.
#[derive(Debug, Clone)]
pub struct ItemController {
    subject: Subject,
    phase: ItemPhase,
    upload: UploadPhase,
}

impl ItemController {
    pub fn new(item: MenuItem) -> Self {
        Self {
            subject: Subject::Saved(item),
            phase: ItemPhase::Viewing,
            upload: UploadPhase::Idle,
        }
    }

    /// Opens a draft dish straight into its edit form.
    pub fn for_draft(draft: &ItemDraft) -> Self {
        Self {
            subject: Subject::Draft {
                draft: draft.draft,
                category_id: draft.category_id,
            },
            phase: ItemPhase::Editing {
                form: draft.form.clone(),
            },
            upload: UploadPhase::Idle,
        }
    }

    pub fn item(&self) -> Option<&MenuItem> {
        match &self.subject {
            Subject::Saved(item) => Some(item),
            Subject::Draft { .. } => None,
        }
    }

    pub fn draft_id(&self) -> Option<DraftId> {
        match &self.subject {
            Subject::Draft { draft, .. } => Some(*draft),
            Subject::Saved(_) => None,
        }
    }

    pub fn is_draft(&self) -> bool {
        self.draft_id().is_some()
    }

    pub fn phase(&self) -> &ItemPhase {
        &self.phase
    }

    pub fn upload(&self) -> UploadPhase {
        self.upload
    }

    pub fn form(&self) -> Option<&ItemForm> {
        match &self.phase {
            ItemPhase::Editing { form } => Some(form),
            _ => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut ItemForm> {
        match &mut self.phase {
            ItemPhase::Editing { form } => Some(form),
            _ => None,
        }
    }

    /// Opens the edit form for a saved item. Returns false if not viewing.
    pub fn begin_edit(&mut self) -> bool {
        let (ItemPhase::Viewing, Subject::Saved(item)) = (&self.phase, &self.subject) else {
            return false;
        };
        self.phase = ItemPhase::Editing {
            form: item.to_form(),
        };
        true
    }

    /// Follows a change made to the tree by another controller.
    ///
    /// A deleted category leaves its dishes and drafts uncategorized, so a
    /// later save must not name it.
    pub fn observe(&mut self, event: &MenuEvent) {
        let MenuEvent::CategoryDeleted { id } = event else {
            return;
        };
        match &mut self.subject {
            Subject::Draft { category_id, .. } if *category_id == Some(*id) => {
                *category_id = None;
            }
            Subject::Saved(item) if item.category_id == Some(*id) => {
                item.category_id = None;
            }
            _ => {}
        }
    }

    /// Validates the form and creates or updates the dish.
    ///
    /// On success the item is replaced wholesale; on failure it is untouched
    /// and the form stays open.
    pub async fn save(&mut self, ctx: &MenuContext) -> Result<Option<MenuEvent>, MenuError> {
        let ItemPhase::Editing { form } = &self.phase else {
            return Ok(None);
        };
        let form = form.clone();
        let fields = match form.validate() {
            Ok(fields) => fields,
            Err(e) => {
                let err = MenuError::from(e);
                ctx.report("Please check the dish", &err);
                return Err(err);
            }
        };

        let guard = BusyGuard::enter(
            &mut self.phase,
            ItemPhase::Saving { form: form.clone() },
            ItemPhase::Editing { form },
        );

        match self.subject.clone() {
            Subject::Draft { draft, category_id } => {
                let payload = ItemPayload::from_fields(&fields, category_id);
                match ctx
                    .request(ctx.api().create_item(ctx.chef_id(), &payload))
                    .await
                {
                    Ok(id) => {
                        guard.settle(ItemPhase::Viewing);
                        let item = fields.into_item(id, ctx.chef_id(), category_id);
                        tracing::info!(item = %id, name = %item.name, "Dish created");
                        self.subject = Subject::Saved(item.clone());
                        ctx.notify(Notice::success(
                            "Dish added",
                            format!("'{}' is now on your menu.", item.name),
                        ));
                        Ok(Some(MenuEvent::ItemCreated { draft, item }))
                    }
                    Err(e) => {
                        drop(guard);
                        ctx.report("Could not add dish", &e);
                        Err(e)
                    }
                }
            }
            Subject::Saved(current) => {
                let payload = ItemPayload::from_fields(&fields, None);
                match ctx.request(ctx.api().update_item(current.id, &payload)).await {
                    Ok(()) => {
                        guard.settle(ItemPhase::Viewing);
                        let item = current.merged_with(&fields);
                        tracing::info!(item = %item.id, "Dish updated");
                        self.subject = Subject::Saved(item.clone());
                        ctx.notify(Notice::success(
                            "Dish updated",
                            format!("'{}' was saved.", item.name),
                        ));
                        Ok(Some(MenuEvent::ItemChanged {
                            item,
                            change: ItemChange::Fields,
                        }))
                    }
                    Err(e) => {
                        drop(guard);
                        ctx.report("Could not update dish", &e);
                        Err(e)
                    }
                }
            }
        }
    }

    /// Discards the edit form. For a draft this removes it from the menu.
    pub fn cancel(&mut self) -> Option<MenuEvent> {
        self.phase = ItemPhase::Viewing;
        self.draft_id()
            .map(|draft| MenuEvent::ItemDraftDiscarded { draft })
    }

    /// Flips availability once the server has accepted the change. No success notice.
    pub async fn toggle_availability(
        &mut self,
        ctx: &MenuContext,
    ) -> Result<Option<MenuEvent>, MenuError> {
        let item = self.saved_for(ctx, "changing availability")?;
        let available = !item.is_available;

        let previous = self.phase.clone();
        let guard = BusyGuard::enter(
            &mut self.phase,
            ItemPhase::Busy(ItemOp::Availability),
            previous.clone(),
        );
        match ctx
            .request(ctx.api().set_availability(item.id, available))
            .await
        {
            Ok(()) => {
                let mut restored = previous;
                if let ItemPhase::Editing { form } = &mut restored {
                    form.is_available = available;
                }
                guard.settle(restored);

                tracing::info!(item = %item.id, available, "Availability changed");
                let item = MenuItem {
                    is_available: available,
                    ..item
                };
                self.subject = Subject::Saved(item.clone());
                Ok(Some(MenuEvent::ItemChanged {
                    item,
                    change: ItemChange::Availability,
                }))
            }
            Err(e) => {
                drop(guard);
                ctx.report("Could not change availability", &e);
                Err(e)
            }
        }
    }

    /// Adds the dish to, or removes it from, the chef's featured list.
    pub async fn toggle_featured(
        &mut self,
        ctx: &MenuContext,
    ) -> Result<Option<MenuEvent>, MenuError> {
        let item = self.saved_for(ctx, "featuring it")?;

        let previous = self.phase.clone();
        let guard = BusyGuard::enter(
            &mut self.phase,
            ItemPhase::Busy(ItemOp::Featured),
            previous.clone(),
        );
        let toggle = featured::toggle_featured(ctx.api(), ctx.chef_id(), item.id, item.is_featured);
        match ctx.request(toggle).await {
            Ok(is_featured) => {
                guard.settle(previous);
                tracing::info!(item = %item.id, is_featured, "Featured flag changed");
                let item = MenuItem {
                    is_featured,
                    ..item
                };
                self.subject = Subject::Saved(item.clone());
                let message = if is_featured {
                    format!("'{}' is now featured.", item.name)
                } else {
                    format!("'{}' is no longer featured.", item.name)
                };
                ctx.notify(Notice::success("Featured dishes updated", message));
                Ok(Some(MenuEvent::ItemChanged {
                    item,
                    change: ItemChange::Featured,
                }))
            }
            Err(e) => {
                drop(guard);
                ctx.report("Could not update featured dishes", &e);
                Err(e)
            }
        }
    }

    /// Deletes the dish after confirmation. Deleting a draft just discards it.
    pub async fn delete(
        &mut self,
        ctx: &MenuContext,
        confirm: &dyn Confirm,
    ) -> Result<Option<MenuEvent>, MenuError> {
        let Subject::Saved(item) = &self.subject else {
            return Ok(self.cancel());
        };
        let (id, name) = (item.id, item.name.clone());

        if !confirm.confirm(&format!("Delete '{}'? This cannot be undone.", name)) {
            return Ok(None);
        }

        let previous = self.phase.clone();
        let guard = BusyGuard::enter(&mut self.phase, ItemPhase::Busy(ItemOp::Delete), previous);
        match ctx.request(ctx.api().delete_item(id)).await {
            Ok(()) => {
                guard.settle(ItemPhase::Viewing);
                tracing::info!(item = %id, "Dish deleted");
                ctx.notify(Notice::success(
                    "Dish deleted",
                    format!("'{}' was removed from your menu.", name),
                ));
                Ok(Some(MenuEvent::ItemDeleted { id }))
            }
            Err(e) => {
                drop(guard);
                ctx.report("Could not delete dish", &e);
                Err(e)
            }
        }
    }

    /// Lets the user pick an image and uploads it as the dish photo.
    ///
    /// The new URL lands on both the saved item and any open form, so
    /// cancelling the form afterwards keeps the photo.
    pub async fn pick_and_upload_image(
        &mut self,
        ctx: &MenuContext,
        picker: &dyn ImagePicker,
    ) -> Result<Option<MenuEvent>, MenuError> {
        let item = self.saved_for(ctx, "adding a photo")?;

        let image = match picker.pick().await {
            Ok(Some(image)) => image,
            Ok(None) => return Ok(None),
            Err(e) => {
                ctx.report("Could not add photo", &e);
                return Err(e);
            }
        };

        let guard = BusyGuard::enter(&mut self.upload, UploadPhase::Uploading, UploadPhase::Idle);
        let result = ctx
            .request(ctx.api().upload_photo(item.id, image))
            .await;
        guard.settle(UploadPhase::Idle);

        match result {
            Ok(url) => {
                tracing::info!(item = %item.id, url = %url, "Photo uploaded");
                if let ItemPhase::Editing { form } | ItemPhase::Saving { form } = &mut self.phase {
                    form.photo_url = Some(url.clone());
                }
                let item = MenuItem {
                    photo_url: Some(url),
                    ..item
                };
                self.subject = Subject::Saved(item.clone());
                ctx.notify(Notice::success("Photo updated", "Your dish photo was uploaded."));
                Ok(Some(MenuEvent::ItemChanged {
                    item,
                    change: ItemChange::Photo,
                }))
            }
            Err(e) => {
                ctx.report("Could not upload photo", &e);
                Err(e)
            }
        }
    }

    /// Returns a copy of the saved item, or reports that the draft must be saved first.
    fn saved_for(&self, ctx: &MenuContext, action: &'static str) -> Result<MenuItem, MenuError> {
        match &self.subject {
            Subject::Saved(item) => Ok(item.clone()),
            Subject::Draft { .. } => {
                let err = MenuError::NotSaved(action);
                ctx.report("Save the dish first", &err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::api::fake::FakeMenuApi;
    use crate::controller::testing::context;
    use crate::menu::MenuTree;
    use crate::models::{ChefId, ItemId, Price, PriceError, ValidationError};
    use crate::picker::PickedImage;

    fn cake() -> MenuItem {
        MenuItem::new(ItemId(42), ChefId(1), "Cake", Price::parse("12").unwrap())
            .with_category(CategoryId(7))
    }

    fn api_with(item: MenuItem) -> Arc<FakeMenuApi> {
        Arc::new(FakeMenuApi::with_state(|s| s.items.push(item)))
    }

    struct FixedPicker(Option<PickedImage>);

    #[async_trait]
    impl ImagePicker for FixedPicker {
        async fn pick(&self) -> Result<Option<PickedImage>, MenuError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_save_without_name_or_price_skips_network() {
        let api = Arc::new(FakeMenuApi::new());
        let (ctx, notifier) = context(api.clone());
        let mut tree = MenuTree::new(ChefId(1));
        let draft = tree.add_item_draft(None).unwrap();
        let mut controller = ItemController::for_draft(tree.item_draft(draft).unwrap());

        controller.form_mut().unwrap().price = "5".to_string();
        let err = controller.save(&ctx).await.unwrap_err();
        assert_eq!(err, MenuError::Validation(ValidationError::MissingName));

        let form = controller.form_mut().unwrap();
        form.name = "Cake".to_string();
        form.price = "  ".to_string();
        let err = controller.save(&ctx).await.unwrap_err();
        assert_eq!(
            err,
            MenuError::Validation(ValidationError::Price(PriceError::Missing))
        );

        assert!(api.calls().is_empty());
        assert_eq!(notifier.errors().len(), 2);
        assert!(matches!(controller.phase(), ItemPhase::Editing { .. }));
    }

    #[tokio::test]
    async fn test_draft_save_submits_canonical_price_and_promotes() {
        let api = Arc::new(FakeMenuApi::new());
        let (ctx, _) = context(api.clone());
        let mut tree = MenuTree::new(ChefId(1));
        let draft = tree.add_item_draft(None).unwrap();
        let mut controller = ItemController::for_draft(tree.item_draft(draft).unwrap());

        let form = controller.form_mut().unwrap();
        form.name = "Cake".to_string();
        form.price = "5.999".to_string();
        let event = controller.save(&ctx).await.unwrap().unwrap();

        let body = api.calls()[0].body.clone().unwrap();
        assert_eq!(body["price"], "6.00");
        assert_eq!(body["dish_name"], "Cake");
        assert!(!controller.is_draft());
        assert_eq!(controller.phase(), &ItemPhase::Viewing);

        tree.apply(event);
        assert!(tree.item_draft(draft).is_none());
        let saved = tree.item(controller.item().unwrap().id).unwrap();
        assert_eq!(saved.price.to_string(), "6.00");
    }

    #[tokio::test]
    async fn test_draft_follows_category_delete() {
        let api = Arc::new(FakeMenuApi::new());
        let (ctx, _) = context(api.clone());
        let mut tree = MenuTree::new(ChefId(1));
        tree.apply(MenuEvent::CategoryRenamed {
            id: CategoryId(7),
            name: "Desserts".to_string(),
        });
        let draft = tree.add_item_draft(Some(CategoryId(7))).unwrap();
        let mut controller = ItemController::for_draft(tree.item_draft(draft).unwrap());
        let mut saved = ItemController::new(cake());

        let deleted = MenuEvent::CategoryDeleted { id: CategoryId(7) };
        controller.observe(&deleted);
        saved.observe(&deleted);
        tree.apply(deleted);
        assert_eq!(tree.item_draft(draft).unwrap().category_id, None);
        assert_eq!(saved.item().unwrap().category_id, None);

        let form = controller.form_mut().unwrap();
        form.name = "Flan".to_string();
        form.price = "6".to_string();
        let event = controller.save(&ctx).await.unwrap().unwrap();

        let body = api.calls()[0].body.clone().unwrap();
        assert!(body["category_id"].is_null());
        assert_eq!(controller.item().unwrap().category_id, None);
        tree.apply(event);
        assert!(tree.item_draft(draft).is_none());
        assert_eq!(tree.uncategorized().len(), 1);
    }

    #[test]
    fn test_other_category_delete_is_ignored() {
        let mut controller = ItemController::new(cake());
        controller.observe(&MenuEvent::CategoryDeleted { id: CategoryId(8) });
        controller.observe(&MenuEvent::ItemDeleted { id: ItemId(1) });
        assert_eq!(controller.item(), Some(&cake()));
    }

    #[tokio::test]
    async fn test_failed_update_leaves_item_identical() {
        let original = cake();
        let api = api_with(original.clone());
        let (ctx, notifier) = context(api.clone());
        let mut controller = ItemController::new(original.clone());

        controller.begin_edit();
        let form = controller.form_mut().unwrap();
        form.name = "Chocolate Cake".to_string();
        form.price = "15".to_string();
        api.fail_next(MenuError::application(
            Some(200),
            Some("Price change not allowed".to_string()),
        ));

        let err = controller.save(&ctx).await.unwrap_err();

        assert_eq!(err.user_message(), "Price change not allowed");
        assert_eq!(controller.item(), Some(&original));
        assert_eq!(controller.form().unwrap().name, "Chocolate Cake");
        assert_eq!(notifier.errors()[0].message, "Price change not allowed");
    }

    #[tokio::test]
    async fn test_update_replaces_item_wholesale() {
        let api = api_with(cake());
        let (ctx, _) = context(api.clone());
        let mut controller = ItemController::new(cake());

        controller.begin_edit();
        let form = controller.form_mut().unwrap();
        form.price = "14.5".to_string();
        form.servings = 8;
        let event = controller.save(&ctx).await.unwrap().unwrap();

        let MenuEvent::ItemChanged { item, change } = event else {
            panic!("expected ItemChanged");
        };
        assert_eq!(change, ItemChange::Fields);
        assert_eq!(item.price.to_string(), "14.50");
        assert_eq!(item.servings, 8);
        assert_eq!(item.category_id, Some(CategoryId(7)));
        let body = api.calls()[0].body.clone().unwrap();
        assert!(body.get("category_id").is_none());
    }

    #[tokio::test]
    async fn test_cancel_draft_is_local() {
        let api = Arc::new(FakeMenuApi::new());
        let mut tree = MenuTree::new(ChefId(1));
        let draft = tree.add_item_draft(None).unwrap();
        let mut controller = ItemController::for_draft(tree.item_draft(draft).unwrap());
        controller.form_mut().unwrap().name = "Half-typed".to_string();

        let event = controller.cancel().unwrap();
        tree.apply(event);

        assert!(tree.item_draft(draft).is_none());
        assert!(tree.uncategorized().is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_availability_flips_only_after_confirmation() {
        let api = api_with(cake());
        let (ctx, notifier) = context(api.clone());
        let mut controller = ItemController::new(cake());

        api.fail_next(MenuError::Transport("timed out".into()));
        assert!(controller.toggle_availability(&ctx).await.is_err());
        assert!(controller.item().unwrap().is_available);
        assert_eq!(controller.phase(), &ItemPhase::Viewing);

        let event = controller.toggle_availability(&ctx).await.unwrap().unwrap();
        assert!(!controller.item().unwrap().is_available);
        assert!(matches!(
            event,
            MenuEvent::ItemChanged {
                change: ItemChange::Availability,
                ..
            }
        ));
        assert_eq!(api.calls()[1].body.clone().unwrap()["is_available"], false);
        // Only the failure produced a notice.
        assert_eq!(notifier.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_availability_while_editing_updates_form() {
        let api = api_with(cake());
        let (ctx, _) = context(api.clone());
        let mut controller = ItemController::new(cake());
        controller.begin_edit();

        controller.toggle_availability(&ctx).await.unwrap();

        assert!(!controller.form().unwrap().is_available);
    }

    #[tokio::test]
    async fn test_delete_flow() {
        let api = api_with(cake());
        let (ctx, _) = context(api.clone());
        let mut controller = ItemController::new(cake());

        assert_eq!(controller.delete(&ctx, &false).await.unwrap(), None);
        assert!(api.calls().is_empty());

        let event = controller.delete(&ctx, &true).await.unwrap();
        assert_eq!(event, Some(MenuEvent::ItemDeleted { id: ItemId(42) }));
        assert_eq!(api.call_paths(), vec!["DELETE /menu/item/42"]);
    }

    #[tokio::test]
    async fn test_draft_cannot_toggle_or_upload() {
        let api = Arc::new(FakeMenuApi::new());
        let (ctx, _) = context(api.clone());
        let mut tree = MenuTree::new(ChefId(1));
        let draft = tree.add_item_draft(None).unwrap();
        let mut controller = ItemController::for_draft(tree.item_draft(draft).unwrap());

        assert!(matches!(
            controller.toggle_availability(&ctx).await,
            Err(MenuError::NotSaved(_))
        ));
        let picker = FixedPicker(Some(PickedImage::new("a.png", vec![1])));
        assert!(matches!(
            controller.pick_and_upload_image(&ctx, &picker).await,
            Err(MenuError::NotSaved(_))
        ));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upload_updates_item_and_open_form() {
        let api = api_with(cake());
        let (ctx, _) = context(api.clone());
        let mut controller = ItemController::new(cake());
        controller.begin_edit();

        let picker = FixedPicker(Some(PickedImage::new("cake.jpg", vec![0xFF, 0xD8])));
        controller
            .pick_and_upload_image(&ctx, &picker)
            .await
            .unwrap()
            .unwrap();

        let url = "https://cdn.test/42/cake.jpg".to_string();
        assert_eq!(controller.item().unwrap().photo_url, Some(url.clone()));
        assert_eq!(controller.form().unwrap().photo_url, Some(url.clone()));
        assert_eq!(controller.upload(), UploadPhase::Idle);

        controller.cancel();
        assert_eq!(controller.item().unwrap().photo_url, Some(url));
    }

    #[tokio::test]
    async fn test_upload_failure_keeps_old_photo() {
        let mut item = cake();
        item.photo_url = Some("https://cdn.test/old.jpg".to_string());
        let api = api_with(item.clone());
        let (ctx, notifier) = context(api.clone());
        let mut controller = ItemController::new(item);

        api.fail_next(MenuError::application(None, None));
        let picker = FixedPicker(Some(PickedImage::new("new.jpg", vec![1, 2])));
        assert!(controller.pick_and_upload_image(&ctx, &picker).await.is_err());

        assert_eq!(
            controller.item().unwrap().photo_url.as_deref(),
            Some("https://cdn.test/old.jpg")
        );
        assert_eq!(controller.upload(), UploadPhase::Idle);
        assert_eq!(controller.phase(), &ItemPhase::Viewing);
        assert_eq!(notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_picker_backed_out() {
        let api = api_with(cake());
        let (ctx, notifier) = context(api.clone());
        let mut controller = ItemController::new(cake());

        let result = controller
            .pick_and_upload_image(&ctx, &FixedPicker(None))
            .await
            .unwrap();

        assert_eq!(result, None);
        assert!(api.calls().is_empty());
        assert!(notifier.notices().is_empty());
    }
}
