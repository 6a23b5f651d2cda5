//! Membership changes for a chef's featured dishes.
//!
//! The server stores the featured set as one list per chef, so adding or
//! removing a dish is a read-modify-write: fetch the list, edit it, post the
//! whole list back. When the server hands out a version token it is echoed
//! on the write and a concurrent change is rejected instead of overwritten.

use crate::api::MenuApi;
use crate::error::MenuError;
use crate::models::{ChefId, ItemId};

/// Computes the list to post back when toggling `item`.
///
/// Removing drops every occurrence; adding appends only when absent.
pub fn next_featured_ids(current: &[ItemId], item: ItemId, currently_featured: bool) -> Vec<ItemId> {
    let mut ids: Vec<ItemId> = current.to_vec();
    if currently_featured {
        ids.retain(|id| *id != item);
    } else if !ids.contains(&item) {
        ids.push(item);
    }
    ids
}

/// Toggles `item` in the featured list and returns its new flag.
///
/// Nothing is written when the read fails.
pub async fn toggle_featured(
    api: &dyn MenuApi,
    chef: ChefId,
    item: ItemId,
    currently_featured: bool,
) -> Result<bool, MenuError> {
    let snapshot = api.featured(chef).await?;
    let ids = next_featured_ids(&snapshot.ids, item, currently_featured);
    tracing::debug!(
        chef = %chef,
        item = %item,
        count = ids.len(),
        version = ?snapshot.version,
        "Writing featured list"
    );
    api.set_featured(chef, &ids, snapshot.version).await?;
    Ok(!currently_featured)
}
