//! Per-entity controllers that turn user intents into remote calls and
//! [`MenuEvent`](crate::MenuEvent)s.
//!
//! A controller owns a snapshot of its entity plus an explicit phase. Its
//! operations take `&mut self`, so a second save/delete/toggle on the same
//! entity cannot start while one is in flight. The tree itself is only
//! touched by the caller, through the events the controllers return.

mod category;
mod item;

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::MenuApi;
use crate::error::MenuError;
use crate::models::ChefId;

pub use category::{CategoryController, CategoryPhase};
pub use item::{ItemController, ItemOp, ItemPhase, UploadPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-visible acknowledgement of an operation's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: &'static str,
    pub message: String,
}

impl Notice {
    pub fn success(title: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title,
            message: message.into(),
        }
    }

    pub fn error(title: &'static str, err: &MenuError) -> Self {
        Self {
            level: NoticeLevel::Error,
            title,
            message: err.user_message(),
        }
    }
}

/// Shows notices to the user (a modal, a toast, a line on stderr...).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Asks the user to confirm an irreversible action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl Confirm for bool {
    fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}

/// Everything a controller needs to talk to the outside world for one chef's menu screen.
#[derive(Clone)]
pub struct MenuContext {
    chef_id: ChefId,
    api: Arc<dyn MenuApi>,
    notifier: Arc<dyn Notifier>,
    cancel: CancellationToken,
}

impl MenuContext {
    pub fn new(chef_id: ChefId, api: Arc<dyn MenuApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            chef_id,
            api,
            notifier,
            cancel: CancellationToken::new(),
        }
    }

    pub fn chef_id(&self) -> ChefId {
        self.chef_id
    }

    pub fn api(&self) -> &dyn MenuApi {
        self.api.as_ref()
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Cancels every request still in flight for this screen.
    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Runs one remote call under a fresh child of the screen's cancellation token.
    pub async fn request<T, F>(&self, call: F) -> Result<T, MenuError>
    where
        F: Future<Output = Result<T, MenuError>>,
    {
        let token = self.cancel.child_token();
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(MenuError::Cancelled),
            result = call => result,
        }
    }

    /// Reports a failure to the user. Cancellations stay silent since nobody is watching.
    pub(crate) fn report(&self, title: &'static str, err: &MenuError) {
        if matches!(err, MenuError::Cancelled) {
            tracing::debug!("{} dropped after teardown", title);
            return;
        }
        tracing::warn!("{}: {}", title, err);
        self.notify(Notice::error(title, err));
    }
}

/// Holds a phase slot in its busy value and restores `fallback` unless settled.
///
/// This clears the busy phase on every exit path, including an early `?`
/// return and the operation future being dropped mid-flight.
pub(crate) struct BusyGuard<'a, P> {
    slot: &'a mut P,
    fallback: Option<P>,
}

impl<'a, P> BusyGuard<'a, P> {
    pub(crate) fn enter(slot: &'a mut P, busy: P, fallback: P) -> Self {
        *slot = busy;
        Self {
            slot,
            fallback: Some(fallback),
        }
    }

    /// Leaves the busy phase for `next` instead of the fallback.
    pub(crate) fn settle(mut self, next: P) {
        self.fallback = None;
        *self.slot = next;
    }
}

impl<P> Drop for BusyGuard<'_, P> {
    fn drop(&mut self) {
        if let Some(fallback) = self.fallback.take() {
            *self.slot = fallback;
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    impl RecordingNotifier {
        pub fn notices(&self) -> Vec<Notice> {
            self.notices.lock().unwrap().clone()
        }

        pub fn errors(&self) -> Vec<Notice> {
            self.notices()
                .into_iter()
                .filter(|n| n.level == NoticeLevel::Error)
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }
    }

    pub(crate) fn context(
        api: Arc<dyn MenuApi>,
    ) -> (MenuContext, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = MenuContext::new(ChefId(1), api, notifier.clone());
        (ctx, notifier)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::context;
    use super::*;
    use crate::api::fake::FakeMenuApi;

    #[test]
    fn test_busy_guard_restores_on_drop() {
        let mut phase = "viewing";
        {
            let _guard = BusyGuard::enter(&mut phase, "saving", "editing");
        }
        assert_eq!(phase, "editing");
    }

    #[test]
    fn test_busy_guard_settle() {
        let mut phase = "viewing";
        let guard = BusyGuard::enter(&mut phase, "saving", "editing");
        guard.settle("viewing");
        assert_eq!(phase, "viewing");
    }

    #[tokio::test]
    async fn test_request_after_teardown_is_cancelled() {
        let api = Arc::new(FakeMenuApi::new());
        let (ctx, _) = context(api.clone());
        ctx.teardown();

        let result = ctx.request(ctx.api().delete_item(crate::ItemId(1))).await;
        assert_eq!(result, Err(MenuError::Cancelled));
        assert!(ctx.is_torn_down());
    }

    #[tokio::test]
    async fn test_report_skips_cancellations() {
        let api = Arc::new(FakeMenuApi::new());
        let (ctx, notifier) = context(api);
        ctx.report("Delete failed", &MenuError::Cancelled);
        ctx.report("Delete failed", &MenuError::Transport("down".into()));
        assert_eq!(notifier.errors().len(), 1);
    }
}
