use crate::errors::AppResult;
use crate::models::{NavigationMode, NodeId};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Navigation hooks offered by the host application.
#[async_trait::async_trait]
pub trait HostUi: Send + Sync {
    /// Opens `page_id` in the sidebar with the cursor in `entry_id`.
    async fn open_in_sidebar(&self, page_id: &NodeId, entry_id: &NodeId) -> AppResult<()>;

    /// Zooms the main window into `entry_id`.
    async fn open_focused(&self, entry_id: &NodeId) -> AppResult<()>;
}

/// Host without a UI; focus requests succeed without doing anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessUi;

#[async_trait::async_trait]
impl HostUi for HeadlessUi {
    async fn open_in_sidebar(&self, _page_id: &NodeId, _entry_id: &NodeId) -> AppResult<()> {
        Ok(())
    }

    async fn open_focused(&self, _entry_id: &NodeId) -> AppResult<()> {
        Ok(())
    }
}

/// Asks the host to show a freshly created entry. Runs detached after
/// `delay`; failures are logged and never reach the caller.
pub fn request_focus(
    ui: Arc<dyn HostUi>,
    mode: NavigationMode,
    page_id: NodeId,
    entry_id: NodeId,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let result = match mode {
            NavigationMode::Focus => ui.open_focused(&entry_id).await,
            NavigationMode::Sidebar | NavigationMode::Ask => ui.open_in_sidebar(&page_id, &entry_id).await,
        };
        match result {
            Ok(()) => tracing::debug!(entry_id = %entry_id, mode = mode.as_str(), "focused new entry"),
            Err(error) => {
                tracing::warn!(entry_id = %entry_id, mode = mode.as_str(), error = %error, "focus request failed")
            }
        }
    })
}
