pub mod memory;

use crate::errors::AppResult;
use crate::models::{NodeId, OutlineNode};
use rand::Rng;

const UID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-_";
const UID_LENGTH: usize = 9;

/// Text predicate applied to the direct children of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildFilter {
    StartsWith(String),
    Contains(String),
    All,
}

impl ChildFilter {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::StartsWith(prefix) => text.starts_with(prefix.as_str()),
            Self::Contains(needle) => text.contains(needle.as_str()),
            Self::All => true,
        }
    }
}

/// The host document store. Writes are not transactional and a query issued
/// right after a create may not observe it yet.
#[async_trait::async_trait]
pub trait HostStore: Send + Sync {
    async fn find_page_by_title(&self, title: &str) -> AppResult<Option<NodeId>>;

    async fn create_page(&self, id: &NodeId, title: &str) -> AppResult<()>;

    /// Direct children of `parent` matching `filter`, in store order.
    async fn query_children(&self, parent: &NodeId, filter: &ChildFilter) -> AppResult<Vec<OutlineNode>>;

    async fn create_child(&self, parent: &NodeId, id: &NodeId, text: &str, index: usize) -> AppResult<()>;

    fn generate_id(&self) -> NodeId;

    async fn current_user_display_name(&self) -> AppResult<Option<String>> {
        Ok(None)
    }
}

/// Nine-character block uid in the host's alphabet.
pub fn generate_uid() -> NodeId {
    let mut rng = rand::thread_rng();
    (0..UID_LENGTH)
        .map(|_| UID_ALPHABET[rng.gen_range(0..UID_ALPHABET.len())] as char)
        .collect()
}
