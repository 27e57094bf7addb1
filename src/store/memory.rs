use super::{generate_uid, ChildFilter, HostStore};
use crate::errors::{AppError, AppResult};
use crate::models::{NodeId, OutlineNode};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
struct StoredNode {
    text: String,
    children: Vec<NodeId>,
    /// First query tick at which the node shows up in child queries.
    visible_from: Option<u64>,
}

#[derive(Debug, Default)]
struct MemoryState {
    nodes: HashMap<NodeId, StoredNode>,
    pages: HashMap<String, NodeId>,
    query_tick: u64,
    visibility_lag: u64,
    hide_new_children: bool,
    failing_queries: u32,
    failing_creates: u32,
    create_calls: u32,
    display_name: Option<String>,
}

/// In-process outline store with knobs for the failure modes of a remote
/// host: delayed visibility of writes, writes that never surface, and
/// failing calls.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Children created through the store stay hidden from the next `queries`
    /// child queries.
    pub fn with_visibility_lag(self, queries: u64) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.visibility_lag = queries;
        }
        self
    }

    /// Children created through the store never show up in queries until
    /// [`MemoryStore::reveal_all`] is called.
    pub fn with_hidden_writes(self) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.hide_new_children = true;
        }
        self
    }

    pub fn with_display_name(self, name: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.display_name = Some(name.to_string());
        }
        self
    }

    pub fn fail_next_queries(&self, count: u32) -> AppResult<()> {
        self.lock()?.failing_queries = count;
        Ok(())
    }

    pub fn fail_next_creates(&self, count: u32) -> AppResult<()> {
        self.lock()?.failing_creates = count;
        Ok(())
    }

    /// Makes every hidden node visible and stops hiding new ones.
    pub fn reveal_all(&self) -> AppResult<()> {
        let mut state = self.lock()?;
        let tick = state.query_tick;
        state.hide_new_children = false;
        state.visibility_lag = 0;
        for node in state.nodes.values_mut() {
            node.visible_from = Some(node.visible_from.map_or(tick, |from| from.min(tick)));
        }
        Ok(())
    }

    /// Adds a page directly, bypassing fault injection.
    pub fn insert_page(&self, title: &str) -> AppResult<NodeId> {
        let mut state = self.lock()?;
        if let Some(existing) = state.pages.get(title) {
            return Ok(existing.clone());
        }
        let id = generate_uid();
        state.nodes.insert(
            id.clone(),
            StoredNode {
                text: title.to_string(),
                children: Vec::new(),
                visible_from: Some(0),
            },
        );
        state.pages.insert(title.to_string(), id.clone());
        Ok(id)
    }

    /// Appends an immediately visible child, bypassing fault injection.
    pub fn insert_child(&self, parent: &NodeId, text: &str) -> AppResult<NodeId> {
        let mut state = self.lock()?;
        let id = generate_uid();
        let Some(parent_node) = state.nodes.get_mut(parent) else {
            return Err(AppError::Store(format!("unknown parent {}", parent)));
        };
        parent_node.children.push(id.clone());
        state.nodes.insert(
            id.clone(),
            StoredNode {
                text: text.to_string(),
                children: Vec::new(),
                visible_from: Some(0),
            },
        );
        Ok(id)
    }

    /// All children in order, including ones not yet visible to queries.
    pub fn children(&self, parent: &NodeId) -> AppResult<Vec<OutlineNode>> {
        let state = self.lock()?;
        let Some(parent_node) = state.nodes.get(parent) else {
            return Ok(Vec::new());
        };
        Ok(parent_node
            .children
            .iter()
            .filter_map(|id| {
                state.nodes.get(id).map(|node| OutlineNode {
                    id: id.clone(),
                    text: node.text.clone(),
                })
            })
            .collect())
    }

    pub fn text_of(&self, id: &NodeId) -> AppResult<Option<String>> {
        Ok(self.lock()?.nodes.get(id).map(|node| node.text.clone()))
    }

    /// Number of child and page creations attempted through the trait.
    pub fn create_calls(&self) -> AppResult<u32> {
        Ok(self.lock()?.create_calls)
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("memory store mutex poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl HostStore for MemoryStore {
    async fn find_page_by_title(&self, title: &str) -> AppResult<Option<NodeId>> {
        Ok(self.lock()?.pages.get(title).cloned())
    }

    async fn create_page(&self, id: &NodeId, title: &str) -> AppResult<()> {
        let mut state = self.lock()?;
        state.create_calls += 1;
        if state.pages.contains_key(title) {
            return Err(AppError::Store(format!("page {:?} already exists", title)));
        }
        state.nodes.insert(
            id.clone(),
            StoredNode {
                text: title.to_string(),
                children: Vec::new(),
                visible_from: Some(0),
            },
        );
        state.pages.insert(title.to_string(), id.clone());
        Ok(())
    }

    async fn query_children(&self, parent: &NodeId, filter: &ChildFilter) -> AppResult<Vec<OutlineNode>> {
        let mut state = self.lock()?;
        state.query_tick += 1;
        if state.failing_queries > 0 {
            state.failing_queries -= 1;
            return Err(AppError::Store("query unavailable".to_string()));
        }

        let tick = state.query_tick;
        let Some(parent_node) = state.nodes.get(parent) else {
            return Ok(Vec::new());
        };
        Ok(parent_node
            .children
            .iter()
            .filter_map(|id| state.nodes.get(id).map(|node| (id, node)))
            .filter(|(_, node)| node.visible_from.map_or(false, |from| tick >= from))
            .filter(|(_, node)| filter.matches(&node.text))
            .map(|(id, node)| OutlineNode {
                id: id.clone(),
                text: node.text.clone(),
            })
            .collect())
    }

    async fn create_child(&self, parent: &NodeId, id: &NodeId, text: &str, index: usize) -> AppResult<()> {
        let mut state = self.lock()?;
        state.create_calls += 1;
        if state.failing_creates > 0 {
            state.failing_creates -= 1;
            return Err(AppError::Store("write rejected".to_string()));
        }

        let visible_from = if state.hide_new_children {
            None
        } else {
            Some(state.query_tick + state.visibility_lag + 1)
        };
        let Some(parent_node) = state.nodes.get_mut(parent) else {
            return Err(AppError::Store(format!("unknown parent {}", parent)));
        };
        let index = index.min(parent_node.children.len());
        parent_node.children.insert(index, id.clone());
        state.nodes.insert(
            id.clone(),
            StoredNode {
                text: text.to_string(),
                children: Vec::new(),
                visible_from,
            },
        );
        Ok(())
    }

    fn generate_id(&self) -> NodeId {
        generate_uid()
    }

    async fn current_user_display_name(&self) -> AppResult<Option<String>> {
        Ok(self.lock()?.display_name.clone())
    }
}
