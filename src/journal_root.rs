use crate::errors::AppResult;
use crate::models::{JournalRoot, NodeId};
use crate::store::{ChildFilter, HostStore};

pub const DEFAULT_CONTAINER_LABEL: &str = "Journal Entries:";

pub async fn get_or_create_page(store: &dyn HostStore, title: &str) -> AppResult<NodeId> {
    if let Some(existing) = store.find_page_by_title(title).await? {
        return Ok(existing);
    }

    let id = store.generate_id();
    store.create_page(&id, title).await?;
    tracing::info!(title = %title, page_id = %id, "created stream page");
    Ok(id)
}

/// Finds the direct child of `page_id` whose trimmed text is `label`, creating
/// it at index 0 otherwise.
pub async fn get_or_create_container(store: &dyn HostStore, page_id: &NodeId, label: &str) -> AppResult<NodeId> {
    let candidates = store
        .query_children(page_id, &ChildFilter::Contains(label.trim().to_string()))
        .await?;
    if let Some(existing) = candidates.into_iter().find(|node| node.text.trim() == label.trim()) {
        return Ok(existing.id);
    }

    let id = store.generate_id();
    store.create_child(page_id, &id, label, 0).await?;
    tracing::info!(page_id = %page_id, container_id = %id, "created journal container");
    Ok(id)
}

pub async fn get_journal_root(store: &dyn HostStore, stream_name: &str, container_label: &str) -> AppResult<JournalRoot> {
    let page_id = get_or_create_page(store, stream_name).await?;
    let container_id = get_or_create_container(store, &page_id, container_label).await?;
    Ok(JournalRoot { page_id, container_id })
}

#[cfg(test)]
mod tests {
    use super::{get_journal_root, DEFAULT_CONTAINER_LABEL};
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn creates_page_and_container_once() {
        let store = MemoryStore::new();
        let first = get_journal_root(&store, "Therapy Journal", DEFAULT_CONTAINER_LABEL)
            .await
            .expect("first root");
        let second = get_journal_root(&store, "Therapy Journal", DEFAULT_CONTAINER_LABEL)
            .await
            .expect("second root");

        assert_eq!(first, second);
        let children = store.children(&first.page_id).expect("children");
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].text, "Journal Entries:");
        assert_eq!(store.create_calls().expect("calls"), 2);
    }

    #[tokio::test]
    async fn reuses_existing_container_below_other_blocks() {
        let store = MemoryStore::new();
        let page = store.insert_page("Project Ideas").expect("page");
        store.insert_child(&page, "Some notes about Journal Entries: later").expect("prose");
        let container = store.insert_child(&page, "  Journal Entries: ").expect("container");

        let root = get_journal_root(&store, "Project Ideas", DEFAULT_CONTAINER_LABEL)
            .await
            .expect("root");
        assert_eq!(root.page_id, page);
        assert_eq!(root.container_id, container);
        assert_eq!(store.create_calls().expect("calls"), 0);
    }

    #[tokio::test]
    async fn new_container_goes_first() {
        let store = MemoryStore::new();
        let page = store.insert_page("Learning Notes").expect("page");
        store.insert_child(&page, "intro").expect("intro");

        let root = get_journal_root(&store, "Learning Notes", DEFAULT_CONTAINER_LABEL)
            .await
            .expect("root");
        let children = store.children(&page).expect("children");
        assert_eq!(children[0].id, root.container_id);
        assert_eq!(children[1].text, "intro");
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let store = MemoryStore::new();
        store.insert_page("Health").expect("page");
        store.fail_next_queries(1).expect("arm");
        assert!(get_journal_root(&store, "Health", DEFAULT_CONTAINER_LABEL).await.is_err());
    }
}
