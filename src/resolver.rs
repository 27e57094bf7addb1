//! Color-agnostic lookup and creation of scaffold nodes (year, month, day).
//!
//! A scaffold node's text is `<marker> <date text> #<color tag>`. Lookup only
//! ever uses the part before the color tag, so nodes created with different
//! colors resolve to the same node.

use crate::errors::AppResult;
use crate::models::{ColorClass, DateKey, Level, NodeId, OutlineNode};
use crate::store::{ChildFilter, HostStore};
use std::collections::HashSet;

pub const STRUCTURAL_MARKER: &str = "#st0";

/// Search and create text for one level of the cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelText {
    pub search: String,
    pub create: String,
}

impl LevelText {
    pub fn new(search: String, color: ColorClass) -> Self {
        let create = format!("{} #{}", search, color.tag());
        Self { search, create }
    }

    pub fn year(date: &DateKey, color: ColorClass) -> Self {
        Self::new(format!("{} [[{}]]", STRUCTURAL_MARKER, date.year), color)
    }

    pub fn month(date: &DateKey, color: ColorClass) -> Self {
        Self::new(format!("{} [[{}]]", STRUCTURAL_MARKER, date.full_month_text), color)
    }

    pub fn day(date: &DateKey, color: ColorClass) -> Self {
        Self::new(
            format!("{} {} [[{}]]", STRUCTURAL_MARKER, date.day_name, date.full_date_text),
            color,
        )
    }
}

pub fn is_scaffold(text: &str) -> bool {
    text.trim_start().starts_with(STRUCTURAL_MARKER)
}

/// Finds the scaffold child of `parent` for `search`, if the store shows one.
pub async fn find_scaffold(
    store: &dyn HostStore,
    parent: &NodeId,
    search: &str,
) -> AppResult<Option<OutlineNode>> {
    let by_prefix = store
        .query_children(parent, &ChildFilter::StartsWith(search.to_string()))
        .await?;
    if let Some(found) = by_prefix.into_iter().next() {
        return Ok(Some(found));
    }

    let containing = store
        .query_children(parent, &ChildFilter::Contains(search.to_string()))
        .await?;
    Ok(containing.into_iter().find(|node| is_scaffold(&node.text)))
}

/// Creations issued by one orchestration run that the store has not shown
/// back yet.
#[derive(Debug, Default)]
pub struct InFlight {
    pending: HashSet<(Level, NodeId)>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, level: Level, parent: &NodeId) -> bool {
        self.pending.contains(&(level, parent.clone()))
    }

    /// Returns false if the pair was already marked.
    pub fn mark(&mut self, level: Level, parent: &NodeId) -> bool {
        self.pending.insert((level, parent.clone()))
    }

    pub fn clear(&mut self, level: Level, parent: &NodeId) {
        self.pending.remove(&(level, parent.clone()));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(NodeId),
    /// A create for this level is in flight; look again next iteration.
    Pending,
}

/// Resolves one level under `parent`, creating it at index 0 when the store
/// shows no match and no create is already in flight for the pair.
pub async fn resolve_level(
    store: &dyn HostStore,
    in_flight: &mut InFlight,
    parent: &NodeId,
    level: Level,
    text: &LevelText,
) -> AppResult<Resolution> {
    if let Some(found) = find_scaffold(store, parent, &text.search).await? {
        return Ok(Resolution::Found(found.id));
    }

    if !in_flight.mark(level, parent) {
        tracing::debug!(level = %level, parent = %parent, "create already in flight, waiting for visibility");
        return Ok(Resolution::Pending);
    }

    let id = store.generate_id();
    if let Err(error) = store.create_child(parent, &id, &text.create, 0).await {
        in_flight.clear(level, parent);
        return Err(error);
    }
    tracing::info!(level = %level, parent = %parent, node_id = %id, "created scaffold node");
    Ok(Resolution::Pending)
}

#[cfg(test)]
mod tests {
    use super::{find_scaffold, is_scaffold, resolve_level, InFlight, LevelText, Resolution};
    use crate::date_key::parse_date_key;
    use crate::models::{ColorClass, Level};
    use crate::store::memory::MemoryStore;

    #[test]
    fn level_text_matches_documented_shapes() {
        let date = parse_date_key("January 15th, 2025").expect("date");
        let year = LevelText::year(&date, ColorClass::Blue);
        assert_eq!(year.search, "#st0 [[2025]]");
        assert_eq!(year.create, "#st0 [[2025]] #clr-lgt-blu-act");
        assert_eq!(LevelText::month(&date, ColorClass::Red).search, "#st0 [[January 2025]]");
        let day = LevelText::day(&date, ColorClass::Red);
        assert_eq!(day.search, "#st0 Wednesday [[January 15th, 2025]]");
        assert_eq!(day.create, "#st0 Wednesday [[January 15th, 2025]] #clr-lgt-red-act");
    }

    #[test]
    fn marker_is_checked_after_leading_whitespace() {
        assert!(is_scaffold("  #st0 [[2025]]"));
        assert!(!is_scaffold("note about #st0 [[2025]]"));
    }

    #[tokio::test]
    async fn prefix_match_ignores_color() {
        let store = MemoryStore::new();
        let root = store.insert_page("Stream").expect("page");
        let existing = store.insert_child(&root, "#st0 [[2025]] #clr-lgt-red-act").expect("year");

        let found = find_scaffold(&store, &root, "#st0 [[2025]]").await.expect("find");
        assert_eq!(found.map(|node| node.id), Some(existing));
    }

    #[tokio::test]
    async fn contains_phase_requires_marker_prefix() {
        let store = MemoryStore::new();
        let root = store.insert_page("Stream").expect("page");
        store
            .insert_child(&root, "remember #st0 [[2025]] from the retro")
            .expect("prose");

        let found = find_scaffold(&store, &root, "#st0 [[2025]]").await.expect("find");
        assert!(found.is_none());

        let scaffold = store.insert_child(&root, " #st0 [[2025]] #clr-wht-act").expect("year");
        let found = find_scaffold(&store, &root, "#st0 [[2025]]").await.expect("find");
        assert_eq!(found.map(|node| node.id), Some(scaffold));
    }

    #[tokio::test]
    async fn creates_once_while_in_flight() {
        let store = MemoryStore::new().with_hidden_writes();
        let root = store.insert_page("Stream").expect("page");
        let date = parse_date_key("March 3rd, 2024").expect("date");
        let text = LevelText::year(&date, ColorClass::Green);
        let mut in_flight = InFlight::new();

        for _ in 0..5 {
            let outcome = resolve_level(&store, &mut in_flight, &root, Level::Year, &text)
                .await
                .expect("resolve");
            assert_eq!(outcome, Resolution::Pending);
        }
        assert_eq!(store.create_calls().expect("calls"), 1);
        assert_eq!(store.children(&root).expect("children").len(), 1);
        assert!(in_flight.contains(Level::Year, &root));
    }

    #[tokio::test]
    async fn failed_create_is_retried() {
        let store = MemoryStore::new();
        let root = store.insert_page("Stream").expect("page");
        let date = parse_date_key("March 3rd, 2024").expect("date");
        let text = LevelText::year(&date, ColorClass::Green);
        let mut in_flight = InFlight::new();

        store.fail_next_creates(1).expect("arm");
        let first = resolve_level(&store, &mut in_flight, &root, Level::Year, &text).await;
        assert!(first.is_err());
        assert!(in_flight.is_empty());

        let second = resolve_level(&store, &mut in_flight, &root, Level::Year, &text)
            .await
            .expect("second attempt");
        assert_eq!(second, Resolution::Pending);
        let third = resolve_level(&store, &mut in_flight, &root, Level::Year, &text)
            .await
            .expect("third attempt");
        assert!(matches!(third, Resolution::Found(_)));
        assert_eq!(store.children(&root).expect("children").len(), 1);
    }
}
