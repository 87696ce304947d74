//! In-memory item list.
//!
//! [`ItemStore`] owns an ordered collection of [`ListItem`] records. Callers
//! only ever receive clones; every mutation goes through the store and is
//! validated first.

use std::sync::{Mutex, MutexGuard, PoisonError};

use jiff::Timestamp;
use tracing::debug;

pub use pokedex_core::ListItem;

/// Longest accepted title, in characters, after trimming.
pub const MAX_TITLE_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Title must be at most {max} characters")]
    TitleTooLong { max: usize },

    #[error("Item not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, ItemError>;

/// Trim a title and check it against the length bounds.
fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ItemError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ItemError::TitleTooLong { max: MAX_TITLE_LEN });
    }
    Ok(title.to_string())
}

/// Timestamp-based id source that never repeats an id.
///
/// Ids are milliseconds since the Unix epoch; when the clock has not moved
/// past the last issued id the previous id plus one is used instead.
#[derive(Debug, Default)]
struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    fn next(&mut self) -> String {
        let now = u64::try_from(Timestamp::now().as_millisecond()).unwrap_or(0);
        let id = now.max(self.last + 1);
        self.last = id;
        id.to_string()
    }
}

#[derive(Debug, Default)]
struct Inner {
    items: Vec<ListItem>,
    ids: IdGenerator,
}

/// Ordered, in-memory collection of list items.
#[derive(Debug, Default)]
pub struct ItemStore {
    inner: Mutex<Inner>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the two sample records the app starts with.
    pub fn seeded() -> Self {
        let items = vec![
            ListItem {
                id: "1".to_string(),
                title: "Item Exemplo 1".to_string(),
            },
            ListItem {
                id: "2".to_string(),
                title: "Item Exemplo 2".to_string(),
            },
        ];
        Self {
            inner: Mutex::new(Inner {
                items,
                ids: IdGenerator::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a new item with a fresh id.
    pub fn add(&self, title: &str) -> Result<ListItem> {
        let title = validate_title(title)?;
        let mut inner = self.lock();
        let item = ListItem {
            id: inner.ids.next(),
            title,
        };
        inner.items.push(item.clone());
        debug!("Added item {}", item.id);
        Ok(item)
    }

    /// Replace the title of an existing item, keeping its id and position.
    pub fn update(&self, id: &str, title: &str) -> Result<ListItem> {
        let title = validate_title(title)?;
        let mut inner = self.lock();
        let item = inner
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| ItemError::NotFound(id.to_string()))?;
        item.title = title;
        debug!("Updated item {}", id);
        Ok(item.clone())
    }

    /// Remove an item. Returns `None` when no item has this id.
    pub fn delete(&self, id: &str) -> Option<ListItem> {
        let mut inner = self.lock();
        let pos = inner.items.iter().position(|item| item.id == id)?;
        let removed = inner.items.remove(pos);
        debug!("Deleted item {}", id);
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<ListItem> {
        self.lock().items.iter().find(|item| item.id == id).cloned()
    }

    /// Snapshot of all items in insertion order.
    pub fn list(&self) -> Vec<ListItem> {
        self.lock().items.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        let store = ItemStore::seeded();
        let before = store.list();

        assert_eq!(store.add("   "), Err(ItemError::EmptyTitle));
        assert_eq!(store.add(""), Err(ItemError::EmptyTitle));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn overlong_title_is_rejected() {
        let store = ItemStore::new();
        let title = "x".repeat(MAX_TITLE_LEN + 1);
        assert_eq!(
            store.add(&title),
            Err(ItemError::TitleTooLong { max: MAX_TITLE_LEN })
        );
        assert!(store.is_empty());

        let title = "x".repeat(MAX_TITLE_LEN);
        assert!(store.add(&title).is_ok());
    }

    #[test]
    fn add_appends_with_fresh_id() {
        let store = ItemStore::seeded();
        let before = store.list();

        let milk = store.add("Milk").unwrap();
        let after = store.list();

        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after.last(), Some(&milk));
        assert_eq!(milk.title, "Milk");
        assert!(before.iter().all(|item| item.id != milk.id));
    }

    #[test]
    fn add_trims_title() {
        let store = ItemStore::new();
        let item = store.add("  Bread \n").unwrap();
        assert_eq!(item.title, "Bread");
    }

    #[test]
    fn ids_do_not_collide_within_a_millisecond() {
        let store = ItemStore::new();
        let ids: HashSet<_> = (0..500)
            .map(|i| store.add(&format!("item {i}")).unwrap().id)
            .collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn update_changes_only_the_target() {
        let store = ItemStore::seeded();
        let milk = store.add("Milk").unwrap();

        let updated = store.update("1", "New").unwrap();
        assert_eq!(updated.id, "1");

        let items = store.list();
        assert_eq!(
            items,
            vec![
                ListItem { id: "1".into(), title: "New".into() },
                ListItem { id: "2".into(), title: "Item Exemplo 2".into() },
                milk,
            ]
        );
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let store = ItemStore::seeded();
        let before = store.list();

        assert_eq!(
            store.update("missing", "New"),
            Err(ItemError::NotFound("missing".into()))
        );
        assert_eq!(store.list(), before);
    }

    #[test]
    fn update_with_blank_title_is_noop() {
        let store = ItemStore::seeded();
        let before = store.list();

        assert_eq!(store.update("1", " "), Err(ItemError::EmptyTitle));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn delete_removes_exactly_one() {
        let store = ItemStore::seeded();

        let removed = store.delete("1").unwrap();
        assert_eq!(removed.title, "Item Exemplo 1");
        assert_eq!(store.len(), 1);
        assert!(store.get("1").is_none());

        assert!(store.delete("1").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn list_is_a_snapshot() {
        let store = ItemStore::seeded();
        let snapshot = store.list();
        store.add("Eggs").unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(store.len(), 3);
    }
}
