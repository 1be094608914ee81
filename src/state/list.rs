//! Push-driven list state
//!
//! [`EntityList`] holds the rows a screen shows and applies changes to them by
//! id. Changes arriving while the initial fetch is in flight are buffered and
//! replayed on top of the fetched snapshot, so a change never gets lost or
//! applied twice because it raced the fetch.

use uuid::Uuid;
use crate::models::Record;
use crate::realtime::Change;

#[derive(Debug, Clone)]
pub struct EntityList<T> {
    items: Vec<T>,
    loading: bool,
    loaded: bool,
    pending: Vec<Change<T>>,
}

impl<T> Default for EntityList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            loaded: false,
            pending: Vec::new(),
        }
    }
}

impl<T: Record> EntityList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start buffering changes until [`EntityList::finish_load`]
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.pending.clear();
    }

    /// Replace the rows with a fetched snapshot and replay buffered changes
    pub fn finish_load(&mut self, snapshot: Vec<T>) {
        self.items = snapshot;
        self.loading = false;
        self.loaded = true;
        for change in std::mem::take(&mut self.pending) {
            self.apply(change);
        }
    }

    /// Keep the current rows but still replay buffered changes
    ///
    /// The loading phase ends either way; a failed first fetch leaves an
    /// empty list rather than a spinner.
    pub fn fail_load(&mut self) {
        self.loading = false;
        self.loaded = true;
        for change in std::mem::take(&mut self.pending) {
            self.apply(change);
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether a fetch has finished at least once, successfully or not
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn apply(&mut self, change: Change<T>) {
        if self.loading {
            self.pending.push(change);
            return;
        }

        match change {
            Change::Inserted(record) => self.insert(record),
            Change::Updated(record) => self.replace(record),
            Change::Deleted(id) => {
                self.remove(id);
            }
        }
    }

    /// Insert at the head, or replace in place when the id is already shown
    pub fn insert(&mut self, record: T) {
        match self.position(record.id()) {
            Some(index) => self.items[index] = record,
            None => self.items.insert(0, record),
        }
    }

    /// Replace in place, inserting at the head when the id is unknown
    pub fn replace(&mut self, record: T) {
        self.insert(record);
    }

    /// Remove by id; returns false when the id is unknown
    pub fn remove(&mut self, id: Uuid) -> bool {
        match self.position(id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.position(id).is_some()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GalleryItem;
    use chrono::Utc;

    fn item(title: &str) -> GalleryItem {
        GalleryItem {
            id: Uuid::new_v4(),
            title: title.to_string(),
            media_url: "https://example.com/photo.jpg".to_string(),
            is_video: false,
            created_at: Utc::now(),
        }
    }

    fn titles(list: &EntityList<GalleryItem>) -> Vec<&str> {
        list.items().iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_insert_goes_to_head() {
        let mut list = EntityList::new();
        list.finish_load(vec![item("old")]);
        list.apply(Change::Inserted(item("new")));

        assert_eq!(titles(&list), vec!["new", "old"]);
    }

    #[test]
    fn test_duplicate_insert_replaces_in_place() {
        let first = item("first");
        let mut list = EntityList::new();
        list.finish_load(vec![item("a"), first.clone(), item("b")]);

        let mut renamed = first.clone();
        renamed.title = "renamed".to_string();
        list.apply(Change::Inserted(renamed));

        assert_eq!(titles(&list), vec!["a", "renamed", "b"]);
    }

    #[test]
    fn test_update_of_unknown_id_is_upserted() {
        let mut list = EntityList::new();
        list.finish_load(vec![item("a")]);
        list.apply(Change::Updated(item("late")));

        assert_eq!(titles(&list), vec!["late", "a"]);
    }

    #[test]
    fn test_delete_of_unknown_id_is_noop() {
        let mut list = EntityList::new();
        list.finish_load(vec![item("a"), item("b")]);
        list.apply(Change::Deleted(Uuid::new_v4()));

        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_insert_racing_fetch_appears_once() {
        let record = item("racer");
        let mut list = EntityList::new();

        list.begin_load();
        list.apply(Change::Inserted(record.clone()));
        assert!(list.is_empty());

        // The snapshot was taken after the insert committed
        list.finish_load(vec![record.clone(), item("older")]);

        assert_eq!(list.items().iter().filter(|i| i.id == record.id).count(), 1);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_delete_racing_fetch_is_not_undone() {
        let doomed = item("doomed");
        let mut list = EntityList::new();

        list.begin_load();
        list.apply(Change::Deleted(doomed.id));
        list.finish_load(vec![doomed.clone(), item("kept")]);

        assert!(!list.contains(doomed.id));
        assert_eq!(titles(&list), vec!["kept"]);
    }

    #[test]
    fn test_failed_load_keeps_rows_and_replays() {
        let mut list = EntityList::new();
        list.finish_load(vec![item("a")]);

        list.begin_load();
        list.apply(Change::Inserted(item("b")));
        list.fail_load();

        assert!(!list.is_loading());
        assert_eq!(titles(&list), vec!["b", "a"]);
    }

    #[test]
    fn test_failed_first_load_ends_loading() {
        let mut list: EntityList<GalleryItem> = EntityList::new();

        list.begin_load();
        list.fail_load();

        assert!(list.is_loaded());
        assert!(list.is_empty());
    }
}
