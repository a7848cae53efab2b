//! Ordered storage of submitted messages.

use std::collections::HashMap;

use tokio::sync::watch;
use tracing::debug;

use super::models::{EntryId, EntryPatch, MessageEntry};
use crate::errors::LingoError;

/// Owns every message entry and the order they are displayed in.
///
/// Entries are keyed by a stable id so updates never depend on list
/// positions. Readers get cloned snapshots; every mutation bumps a revision
/// counter that observers can watch.
#[derive(Debug)]
pub struct MessageStore {
    order: Vec<EntryId>,
    entries: HashMap<EntryId, MessageEntry>,
    next_id: u64,
    revision: watch::Sender<u64>,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore {
    #[must_use]
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
            next_id: 1,
            revision,
        }
    }

    /// Adds a message to the end of the list.
    ///
    /// Whitespace-only input is ignored and yields `None`. Anything else is
    /// stored exactly as given.
    pub fn append(&mut self, text: &str) -> Option<EntryId> {
        if text.trim().is_empty() {
            debug!("Ignoring empty submission");
            return None;
        }

        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries
            .insert(id, MessageEntry::new(id, text.to_string()));
        self.order.push(id);
        self.bump();
        debug!(entry_id = %id, "Appended message");
        Some(id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no entry has this id; nothing is changed then.
    pub fn patch(&mut self, id: EntryId, patch: EntryPatch) -> Result<(), LingoError> {
        let entry = self.entries.get_mut(&id).ok_or(LingoError::NotFound(id))?;
        if patch.is_empty() {
            return Ok(());
        }
        patch.apply(entry);
        self.bump();
        Ok(())
    }

    /// Removes an entry. Returns `false` if the id was unknown.
    pub fn delete(&mut self, id: EntryId) -> bool {
        if self.entries.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|existing| *existing != id);
        self.bump();
        debug!(entry_id = %id, "Deleted message");
        true
    }

    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<MessageEntry> {
        self.entries.get(&id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Snapshot of all entries in display order.
    #[must_use]
    pub fn list(&self) -> Vec<MessageEntry> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).cloned())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Receiver that changes whenever the store is mutated.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Translation;

    #[test]
    fn append_keeps_text_as_submitted_and_assigns_increasing_ids() {
        let mut store = MessageStore::new();
        let a = store.append("  first ").unwrap();
        let b = store.append("second").unwrap();

        assert!(b > a);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(a).unwrap().source_text, "  first ");
        assert_eq!(store.get(a).unwrap().detected_language, None);
    }

    #[test]
    fn blank_input_is_a_no_op() {
        let mut store = MessageStore::new();
        assert_eq!(store.append(""), None);
        assert_eq!(store.append("   \n\t"), None);
        assert!(store.is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut store = MessageStore::new();
        let a = store.append("a").unwrap();
        assert!(store.delete(a));
        let b = store.append("b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn patch_on_missing_entry_reports_not_found() {
        let mut store = MessageStore::new();
        let id = store.append("a").unwrap();
        store.delete(id);

        let err = store
            .patch(
                id,
                EntryPatch {
                    summary: Some("s".to_string()),
                    ..EntryPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, LingoError::NotFound(missing) if missing == id));
    }

    #[test]
    fn patch_updates_only_the_target() {
        let mut store = MessageStore::new();
        let a = store.append("a").unwrap();
        let b = store.append("b").unwrap();

        store
            .patch(
                b,
                EntryPatch {
                    translation: Some(Translation {
                        text: "be".to_string(),
                        target_language: "es".to_string(),
                    }),
                    ..EntryPatch::default()
                },
            )
            .unwrap();

        assert_eq!(store.get(a).unwrap().translation, None);
        assert_eq!(
            store.get(b).unwrap().translation.unwrap().target_language,
            "es"
        );
    }

    #[test]
    fn mutations_bump_revision() {
        let mut store = MessageStore::new();
        let rx = store.subscribe();
        let id = store.append("a").unwrap();
        store
            .patch(
                id,
                EntryPatch {
                    detected_language: Some("en".to_string()),
                    ..EntryPatch::default()
                },
            )
            .unwrap();
        store.delete(id);
        assert_eq!(*rx.borrow(), 3);
        assert!(!store.delete(id));
        assert_eq!(store.revision(), 3);
    }
}
