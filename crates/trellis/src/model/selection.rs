//! Selection state that survives structural changes.
//!
//! [`ModelSelection`] stores every selected cell as a
//! [`PersistentModelIndex`], so rows inserted, deleted or moved around a
//! selected cell keep the selection on the same item. Cells that are deleted
//! drop out of the selection the next time it is read or mutated.
//!
//! # Example
//!
//! ```
//! use trellis::model::{ItemModel, ListModel, ModelIndex, ModelSelection};
//!
//! let model = ListModel::new(vec!["a".to_string(), "b".to_string()]);
//! let mut selection = ModelSelection::new();
//!
//! selection.select(&model.index(1, 0, &ModelIndex::invalid()));
//! model.insert(0, "z".to_string()).unwrap();
//!
//! assert_eq!(selection.first().map(|index| index.row()), Some(2));
//! ```

use trellis_core::Signal;

use super::index::ModelIndex;
use super::persistent::PersistentModelIndex;

/// How many cells a selection may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Nothing can be selected.
    NoSelection,
    /// At most one cell is selected; selecting another replaces it.
    SingleSelection,
    /// Any number of cells can be selected (default).
    #[default]
    MultiSelection,
}

/// A set of selected cells tracked through persistent indices.
pub struct ModelSelection {
    mode: SelectionMode,
    entries: Vec<PersistentModelIndex>,
    /// Emitted after every mutation that changes the selection.
    pub changed: Signal<()>,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSelection {
    /// Creates an empty selection in [`SelectionMode::MultiSelection`].
    pub fn new() -> Self {
        Self::with_mode(SelectionMode::default())
    }

    /// Creates an empty selection with the given mode.
    pub fn with_mode(mode: SelectionMode) -> Self {
        Self {
            mode,
            entries: Vec::new(),
            changed: Signal::new(),
        }
    }

    /// Returns the selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Sets the selection mode, trimming the current selection to fit it.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
        self.prune();
        let keep = match mode {
            SelectionMode::NoSelection => 0,
            SelectionMode::SingleSelection => 1,
            SelectionMode::MultiSelection => self.entries.len(),
        };
        if self.entries.len() > keep {
            self.entries.truncate(keep);
            self.changed.emit(());
        }
    }

    /// Adds `index` to the selection.
    ///
    /// Invalid indices, and indices already selected, are ignored.
    pub fn select(&mut self, index: &ModelIndex) {
        self.prune();
        if self.mode == SelectionMode::NoSelection || self.position(index).is_some() {
            return;
        }
        let Some(entry) = Self::track(index) else {
            return;
        };
        if self.mode == SelectionMode::SingleSelection {
            self.entries.clear();
        }
        self.entries.push(entry);
        self.changed.emit(());
    }

    /// Removes `index` from the selection.
    pub fn deselect(&mut self, index: &ModelIndex) {
        self.prune();
        if let Some(position) = self.position(index) {
            self.entries.remove(position);
            self.changed.emit(());
        }
    }

    /// Selects `index` if it is not selected, deselects it otherwise.
    pub fn toggle(&mut self, index: &ModelIndex) {
        if self.contains(index) {
            self.deselect(index);
        } else {
            self.select(index);
        }
    }

    /// Replaces the selection with `index` alone.
    pub fn set(&mut self, index: &ModelIndex) {
        self.prune();
        let entry = match self.mode {
            SelectionMode::NoSelection => None,
            _ => Self::track(index),
        };
        if self.entries.is_empty() && entry.is_none() {
            return;
        }
        let unchanged = self.entries.len() == 1 && self.position(index) == Some(0);
        if unchanged {
            return;
        }
        self.entries.clear();
        self.entries.extend(entry);
        self.changed.emit(());
    }

    /// Deselects everything.
    pub fn clear(&mut self) {
        let was_empty = self.entries.iter().all(|entry| !entry.is_valid());
        self.entries.clear();
        if !was_empty {
            self.changed.emit(());
        }
    }

    /// Returns `true` if `index` is selected.
    pub fn contains(&self, index: &ModelIndex) -> bool {
        self.position(index).is_some()
    }

    /// Returns the live indices of every selected cell, in selection order.
    pub fn indexes(&self) -> Vec<ModelIndex> {
        self.entries
            .iter()
            .map(PersistentModelIndex::index)
            .filter(ModelIndex::is_valid)
            .collect()
    }

    /// Returns the first selected cell that still exists.
    pub fn first(&self) -> Option<ModelIndex> {
        self.entries
            .iter()
            .map(PersistentModelIndex::index)
            .find(ModelIndex::is_valid)
    }

    /// Number of selected cells that still exist.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_valid()).count()
    }

    /// Returns `true` if no selected cell still exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deselects every cell for which `predicate` returns `true`.
    ///
    /// Returns the number of cells removed.
    pub fn remove_all_matching<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&ModelIndex) -> bool,
    {
        self.prune();
        let before = self.entries.len();
        self.entries.retain(|entry| !predicate(&entry.index()));
        let removed = before - self.entries.len();
        if removed > 0 {
            self.changed.emit(());
        }
        removed
    }

    fn track(index: &ModelIndex) -> Option<PersistentModelIndex> {
        let model = index.model()?;
        let entry = model.register_persistent_index(index);
        entry.is_valid().then_some(entry)
    }

    fn position(&self, index: &ModelIndex) -> Option<usize> {
        if !index.is_valid() {
            return None;
        }
        self.entries.iter().position(|entry| entry.index() == *index)
    }

    fn prune(&mut self) {
        let before = self.entries.len();
        self.entries.retain(PersistentModelIndex::is_valid);
        if self.entries.len() != before {
            tracing::trace!(
                target: "trellis::model",
                pruned = before - self.entries.len(),
                "dropped deleted cells from selection"
            );
        }
    }
}

impl std::fmt::Debug for ModelSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSelection")
            .field("mode", &self.mode)
            .field("indexes", &self.indexes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::model::{ItemModel, ListModel};

    fn model(len: usize) -> Arc<ListModel<String>> {
        ListModel::new((0..len).map(|i| format!("item {i}")).collect())
    }

    fn row(model: &ListModel<String>, row: usize) -> ModelIndex {
        model.index(row, 0, &ModelIndex::invalid())
    }

    #[test]
    fn test_select_and_deselect() {
        let model = model(5);
        let mut selection = ModelSelection::new();

        selection.select(&row(&model, 1));
        selection.select(&row(&model, 3));
        selection.select(&row(&model, 3));
        assert_eq!(selection.len(), 2);
        assert!(selection.contains(&row(&model, 3)));

        selection.deselect(&row(&model, 1));
        assert_eq!(selection.indexes(), vec![row(&model, 3)]);
    }

    #[test]
    fn test_invalid_index_is_ignored() {
        let mut selection = ModelSelection::new();
        selection.select(&ModelIndex::invalid());
        assert!(selection.is_empty());
        assert!(!selection.contains(&ModelIndex::invalid()));
    }

    #[test]
    fn test_toggle() {
        let model = model(3);
        let mut selection = ModelSelection::new();
        selection.toggle(&row(&model, 0));
        assert!(selection.contains(&row(&model, 0)));
        selection.toggle(&row(&model, 0));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_set_replaces_selection() {
        let model = model(4);
        let mut selection = ModelSelection::new();
        selection.select(&row(&model, 0));
        selection.select(&row(&model, 1));

        selection.set(&row(&model, 2));
        assert_eq!(selection.indexes(), vec![row(&model, 2)]);
    }

    #[test]
    fn test_single_selection_mode() {
        let model = model(4);
        let mut selection = ModelSelection::with_mode(SelectionMode::SingleSelection);
        selection.select(&row(&model, 0));
        selection.select(&row(&model, 2));
        assert_eq!(selection.indexes(), vec![row(&model, 2)]);

        let mut none = ModelSelection::with_mode(SelectionMode::NoSelection);
        none.select(&row(&model, 0));
        assert!(none.is_empty());
    }

    #[test]
    fn test_selection_follows_structural_changes() {
        let model = model(5);
        let mut selection = ModelSelection::new();
        selection.select(&row(&model, 2));
        selection.select(&row(&model, 4));

        model.insert(0, "new".to_string()).unwrap();
        assert_eq!(selection.indexes(), vec![row(&model, 3), row(&model, 5)]);

        model.remove(3).unwrap();
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.first(), Some(row(&model, 4)));
    }

    #[test]
    fn test_remove_all_matching() {
        let model = model(6);
        let mut selection = ModelSelection::new();
        for i in 0..6 {
            selection.select(&row(&model, i));
        }
        let removed = selection.remove_all_matching(|index| index.row() % 2 == 0);
        assert_eq!(removed, 3);
        assert_eq!(selection.len(), 3);
        assert!(selection.indexes().iter().all(|index| index.row() % 2 == 1));
    }

    #[test]
    fn test_changed_signal() {
        let model = model(3);
        let mut selection = ModelSelection::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        selection.changed.connect(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        selection.select(&row(&model, 0));
        selection.select(&row(&model, 0));
        selection.clear();
        selection.clear();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
