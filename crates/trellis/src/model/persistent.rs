//! Persistent model indices.
//!
//! A plain [`ModelIndex`] is a snapshot of a position: after rows or columns
//! are inserted, deleted or moved it may point at a different item. A
//! [`PersistentModelIndex`] instead follows its item through structural
//! changes, and expires when the item is deleted.
//!
//! Each model owns a registry of [`PersistentHandle`]s keyed by their current
//! index. The registry holds the only strong reference to each handle;
//! `PersistentModelIndex` values hold weak references. When a transaction
//! commits, the model computes a [`RemapPlan`] from the committed
//! [`Operation`] and applies it: doomed handles are dropped, and relocated
//! handles are updated in place and re-keyed. Every weak observer sees the
//! new position without re-resolving anything.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use trellis_core::logging::targets;

use super::index::ModelIndex;
use super::operation::{Operation, OperationKind};

/// The registry-owned cell behind a [`PersistentModelIndex`].
pub struct PersistentHandle {
    index: RwLock<ModelIndex>,
}

impl PersistentHandle {
    fn new(index: ModelIndex) -> Self {
        Self {
            index: RwLock::new(index),
        }
    }

    /// Returns the current location of the tracked item.
    pub fn index(&self) -> ModelIndex {
        self.index.read().clone()
    }

    fn set_index(&self, index: ModelIndex) {
        *self.index.write() = index;
    }
}

impl fmt::Debug for PersistentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentHandle")
            .field("index", &*self.index.read())
            .finish()
    }
}

/// A model index that follows its item across structural changes.
///
/// Obtained from [`ItemModel::register_persistent_index`]. Holding a
/// `PersistentModelIndex` does not keep the handle alive; once the tracked
/// item is deleted (or the model is dropped) the index expires and
/// [`index`](Self::index) returns an invalid index.
///
/// [`ItemModel::register_persistent_index`]: super::ItemModel::register_persistent_index
///
/// # Example
///
/// ```ignore
/// let persistent = model.register_persistent_index(&model.index(3, 0, &root));
/// model.insert(0, "new".to_string());
/// assert_eq!(persistent.row(), Some(4));
/// ```
#[derive(Clone, Default)]
pub struct PersistentModelIndex {
    handle: Weak<PersistentHandle>,
}

impl PersistentModelIndex {
    /// Creates a persistent index that is already expired.
    pub fn expired() -> Self {
        Self { handle: Weak::new() }
    }

    fn from_handle(handle: &Arc<PersistentHandle>) -> Self {
        Self {
            handle: Arc::downgrade(handle),
        }
    }

    /// Returns the current location of the tracked item, or an invalid index
    /// if it has expired.
    pub fn index(&self) -> ModelIndex {
        self.handle
            .upgrade()
            .map(|handle| handle.index())
            .unwrap_or_default()
    }

    /// Returns `true` if the tracked item still exists.
    pub fn is_valid(&self) -> bool {
        self.handle
            .upgrade()
            .is_some_and(|handle| handle.index.read().is_valid())
    }

    /// Current row of the tracked item.
    pub fn row(&self) -> Option<usize> {
        let index = self.index();
        index.is_valid().then(|| index.row())
    }

    /// Current column of the tracked item.
    pub fn column(&self) -> Option<usize> {
        let index = self.index();
        index.is_valid().then(|| index.column())
    }

    /// Upgrades to the underlying handle, if it is still registered.
    pub fn handle(&self) -> Option<Arc<PersistentHandle>> {
        self.handle.upgrade()
    }

    /// Returns `true` if both refer to the same handle.
    pub fn ptr_eq(&self, other: &PersistentModelIndex) -> bool {
        Weak::ptr_eq(&self.handle, &other.handle)
    }
}

impl fmt::Debug for PersistentModelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.handle.upgrade() {
            Some(handle) => write!(f, "PersistentModelIndex({:?})", handle.index()),
            None => write!(f, "PersistentModelIndex(expired)"),
        }
    }
}

/// The registry changes produced by one committed operation.
#[derive(Debug, Default, Clone)]
pub(crate) struct RemapPlan {
    /// Keys whose handles expire.
    pub expired: Vec<ModelIndex>,
    /// `(old key, new index)` pairs for handles that move.
    pub relocations: Vec<(ModelIndex, ModelIndex)>,
}

impl RemapPlan {
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty() && self.relocations.is_empty()
    }
}

/// Per-model table of persistent handles.
#[derive(Default)]
pub(crate) struct PersistentRegistry {
    handles: HashMap<ModelIndex, Arc<PersistentHandle>>,
}

impl PersistentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a persistent index for `index`, reusing the existing handle
    /// when the same index is already tracked.
    pub fn register(&mut self, index: &ModelIndex) -> PersistentModelIndex {
        if !index.is_valid() {
            return PersistentModelIndex::expired();
        }
        let handle = self
            .handles
            .entry(index.clone())
            .or_insert_with(|| Arc::new(PersistentHandle::new(index.clone())));
        PersistentModelIndex::from_handle(handle)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn contains(&self, index: &ModelIndex) -> bool {
        self.handles.contains_key(index)
    }

    /// Current keys, i.e. the positions of every tracked item.
    pub fn keys(&self) -> Vec<ModelIndex> {
        self.handles.keys().cloned().collect()
    }

    /// Applies a remap plan.
    ///
    /// Relocations are re-keyed in two phases so that shifting a run of
    /// adjacent handles never collides with a key that is about to move.
    pub fn apply(&mut self, plan: RemapPlan) {
        for key in &plan.expired {
            if let Some(handle) = self.handles.remove(key) {
                handle.set_index(ModelIndex::invalid());
            }
        }

        let mut moved = Vec::with_capacity(plan.relocations.len());
        for (old, new) in plan.relocations {
            if let Some(handle) = self.handles.remove(&old) {
                moved.push((handle, new));
            }
        }
        for (handle, new) in moved {
            handle.set_index(new.clone());
            if let Some(displaced) = self.handles.insert(new, handle) {
                tracing::warn!(
                    target: targets::PERSISTENT,
                    index = ?displaced.index(),
                    "persistent index collision while re-keying; displaced handle expired"
                );
                displaced.set_index(ModelIndex::invalid());
            }
        }
    }

    /// Drops handles that no `PersistentModelIndex` refers to any more.
    ///
    /// Returns the number of handles removed.
    pub fn prune_unobserved(&mut self) -> usize {
        let before = self.handles.len();
        self.handles
            .retain(|_, handle| Arc::weak_count(handle) > 0 || Arc::strong_count(handle) > 1);
        before - self.handles.len()
    }

    /// Expires every handle.
    pub fn clear(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.set_index(ModelIndex::invalid());
        }
    }
}

/// Collects the keys of handles that lie inside the range a delete removes,
/// either directly or through any ancestor.
///
/// `parent_of` must answer for the structure as it is before the delete.
pub(crate) fn doomed_handles<F>(keys: &[ModelIndex], op: &Operation, parent_of: F) -> Vec<ModelIndex>
where
    F: Fn(&ModelIndex) -> ModelIndex,
{
    keys.iter()
        .filter(|key| {
            let mut current = (*key).clone();
            loop {
                let parent = parent_of(&current);
                if parent == op.source_parent && op.contains(op.direction.dimension(&current)) {
                    return true;
                }
                if !parent.is_valid() {
                    return false;
                }
                current = parent;
            }
        })
        .cloned()
        .collect()
}

/// Computes how a committed operation changes the registry.
///
/// `parents` maps each tracked key to its parent. For inserts and deletes it
/// is taken after the data source has changed; moves carry the parents
/// recorded when the move began.
pub(crate) fn plan_remap(op: &Operation, parents: &HashMap<ModelIndex, ModelIndex>) -> RemapPlan {
    match op.kind {
        OperationKind::Insert => plan_insert(op, parents),
        OperationKind::Delete => plan_delete(op, parents),
        OperationKind::Move => plan_move(op, &op.parents),
    }
}

fn plan_insert(op: &Operation, parents: &HashMap<ModelIndex, ModelIndex>) -> RemapPlan {
    let count = op.count();
    let relocations = parents
        .iter()
        .filter(|(_, parent)| **parent == op.source_parent)
        .filter_map(|(key, _)| {
            let d = op.direction.dimension(key);
            (d >= op.first).then(|| (key.clone(), op.direction.with_dimension(key, d + count)))
        })
        .collect();
    RemapPlan {
        expired: Vec::new(),
        relocations,
    }
}

fn plan_delete(op: &Operation, parents: &HashMap<ModelIndex, ModelIndex>) -> RemapPlan {
    let count = op.count();
    let doomed: HashSet<&ModelIndex> = op.doomed.iter().collect();
    let relocations = parents
        .iter()
        .filter(|(key, parent)| !doomed.contains(key) && **parent == op.source_parent)
        .filter_map(|(key, _)| {
            let d = op.direction.dimension(key);
            (d > op.last).then(|| (key.clone(), op.direction.with_dimension(key, d - count)))
        })
        .collect();
    RemapPlan {
        expired: op.doomed.clone(),
        relocations,
    }
}

fn plan_move(op: &Operation, parents: &HashMap<ModelIndex, ModelIndex>) -> RemapPlan {
    let (Some(target_parent), Some(target)) = (op.target_parent.as_ref(), op.target) else {
        return RemapPlan::default();
    };
    if op.is_noop_move() {
        return RemapPlan::default();
    }

    let count = op.count();
    let within = op.is_move_within();
    let work_start = op.first.min(target);
    let work_end = (op.last + 1).max(target + count);

    let mut relocations = Vec::new();
    for (key, parent) in parents {
        let d = op.direction.dimension(key);
        let in_source = *parent == op.source_parent;
        let in_target = parent == target_parent;

        let new_d = if in_source && op.contains(d) {
            Some(target + (d - op.first))
        } else if within {
            if in_source && (work_start..work_end).contains(&d) {
                if target > op.first {
                    Some(d - count)
                } else {
                    Some(d + count)
                }
            } else {
                None
            }
        } else if in_source && d > op.last {
            Some(d - count)
        } else if in_target && d >= target {
            Some(d + count)
        } else {
            None
        };

        if let Some(new_d) = new_d {
            relocations.push((key.clone(), op.direction.with_dimension(key, new_d)));
        }
    }

    RemapPlan {
        expired: Vec::new(),
        relocations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::operation::Direction;
    use crate::model::{ItemModel, ListModel};

    fn numbers(n: usize) -> Arc<ListModel<String>> {
        ListModel::new((0..n).map(|i| i.to_string()).collect())
    }

    fn root_parents(keys: &[ModelIndex]) -> HashMap<ModelIndex, ModelIndex> {
        keys.iter()
            .map(|key| (key.clone(), ModelIndex::invalid()))
            .collect()
    }

    fn rows_after(plan: &RemapPlan) -> Vec<(usize, usize)> {
        let mut rows: Vec<_> = plan
            .relocations
            .iter()
            .map(|(old, new)| (old.row(), new.row()))
            .collect();
        rows.sort();
        rows
    }

    #[test]
    fn test_register_deduplicates() {
        let model = numbers(3);
        let mut registry = PersistentRegistry::new();
        let index = model.index(1, 0, &ModelIndex::invalid());

        let a = registry.register(&index);
        let b = registry.register(&index);
        assert!(a.ptr_eq(&b));
        assert_eq!(registry.len(), 1);
        assert_eq!(a.row(), Some(1));
    }

    #[test]
    fn test_register_invalid_is_expired() {
        let mut registry = PersistentRegistry::new();
        let persistent = registry.register(&ModelIndex::invalid());
        assert!(!persistent.is_valid());
        assert!(persistent.handle().is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_plan_insert() {
        let model = numbers(10);
        let root = ModelIndex::invalid();
        let keys: Vec<_> = [1, 2, 5].iter().map(|&r| model.index(r, 0, &root)).collect();

        let op = Operation::insert(Direction::Row, root, 2, 3);
        let plan = plan_remap(&op, &root_parents(&keys));
        assert!(plan.expired.is_empty());
        assert_eq!(rows_after(&plan), vec![(2, 4), (5, 7)]);
    }

    #[test]
    fn test_plan_delete() {
        let model = numbers(10);
        let root = ModelIndex::invalid();
        let keys: Vec<_> = [3, 5, 8].iter().map(|&r| model.index(r, 0, &root)).collect();

        let mut op = Operation::delete(Direction::Row, root, 4, 6);
        op.doomed = doomed_handles(&keys, &op, |_| ModelIndex::invalid());
        assert_eq!(op.doomed.len(), 1);
        assert_eq!(op.doomed[0].row(), 5);

        let plan = plan_remap(&op, &root_parents(&keys));
        assert_eq!(rows_after(&plan), vec![(8, 5)]);
    }

    #[test]
    fn test_plan_move_forward_within() {
        let model = numbers(10);
        let root = ModelIndex::invalid();
        let keys: Vec<_> = (0..10).map(|r| model.index(r, 0, &root)).collect();

        let mut op = Operation::moving(Direction::Row, root.clone(), 0, 1, root, 5);
        op.parents = root_parents(&keys);
        let plan = plan_remap(&op, &HashMap::new());
        assert_eq!(
            rows_after(&plan),
            vec![(0, 5), (1, 6), (2, 0), (3, 1), (4, 2), (5, 3), (6, 4)]
        );
    }

    #[test]
    fn test_plan_move_backward_within() {
        let model = numbers(10);
        let root = ModelIndex::invalid();
        let keys: Vec<_> = (0..10).map(|r| model.index(r, 0, &root)).collect();

        let mut op = Operation::moving(Direction::Row, root.clone(), 6, 7, root, 2);
        op.parents = root_parents(&keys);
        let plan = plan_remap(&op, &HashMap::new());
        assert_eq!(
            rows_after(&plan),
            vec![(2, 4), (3, 5), (4, 6), (5, 7), (6, 2), (7, 3)]
        );
    }

    #[test]
    fn test_plan_noop_move() {
        let model = numbers(4);
        let root = ModelIndex::invalid();
        let keys: Vec<_> = (0..4).map(|r| model.index(r, 0, &root)).collect();

        let mut op = Operation::moving(Direction::Row, root.clone(), 1, 2, root, 1);
        op.parents = root_parents(&keys);
        assert!(plan_remap(&op, &HashMap::new()).is_empty());
    }

    #[test]
    fn test_apply_two_phase_rekey() {
        let model = numbers(5);
        let root = ModelIndex::invalid();
        let mut registry = PersistentRegistry::new();
        let tracked: Vec<_> = (0..5)
            .map(|r| registry.register(&model.index(r, 0, &root)))
            .collect();

        // Shift every row by one; each new key is some other handle's old key.
        let plan = RemapPlan {
            expired: Vec::new(),
            relocations: registry
                .keys()
                .into_iter()
                .map(|key| {
                    let new = key.relocated(key.row() + 1, 0);
                    (key, new)
                })
                .collect(),
        };
        registry.apply(plan);

        for (row, persistent) in tracked.iter().enumerate() {
            assert_eq!(persistent.row(), Some(row + 1));
        }
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_apply_expires_doomed() {
        let model = numbers(3);
        let root = ModelIndex::invalid();
        let mut registry = PersistentRegistry::new();
        let persistent = registry.register(&model.index(2, 0, &root));
        let held = persistent.handle().expect("handle registered");

        registry.apply(RemapPlan {
            expired: vec![model.index(2, 0, &root)],
            relocations: Vec::new(),
        });

        assert!(!persistent.is_valid());
        assert!(!held.index().is_valid());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_prune_unobserved() {
        let model = numbers(3);
        let root = ModelIndex::invalid();
        let mut registry = PersistentRegistry::new();
        let kept = registry.register(&model.index(0, 0, &root));
        drop(registry.register(&model.index(1, 0, &root)));

        assert_eq!(registry.prune_unobserved(), 1);
        assert_eq!(registry.len(), 1);
        assert!(kept.is_valid());
    }
}
