//! Hierarchical tree model implementation.
//!
//! `TreeModel` stores nodes with parent-child relationships. Every node has a
//! stable [`NodeId`], which is also the `internal_id` of the indices the
//! model creates, so an index keeps identifying the same node while its
//! siblings come and go. Insertions, removals and moves (including moves to
//! another parent) run as structural transactions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use trellis_core::logging::targets;
use trellis_core::{ModelError, PerfSpan, Result};

use super::config::ModelConfig;
use super::index::ModelIndex;
use super::state::ModelState;
use super::traits::{ItemModel, UpdateFlags};
use super::variant::{ModelRole, Variant};

/// Identifies a node of a [`TreeModel`].
pub type NodeId = u64;

/// Counter for generating unique node IDs.
static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_node_id() -> NodeId {
    NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Trait for tree node data that provides its own display information.
///
/// Implement this trait for types that should be directly usable as tree nodes.
pub trait TreeNodeData: Send + Sync {
    /// Returns the primary display text for this node.
    fn display(&self) -> Variant;

    /// Returns the icon for this node.
    fn icon(&self) -> Variant {
        Variant::Invalid
    }

    /// Returns the tooltip text for this node.
    fn tooltip(&self) -> Variant {
        Variant::Invalid
    }

    /// Returns data for any other role.
    fn data(&self, _role: ModelRole) -> Variant {
        Variant::Invalid
    }

    /// Returns data for columns past the first.
    fn column_data(&self, _column: usize, _role: ModelRole) -> Variant {
        Variant::Invalid
    }
}

impl TreeNodeData for String {
    fn display(&self) -> Variant {
        Variant::from(self.as_str())
    }
}

fn node_data<T: TreeNodeData>(data: &T, column: usize, role: ModelRole) -> Variant {
    if column > 0 {
        return data.column_data(column, role);
    }
    match role {
        ModelRole::Display | ModelRole::Edit => data.display(),
        ModelRole::Icon => data.icon(),
        ModelRole::ToolTip => data.tooltip(),
        _ => data.data(role),
    }
}

/// A node in the tree structure.
struct TreeNode<T> {
    data: T,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// Internal storage for tree nodes.
struct TreeStorage<T> {
    nodes: HashMap<NodeId, TreeNode<T>>,
    root_children: Vec<NodeId>,
}

impl<T> TreeStorage<T> {
    fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            root_children: Vec::new(),
        }
    }

    fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn children_of(&self, parent_id: Option<NodeId>) -> &[NodeId] {
        match parent_id {
            None => &self.root_children,
            Some(id) => self
                .nodes
                .get(&id)
                .map(|n| n.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    fn children_of_mut(&mut self, parent_id: Option<NodeId>) -> Option<&mut Vec<NodeId>> {
        match parent_id {
            None => Some(&mut self.root_children),
            Some(id) => self.nodes.get_mut(&id).map(|n| &mut n.children),
        }
    }

    fn child_count(&self, parent_id: Option<NodeId>) -> usize {
        self.children_of(parent_id).len()
    }

    fn child_at(&self, parent_id: Option<NodeId>, row: usize) -> Option<NodeId> {
        self.children_of(parent_id).get(row).copied()
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    fn row_of(&self, id: NodeId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        let siblings = self.children_of(self.parent_of(id));
        siblings.iter().position(|&child_id| child_id == id)
    }

    /// Returns `true` if `id` is `ancestor` or lies below it.
    fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent_of(node);
        }
        false
    }

    fn insert(&mut self, parent: Option<NodeId>, row: usize, data: T) -> NodeId {
        let id = next_node_id();
        self.nodes.insert(
            id,
            TreeNode {
                data,
                children: Vec::new(),
                parent,
            },
        );
        if let Some(children) = self.children_of_mut(parent) {
            children.insert(row, id);
        }
        id
    }

    fn remove_node(&mut self, id: NodeId) -> Option<T> {
        let parent = self.parent_of(id);
        if let Some(children) = self.children_of_mut(parent) {
            children.retain(|&child_id| child_id != id);
        }
        self.remove_subtree(id)
    }

    fn remove_subtree(&mut self, id: NodeId) -> Option<T> {
        let node = self.nodes.remove(&id)?;
        for child_id in node.children {
            self.remove_subtree(child_id);
        }
        Some(node.data)
    }

    fn relink(&mut self, id: NodeId, new_parent: Option<NodeId>, row: usize) {
        let old_parent = self.parent_of(id);
        if let Some(children) = self.children_of_mut(old_parent) {
            children.retain(|&child_id| child_id != id);
        }
        if let Some(children) = self.children_of_mut(new_parent) {
            children.insert(row, id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = new_parent;
        }
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.root_children.clear();
    }
}

/// Type alias for a tree data extractor function: `(data, column, role)`.
pub type TreeDataExtractor<T> = Arc<dyn Fn(&T, usize, ModelRole) -> Variant + Send + Sync>;

/// A hierarchical tree model for displaying parent-child data.
///
/// Nodes are addressed by [`NodeId`] in the mutation API and by
/// [`ModelIndex`] through [`ItemModel`]. Use [`node_id`](Self::node_id) and
/// [`index_of`](Self::index_of) to convert between the two.
///
/// # Example
///
/// ```
/// use trellis::model::{ItemModel, TreeModel};
///
/// let model = TreeModel::<String>::new();
/// let docs = model.add_root("Documents".to_string());
/// let music = model.add_root("Music".to_string());
/// let report = model.add_child(docs, "report.txt".to_string()).unwrap();
///
/// let tracked = model.register_persistent_index(&model.index_of(report));
/// model.move_node(report, Some(music), 0).unwrap();
///
/// assert_eq!(model.node_id(&tracked.index()), Some(report));
/// assert_eq!(model.node_id(&tracked.index().parent()), Some(music));
/// ```
pub struct TreeModel<T> {
    storage: RwLock<TreeStorage<T>>,
    column_count: usize,
    extractor: TreeDataExtractor<T>,
    state: ModelState,
}

impl<T: TreeNodeData + 'static> TreeModel<T> {
    /// Creates a new empty tree model.
    pub fn new() -> Arc<Self> {
        Self::with_config(ModelConfig::default())
    }

    /// Creates a new empty tree model with the given configuration.
    pub fn with_config(config: ModelConfig) -> Arc<Self> {
        Self::build(1, Arc::new(node_data::<T>), config)
    }

    /// Creates a new empty tree model showing `column_count` columns.
    ///
    /// Columns past the first are served by [`TreeNodeData::column_data`].
    pub fn with_columns(column_count: usize) -> Arc<Self> {
        Self::build(column_count, Arc::new(node_data::<T>), ModelConfig::default())
    }
}

impl<T: Send + Sync + 'static> TreeModel<T> {
    /// Creates a new tree model with a custom data extractor.
    pub fn with_extractor<F>(column_count: usize, extractor: F) -> Arc<Self>
    where
        F: Fn(&T, usize, ModelRole) -> Variant + Send + Sync + 'static,
    {
        Self::build(column_count, Arc::new(extractor), ModelConfig::default())
    }

    fn build(column_count: usize, extractor: TreeDataExtractor<T>, config: ModelConfig) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| Self {
            storage: RwLock::new(TreeStorage::new()),
            column_count,
            extractor,
            state: ModelState::with_config(weak.clone(), config),
        })
    }

    /// Returns the number of columns.
    pub fn column_count_value(&self) -> usize {
        self.column_count
    }

    /// Returns the number of root-level nodes.
    pub fn root_count(&self) -> usize {
        self.storage.read().root_children.len()
    }

    /// Returns the total number of nodes.
    pub fn node_count(&self) -> usize {
        self.storage.read().nodes.len()
    }

    /// Returns `true` if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.storage.read().root_children.is_empty()
    }

    /// Returns `true` if the node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.storage.read().contains(id)
    }

    /// Returns the children of `parent` (the roots for `None`), in row order.
    pub fn children(&self, parent: Option<NodeId>) -> Vec<NodeId> {
        self.storage.read().children_of(parent).to_vec()
    }

    /// Returns the parent of a node, `None` for roots and unknown nodes.
    pub fn parent_id(&self, id: NodeId) -> Option<NodeId> {
        self.storage.read().parent_of(id)
    }

    /// Returns the node an index refers to.
    pub fn node_id(&self, index: &ModelIndex) -> Option<NodeId> {
        if !index.belongs_to(self) {
            return None;
        }
        let id = index.internal_id();
        self.storage.read().contains(id).then_some(id)
    }

    /// Returns the column-0 index of a node, or an invalid index if it does
    /// not exist.
    pub fn index_of(&self, id: NodeId) -> ModelIndex {
        let row = self.storage.read().row_of(id);
        match row {
            Some(row) => self.create_index(row, 0, None, id),
            None => ModelIndex::invalid(),
        }
    }

    fn parent_index(&self, parent: Option<NodeId>) -> ModelIndex {
        parent.map_or_else(ModelIndex::invalid, |id| self.index_of(id))
    }

    /// Adds a root-level node and returns its ID.
    pub fn add_root(&self, data: T) -> NodeId {
        let row = self.root_count();
        self.insert_rows_with(&ModelIndex::invalid(), row, row, || {
            self.storage.write().insert(None, row, data)
        })
    }

    /// Appends a child to `parent_id` and returns its ID.
    pub fn add_child(&self, parent_id: NodeId, data: T) -> Result<NodeId> {
        let row = {
            let storage = self.storage.read();
            if !storage.contains(parent_id) {
                return Err(ModelError::NodeNotFound(parent_id));
            }
            storage.child_count(Some(parent_id))
        };
        self.insert_child(Some(parent_id), row, data)
    }

    /// Inserts a node at `row` under `parent` (the root for `None`).
    pub fn insert_child(&self, parent: Option<NodeId>, row: usize, data: T) -> Result<NodeId> {
        {
            let storage = self.storage.read();
            if let Some(id) = parent.filter(|&id| !storage.contains(id)) {
                return Err(ModelError::NodeNotFound(id));
            }
            let count = storage.child_count(parent);
            if row > count {
                return Err(ModelError::row_out_of_range(row, count));
            }
        }
        let parent_index = self.parent_index(parent);
        Ok(self.insert_rows_with(&parent_index, row, row, || {
            self.storage.write().insert(parent, row, data)
        }))
    }

    /// Removes a node and all its descendants, returning the node's data.
    pub fn remove(&self, id: NodeId) -> Result<T> {
        let _perf = PerfSpan::new("tree_remove");
        let (parent, row) = {
            let storage = self.storage.read();
            let row = storage.row_of(id).ok_or(ModelError::NodeNotFound(id))?;
            (storage.parent_of(id), row)
        };
        let parent_index = self.parent_index(parent);
        self.delete_rows_with(&parent_index, row, row, || {
            self.storage.write().remove_node(id)
        })
        .flatten()
        .ok_or(ModelError::NodeNotFound(id))
    }

    /// Moves a node (with its subtree) so that it ends up at `row` under
    /// `new_parent` (the root for `None`).
    ///
    /// When the node stays under the same parent, `row` is its final
    /// position among its siblings.
    pub fn move_node(&self, id: NodeId, new_parent: Option<NodeId>, row: usize) -> Result<()> {
        let (old_parent, old_row) = {
            let storage = self.storage.read();
            let old_row = storage.row_of(id).ok_or(ModelError::NodeNotFound(id))?;
            if let Some(target) = new_parent {
                if !storage.contains(target) {
                    return Err(ModelError::NodeNotFound(target));
                }
                if storage.is_within(target, id) {
                    return Err(ModelError::invalid_move(format!(
                        "node {id} cannot be moved below itself"
                    )));
                }
            }
            let old_parent = storage.parent_of(id);
            let count = storage.child_count(new_parent);
            let limit = if old_parent == new_parent { count - 1 } else { count };
            if row > limit {
                return Err(ModelError::row_out_of_range(row, limit + 1));
            }
            (old_parent, old_row)
        };

        if old_parent == new_parent && old_row == row {
            return Ok(());
        }

        let source_index = self.parent_index(old_parent);
        let target_index = self.parent_index(new_parent);
        tracing::trace!(target: targets::DATA_SOURCE, id, old_row, row, "moving tree node");
        self.move_rows_with(&source_index, old_row, old_row, &target_index, row, || {
            self.storage.write().relink(id, new_parent, row);
        });
        Ok(())
    }

    /// Removes every node.
    pub fn clear(&self) {
        let roots = self.root_count();
        if roots == 0 {
            return;
        }
        self.delete_rows_with(&ModelIndex::invalid(), 0, roots - 1, || {
            self.storage.write().clear();
        });
    }

    /// Provides read access to a node's data.
    pub fn with_node<F, R>(&self, id: NodeId, f: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        let storage = self.storage.read();
        storage.nodes.get(&id).map(|node| f(&node.data))
    }

    /// Provides mutable access to a node's data.
    ///
    /// Views and clients are notified with `on_model_update`.
    pub fn modify_node<F, R>(&self, id: NodeId, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let result = {
            let mut storage = self.storage.write();
            let node = storage.nodes.get_mut(&id)?;
            f(&mut node.data)
        };
        self.invalidate(UpdateFlags::DONT_INVALIDATE_INDEXES);
        Some(result)
    }

    /// Gets the node ID a parent index refers to; `None` for the root.
    fn parent_node_id(&self, parent: &ModelIndex) -> Option<NodeId> {
        parent.is_valid().then(|| parent.internal_id())
    }
}

impl<T: Send + Sync + 'static> ItemModel for TreeModel<T> {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        let storage = self.storage.read();
        match self.parent_node_id(parent) {
            Some(id) if !storage.contains(id) => 0,
            parent_id => storage.child_count(parent_id),
        }
    }

    fn column_count(&self, _parent: &ModelIndex) -> usize {
        self.column_count
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column >= self.column_count {
            return ModelIndex::invalid();
        }
        let parent_id = self.parent_node_id(parent);
        let child = {
            let storage = self.storage.read();
            if parent_id.is_some_and(|id| !storage.contains(id)) {
                return ModelIndex::invalid();
            }
            storage.child_at(parent_id, row)
        };
        match child {
            Some(id) => self.create_index(row, column, None, id),
            None => ModelIndex::invalid(),
        }
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        if !index.is_valid() {
            return ModelIndex::invalid();
        }
        let position = {
            let storage = self.storage.read();
            storage
                .parent_of(index.internal_id())
                .and_then(|parent_id| Some((storage.row_of(parent_id)?, parent_id)))
        };
        match position {
            Some((row, parent_id)) => self.create_index(row, 0, None, parent_id),
            None => ModelIndex::invalid(),
        }
    }

    fn data(&self, index: &ModelIndex, role: ModelRole) -> Variant {
        if !index.belongs_to(self) {
            return Variant::Invalid;
        }
        let storage = self.storage.read();
        match storage.nodes.get(&index.internal_id()) {
            Some(node) => (self.extractor)(&node.data, index.column(), role),
            None => Variant::Invalid,
        }
    }

    fn state(&self) -> &ModelState {
        &self.state
    }

    fn has_children(&self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct FileNode {
        name: String,
        is_dir: bool,
    }

    impl TreeNodeData for FileNode {
        fn display(&self) -> Variant {
            Variant::from(self.name.as_str())
        }

        fn tooltip(&self) -> Variant {
            if self.is_dir {
                Variant::from("Directory")
            } else {
                Variant::from("File")
            }
        }
    }

    fn dir(name: &str) -> FileNode {
        FileNode {
            name: name.into(),
            is_dir: true,
        }
    }

    fn file(name: &str) -> FileNode {
        FileNode {
            name: name.into(),
            is_dir: false,
        }
    }

    fn names(model: &TreeModel<FileNode>, parent: Option<NodeId>) -> Vec<String> {
        model
            .children(parent)
            .into_iter()
            .filter_map(|id| model.with_node(id, |n| n.name.clone()))
            .collect()
    }

    #[test]
    fn test_tree_model_basic() {
        let model = TreeModel::<FileNode>::new();
        model.add_root(dir("Documents"));

        assert_eq!(model.root_count(), 1);
        assert_eq!(model.row_count(&ModelIndex::invalid()), 1);

        let index = model.index(0, 0, &ModelIndex::invalid());
        assert!(index.is_valid());
        assert_eq!(model.display_text(&index).as_deref(), Some("Documents"));
        assert_eq!(model.data(&index, ModelRole::ToolTip).as_str(), Some("Directory"));
    }

    #[test]
    fn test_tree_model_hierarchy() {
        let model = TreeModel::<FileNode>::new();
        let root = model.add_root(dir("Root"));
        let child1 = model.add_child(root, dir("Child1")).unwrap();
        model.add_child(root, file("Child2")).unwrap();
        let grandchild = model.add_child(child1, file("Grandchild")).unwrap();

        let root_index = model.index(0, 0, &ModelIndex::invalid());
        assert_eq!(model.row_count(&root_index), 2);

        let child1_index = model.index(0, 0, &root_index);
        assert_eq!(model.display_text(&child1_index).as_deref(), Some("Child1"));
        assert_eq!(model.row_count(&child1_index), 1);

        let grandchild_index = model.index(0, 0, &child1_index);
        assert_eq!(model.node_id(&grandchild_index), Some(grandchild));
        assert_eq!(grandchild_index.depth(), 2);
        assert!(grandchild_index.is_descendant_of(&root_index));

        let parent = model.parent(&grandchild_index);
        assert_eq!(parent, child1_index);
        assert_eq!(model.index_of(child1), child1_index);
        assert_eq!(model.parent_id(child1), Some(root));
    }

    #[test]
    fn test_sibling_validates_against_parent() {
        let model = TreeModel::<FileNode>::new();
        let root = model.add_root(dir("Root"));
        model.add_child(root, file("a")).unwrap();
        let root_index = model.index_of(root);

        assert!(model.sibling(0, 0, &root_index).is_valid());
        assert!(!model.sibling(1, 0, &root_index).is_valid());
    }

    #[test]
    fn test_insert_child() {
        let model = TreeModel::<FileNode>::new();
        let root = model.add_root(dir("Root"));
        model.add_child(root, file("b")).unwrap();
        model.insert_child(Some(root), 0, file("a")).unwrap();
        model.insert_child(None, 0, dir("First")).unwrap();

        assert_eq!(names(&model, Some(root)), vec!["a", "b"]);
        assert_eq!(names(&model, None), vec!["First", "Root"]);
        assert_eq!(
            model.insert_child(Some(root), 5, file("z")).unwrap_err(),
            ModelError::row_out_of_range(5, 2)
        );
        assert_eq!(
            model.add_child(9999, file("z")).unwrap_err(),
            ModelError::NodeNotFound(9999)
        );
    }

    #[test]
    fn test_remove_expires_subtree() {
        let model = TreeModel::<FileNode>::new();
        let root = model.add_root(dir("Root"));
        let folder = model.add_child(root, dir("Folder")).unwrap();
        let inner = model.add_child(folder, file("inner")).unwrap();
        let keep = model.add_child(root, file("keep")).unwrap();

        let tracked_inner = model.register_persistent_index(&model.index_of(inner));
        let tracked_keep = model.register_persistent_index(&model.index_of(keep));
        assert_eq!(tracked_keep.row(), Some(1));

        let removed = model.remove(folder).unwrap();
        assert_eq!(removed.name, "Folder");
        assert!(!model.contains(inner));
        assert!(!tracked_inner.is_valid());
        assert_eq!(tracked_keep.row(), Some(0));
        assert_eq!(model.node_count(), 2);
        assert_eq!(model.remove(folder).unwrap_err(), ModelError::NodeNotFound(folder));
    }

    #[test]
    fn test_move_node_across_parents() {
        let model = TreeModel::<FileNode>::new();
        let a = model.add_root(dir("A"));
        let b = model.add_root(dir("B"));
        let a1 = model.add_child(a, file("a1")).unwrap();
        let a2 = model.add_child(a, file("a2")).unwrap();
        let b1 = model.add_child(b, file("b1")).unwrap();

        let tracked_a1 = model.register_persistent_index(&model.index_of(a1));
        let tracked_a2 = model.register_persistent_index(&model.index_of(a2));
        let tracked_b1 = model.register_persistent_index(&model.index_of(b1));

        model.move_node(a1, Some(b), 0).unwrap();

        assert_eq!(names(&model, Some(a)), vec!["a2"]);
        assert_eq!(names(&model, Some(b)), vec!["a1", "b1"]);
        assert_eq!(tracked_a1.index(), model.index_of(a1));
        assert_eq!(model.node_id(&tracked_a1.index().parent()), Some(b));
        assert_eq!(tracked_a2.row(), Some(0));
        assert_eq!(tracked_b1.row(), Some(1));
    }

    #[test]
    fn test_move_node_within_parent() {
        let model = TreeModel::<String>::new();
        let ids: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|name| model.add_root(name.to_string()))
            .collect();
        let tracked: Vec<_> = ids
            .iter()
            .map(|&id| model.register_persistent_index(&model.index_of(id)))
            .collect();

        model.move_node(ids[0], None, 3).unwrap();
        for (id, persistent) in ids.iter().zip(&tracked) {
            assert_eq!(persistent.index(), model.index_of(*id));
        }
        assert_eq!(tracked[0].row(), Some(3));
        assert_eq!(tracked[1].row(), Some(0));
    }

    #[test]
    fn test_move_node_rejects_cycles() {
        let model = TreeModel::<FileNode>::new();
        let root = model.add_root(dir("Root"));
        let child = model.add_child(root, dir("Child")).unwrap();

        assert!(matches!(
            model.move_node(root, Some(child), 0),
            Err(ModelError::InvalidMove(_))
        ));
        assert!(matches!(
            model.move_node(root, Some(root), 0),
            Err(ModelError::InvalidMove(_))
        ));
        assert!(model.move_node(child, None, 5).is_err());
        assert_eq!(model.state().pending_operations(), 0);
    }

    #[test]
    fn test_clear() {
        let model = TreeModel::<FileNode>::new();
        let root = model.add_root(dir("Root1"));
        model.add_root(dir("Root2"));
        let child = model.add_child(root, file("child")).unwrap();
        let tracked = model.register_persistent_index(&model.index_of(child));

        model.clear();
        assert!(model.is_empty());
        assert_eq!(model.node_count(), 0);
        assert!(!tracked.is_valid());
    }

    #[test]
    fn test_extractor_columns() {
        struct Entry {
            label: String,
            size: u64,
        }

        let model = TreeModel::with_extractor(2, |entry: &Entry, column, role| {
            match (column, role) {
                (0, ModelRole::Display) => Variant::from(entry.label.as_str()),
                (1, ModelRole::Display) => Variant::from(entry.size),
                _ => Variant::Invalid,
            }
        });
        let root = model.add_root(Entry {
            label: "disk".into(),
            size: 512,
        });

        let size = model.index(0, 1, &ModelIndex::invalid());
        assert_eq!(model.node_id(&size), Some(root));
        assert_eq!(model.data(&size, ModelRole::Display).as_uint(), Some(512));
        assert!(!model.index(0, 2, &ModelIndex::invalid()).is_valid());
    }

    #[test]
    fn test_modify_node() {
        let model = TreeModel::<String>::new();
        let id = model.add_root("old".to_string());
        assert_eq!(model.modify_node(id, |s| std::mem::replace(s, "new".into())).as_deref(), Some("old"));
        assert_eq!(model.display_text(&model.index_of(id)).as_deref(), Some("new"));
    }
}
