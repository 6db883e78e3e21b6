//! Generic list model implementation.
//!
//! `ListModel<T>` provides a simple way to expose a list of items to views.
//! It supports both trait-based and closure-based approaches for data
//! extraction. Every mutation goes through the structural transaction API,
//! so persistent indices into the list follow their items.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use trellis_core::logging::targets;
use trellis_core::{ModelError, Result};

use super::config::ModelConfig;
use super::index::ModelIndex;
use super::operation::move_block;
use super::state::ModelState;
use super::traits::{ItemFlags, ItemModel, UpdateFlags};
use super::variant::{ModelRole, Variant};

/// Trait for items that can provide their own display data.
///
/// Implement this trait for types that should be directly usable in a
/// `ListModel` without requiring external data extractors.
///
/// # Example
///
/// ```
/// use trellis::model::{ListItem, Variant};
///
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// impl ListItem for Person {
///     fn display(&self) -> Variant {
///         Variant::from(&self.name)
///     }
/// }
/// ```
pub trait ListItem: Send + Sync {
    /// Returns the primary display text for this item.
    fn display(&self) -> Variant;

    /// Returns the icon for this item.
    fn icon(&self) -> Variant {
        Variant::Invalid
    }

    /// Returns the tooltip text for this item.
    fn tooltip(&self) -> Variant {
        Variant::Invalid
    }

    /// Returns the edit value for this item.
    fn edit(&self) -> Variant {
        self.display()
    }

    /// Returns data for any other role.
    fn data(&self, _role: ModelRole) -> Variant {
        Variant::Invalid
    }

    /// Returns the flags for this item.
    fn flags(&self) -> ItemFlags {
        ItemFlags::new()
    }
}

impl ListItem for String {
    fn display(&self) -> Variant {
        Variant::from(self.as_str())
    }
}

/// Type alias for a data extractor function.
pub type DataExtractor<T> = Arc<dyn Fn(&T, ModelRole) -> Variant + Send + Sync>;

/// Type alias for a flags extractor function.
pub type FlagsExtractor<T> = Arc<dyn Fn(&T) -> ItemFlags + Send + Sync>;

fn list_item_data<T: ListItem>(item: &T, role: ModelRole) -> Variant {
    match role {
        ModelRole::Display => item.display(),
        ModelRole::Icon => item.icon(),
        ModelRole::ToolTip => item.tooltip(),
        ModelRole::Edit => item.edit(),
        _ => item.data(role),
    }
}

/// A generic list model: one column of rows under the root.
///
/// `ListModel<T>` can be used in two ways:
///
/// 1. **Trait-based**: Items implement `ListItem` and provide their own data.
/// 2. **Closure-based**: A data extractor function is provided at construction.
///
/// Models are returned inside an `Arc`, since indices hold a weak reference
/// back to the model that created them.
///
/// # Example
///
/// ```
/// use trellis::model::{ItemModel, ListModel, ModelIndex};
///
/// let model = ListModel::new(vec!["Apple".to_string(), "Banana".to_string()]);
/// let cherry = model.register_persistent_index(&model.index(1, 0, &ModelIndex::invalid()));
///
/// model.insert(0, "Cherry".to_string()).unwrap();
/// assert_eq!(cherry.row(), Some(2));
/// ```
pub struct ListModel<T> {
    items: RwLock<Vec<T>>,
    extractor: DataExtractor<T>,
    flags_extractor: Option<FlagsExtractor<T>>,
    state: ModelState,
}

impl<T: ListItem + 'static> ListModel<T> {
    /// Creates a new list model with items that implement `ListItem`.
    pub fn new(items: Vec<T>) -> Arc<Self> {
        Self::with_config(items, ModelConfig::default())
    }

    /// Creates a new list model with the given configuration.
    pub fn with_config(items: Vec<T>, config: ModelConfig) -> Arc<Self> {
        Self::build(
            items,
            Arc::new(list_item_data::<T>),
            Some(Arc::new(|item: &T| item.flags())),
            config,
        )
    }

    /// Creates an empty list model.
    pub fn empty() -> Arc<Self> {
        Self::new(Vec::new())
    }
}

impl<T: Send + Sync + 'static> ListModel<T> {
    /// Creates a list model with a data extractor.
    ///
    /// The extractor function is called to get data for each item and role.
    pub fn with_extractor<F>(items: Vec<T>, extractor: F) -> Arc<Self>
    where
        F: Fn(&T, ModelRole) -> Variant + Send + Sync + 'static,
    {
        Self::build(items, Arc::new(extractor), None, ModelConfig::default())
    }

    /// Creates a list model with both data and flags extractors.
    pub fn with_extractors<D, Fl>(items: Vec<T>, data_extractor: D, flags_extractor: Fl) -> Arc<Self>
    where
        D: Fn(&T, ModelRole) -> Variant + Send + Sync + 'static,
        Fl: Fn(&T) -> ItemFlags + Send + Sync + 'static,
    {
        Self::build(
            items,
            Arc::new(data_extractor),
            Some(Arc::new(flags_extractor)),
            ModelConfig::default(),
        )
    }

    fn build(
        items: Vec<T>,
        extractor: DataExtractor<T>,
        flags_extractor: Option<FlagsExtractor<T>>,
        config: ModelConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| Self {
            items: RwLock::new(items),
            extractor,
            flags_extractor,
            state: ModelState::with_config(weak.clone(), config),
        })
    }

    /// Returns the number of items in the model.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the model is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Returns a reference to the items (read-only access).
    pub fn items(&self) -> impl std::ops::Deref<Target = Vec<T>> + '_ {
        self.items.read()
    }

    /// Returns a copy of the item at `row`.
    pub fn get(&self, row: usize) -> Option<T>
    where
        T: Clone,
    {
        self.items.read().get(row).cloned()
    }

    /// Appends an item to the end of the list.
    pub fn push(&self, item: T) {
        let row = self.len();
        self.insert_rows_with(&ModelIndex::invalid(), row, row, || {
            self.items.write().push(item);
        });
    }

    /// Inserts an item at `row`, shifting later items down.
    pub fn insert(&self, row: usize, item: T) -> Result<()> {
        self.insert_many(row, vec![item])
    }

    /// Inserts several items starting at `row`.
    pub fn insert_many(&self, row: usize, items: Vec<T>) -> Result<()> {
        let len = self.len();
        if row > len {
            return Err(ModelError::row_out_of_range(row, len));
        }
        if items.is_empty() {
            return Ok(());
        }
        let last = row + items.len() - 1;
        self.insert_rows_with(&ModelIndex::invalid(), row, last, || {
            let mut storage = self.items.write();
            let tail = storage.split_off(row);
            storage.extend(items);
            storage.extend(tail);
        });
        Ok(())
    }

    /// Removes and returns the item at `row`.
    pub fn remove(&self, row: usize) -> Result<T> {
        let mut removed = self.remove_range(row, row)?;
        removed
            .pop()
            .ok_or_else(|| ModelError::row_out_of_range(row, self.len()))
    }

    /// Removes and returns the items in `first..=last`.
    pub fn remove_range(&self, first: usize, last: usize) -> Result<Vec<T>> {
        let len = self.len();
        if first > last {
            return Err(ModelError::row_out_of_range(first, len));
        }
        self.delete_rows_with(&ModelIndex::invalid(), first, last, || {
            self.items.write().drain(first..=last).collect()
        })
        .ok_or_else(|| {
            tracing::debug!(target: targets::DATA_SOURCE, first, last, len, "remove out of range");
            ModelError::row_out_of_range(last, len)
        })
    }

    /// Moves the items in `first..=last` so that the first of them ends up at
    /// `target`.
    pub fn move_rows(&self, first: usize, last: usize, target: usize) -> Result<()> {
        let len = self.len();
        if first > last || last >= len {
            return Err(ModelError::row_out_of_range(last, len));
        }
        let count = last - first + 1;
        if target > len - count {
            return Err(ModelError::invalid_move(format!(
                "cannot place {count} row(s) at {target} in a list of {len}"
            )));
        }
        let root = ModelIndex::invalid();
        self.move_rows_with(&root, first, last, &root, target, || {
            move_block(&mut self.items.write(), first, last, target);
        });
        Ok(())
    }

    /// Replaces the item at `row`, returning the previous one.
    ///
    /// This is a data change: views and clients are told through
    /// `on_model_update` and no persistent index moves.
    pub fn set(&self, row: usize, item: T) -> Result<T> {
        let previous = {
            let mut storage = self.items.write();
            let len = storage.len();
            let slot = storage
                .get_mut(row)
                .ok_or_else(|| ModelError::row_out_of_range(row, len))?;
            std::mem::replace(slot, item)
        };
        self.invalidate(UpdateFlags::DONT_INVALIDATE_INDEXES);
        Ok(previous)
    }

    /// Provides mutable access to an item via a closure.
    pub fn modify<F, R>(&self, row: usize, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let result = {
            let mut storage = self.items.write();
            f(storage.get_mut(row)?)
        };
        self.invalidate(UpdateFlags::DONT_INVALIDATE_INDEXES);
        Some(result)
    }

    /// Removes all items from the model.
    pub fn clear(&self) {
        let len = self.len();
        if len == 0 {
            return;
        }
        self.delete_rows_with(&ModelIndex::invalid(), 0, len - 1, || {
            self.items.write().clear();
        });
    }
}

impl<T: Send + Sync + 'static> ItemModel for ListModel<T> {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        if parent.is_valid() {
            0 // Flat list has no children
        } else {
            self.items.read().len()
        }
    }

    fn column_count(&self, _parent: &ModelIndex) -> usize {
        1
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if parent.is_valid() || column > 0 || row >= self.items.read().len() {
            return ModelIndex::invalid();
        }
        self.create_index(row, column, None, 0)
    }

    fn parent(&self, _index: &ModelIndex) -> ModelIndex {
        ModelIndex::invalid() // Flat list has no parents
    }

    fn data(&self, index: &ModelIndex, role: ModelRole) -> Variant {
        if !index.belongs_to(self) {
            return Variant::Invalid;
        }
        let items = self.items.read();
        match items.get(index.row()) {
            Some(item) => (self.extractor)(item, role),
            None => Variant::Invalid,
        }
    }

    fn state(&self) -> &ModelState {
        &self.state
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        if !index.belongs_to(self) {
            return ItemFlags::disabled();
        }
        let items = self.items.read();
        match (items.get(index.row()), &self.flags_extractor) {
            (Some(item), Some(flags)) => flags(item).with_never_has_children(true),
            (Some(_), None) => ItemFlags::new().with_never_has_children(true),
            (None, _) => ItemFlags::disabled(),
        }
    }

    fn has_children(&self, parent: &ModelIndex) -> bool {
        !parent.is_valid() && !self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelClient;
    use parking_lot::Mutex;

    #[derive(Clone)]
    struct TestItem {
        name: String,
        value: i32,
    }

    impl ListItem for TestItem {
        fn display(&self) -> Variant {
            Variant::from(self.name.as_str())
        }

        fn tooltip(&self) -> Variant {
            Variant::from(format!("Value: {}", self.value))
        }
    }

    fn item(name: &str, value: i32) -> TestItem {
        TestItem {
            name: name.into(),
            value,
        }
    }

    #[derive(Default)]
    struct RowEvents(Mutex<Vec<(&'static str, usize, usize)>>);

    impl ModelClient for RowEvents {
        fn model_did_insert_rows(&self, _parent: &ModelIndex, first: usize, last: usize) {
            self.0.lock().push(("insert", first, last));
        }

        fn model_did_delete_rows(&self, _parent: &ModelIndex, first: usize, last: usize) {
            self.0.lock().push(("delete", first, last));
        }

        fn model_did_move_rows(
            &self,
            _source_parent: &ModelIndex,
            first: usize,
            last: usize,
            _target_parent: &ModelIndex,
            target: usize,
        ) {
            self.0.lock().push(("move", first, target + last - first));
        }
    }

    fn display(model: &ListModel<TestItem>) -> Vec<String> {
        model.items().iter().map(|i| i.name.clone()).collect()
    }

    #[test]
    fn test_trait_based_model() {
        let model = ListModel::new(vec![item("First", 1), item("Second", 2)]);

        assert_eq!(model.len(), 2);
        assert_eq!(model.row_count(&ModelIndex::invalid()), 2);
        assert_eq!(model.column_count(&ModelIndex::invalid()), 1);

        let index = model.index(0, 0, &ModelIndex::invalid());
        assert!(index.is_valid());
        assert_eq!(model.data(&index, ModelRole::Display).as_str(), Some("First"));
        assert_eq!(model.data(&index, ModelRole::ToolTip).as_str(), Some("Value: 1"));
        assert!(model.flags(&index).never_has_children);
    }

    #[test]
    fn test_closure_based_model() {
        struct Person {
            name: String,
            age: u32,
        }

        let model = ListModel::with_extractor(
            vec![
                Person {
                    name: "Alice".into(),
                    age: 30,
                },
                Person {
                    name: "Bob".into(),
                    age: 25,
                },
            ],
            |person, role| match role {
                ModelRole::Display => Variant::from(person.name.as_str()),
                ModelRole::ToolTip => Variant::from(format!("Age: {}", person.age)),
                _ => Variant::Invalid,
            },
        );

        let index = model.index(1, 0, &ModelIndex::invalid());
        assert_eq!(model.display_text(&index).as_deref(), Some("Bob"));
        assert!(!model.index(2, 0, &ModelIndex::invalid()).is_valid());
        assert!(!model.index(0, 1, &ModelIndex::invalid()).is_valid());
    }

    #[test]
    fn test_mutations_notify_clients() {
        let model = ListModel::<TestItem>::empty();
        let events = Arc::new(RowEvents::default());
        let client: Arc<dyn ModelClient> = events.clone();
        model.register_client(&client);

        model.push(item("a", 1));
        model.push(item("b", 2));
        model.insert(0, item("c", 3)).unwrap();
        model.move_rows(0, 0, 2).unwrap();
        let removed = model.remove(1).unwrap();

        assert_eq!(removed.name, "b");
        assert_eq!(display(&model), vec!["a", "c"]);
        assert_eq!(
            *events.0.lock(),
            vec![
                ("insert", 0, 0),
                ("insert", 1, 1),
                ("insert", 0, 0),
                ("move", 0, 2),
                ("delete", 1, 1),
            ]
        );
    }

    #[test]
    fn test_persistent_index_follows_item() {
        let model = ListModel::new(vec![item("a", 1), item("b", 2), item("c", 3)]);
        let root = ModelIndex::invalid();
        let c = model.register_persistent_index(&model.index(2, 0, &root));
        let a = model.register_persistent_index(&model.index(0, 0, &root));

        model.insert_many(1, vec![item("x", 0), item("y", 0)]).unwrap();
        assert_eq!(c.row(), Some(4));
        assert_eq!(a.row(), Some(0));

        model.move_rows(4, 4, 0).unwrap();
        assert_eq!(display(&model), vec!["c", "a", "x", "y", "b"]);
        assert_eq!(c.row(), Some(0));
        assert_eq!(a.row(), Some(1));
        assert_eq!(model.display_text(&a.index()).as_deref(), Some("a"));

        model.remove(1).unwrap();
        assert!(!a.is_valid());
        assert_eq!(c.row(), Some(0));
    }

    #[test]
    fn test_out_of_range_errors() {
        let model = ListModel::new(vec![item("a", 1)]);
        assert_eq!(
            model.insert(3, item("z", 0)).unwrap_err(),
            ModelError::row_out_of_range(3, 1)
        );
        assert!(model.remove(1).is_err());
        assert!(model.set(5, item("z", 0)).is_err());
        assert!(matches!(
            model.move_rows(0, 0, 1),
            Err(ModelError::InvalidMove(_))
        ));
        assert!(matches!(
            model.move_rows(0, 0, usize::MAX),
            Err(ModelError::InvalidMove(_))
        ));
        assert_eq!(model.len(), 1);
        assert_eq!(model.state().pending_operations(), 0);
    }

    #[test]
    fn test_set_is_data_change() {
        let model = ListModel::new(vec!["one".to_string(), "two".to_string()]);
        let tracked = model.register_persistent_index(&model.index(1, 0, &ModelIndex::invalid()));

        let previous = model.set(1, "deux".to_string()).unwrap();
        assert_eq!(previous, "two");
        assert_eq!(model.get(1).as_deref(), Some("deux"));
        assert_eq!(tracked.row(), Some(1));
    }

    #[test]
    fn test_modify() {
        let model = ListModel::new(vec![item("Original", 1)]);
        assert_eq!(model.modify(0, |i| std::mem::replace(&mut i.value, 7)), Some(1));
        assert_eq!(model.modify(3, |i| i.value), None);

        let index = model.index(0, 0, &ModelIndex::invalid());
        assert_eq!(model.data(&index, ModelRole::ToolTip).as_str(), Some("Value: 7"));
    }

    #[test]
    fn test_clear_expires_everything() {
        let model = ListModel::new(vec!["a".to_string(), "b".to_string()]);
        let root = ModelIndex::invalid();
        let tracked: Vec<_> = (0..2)
            .map(|r| model.register_persistent_index(&model.index(r, 0, &root)))
            .collect();

        model.clear();
        assert!(model.is_empty());
        assert!(tracked.iter().all(|p| !p.is_valid()));
        assert_eq!(model.persistent_index_count(), 0);
    }
}
