//! Model index for addressing items in hierarchical models.
//!
//! The `ModelIndex` type is the fundamental way to reference items within
//! an `ItemModel`. It carries a row, a column, model-specific identification
//! and a non-owning reference to the model that created it.

use std::any::Any;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use super::traits::ItemModel;
use super::variant::{ModelRole, Variant};

/// Opaque per-item payload a model can attach to its indices.
pub type InternalData = Arc<dyn Any + Send + Sync>;

/// Represents a position within an `ItemModel`.
///
/// `ModelIndex` is used by views, delegates and selections to locate items
/// within a model. Each index contains:
/// - Row and column within the parent
/// - An internal ID and optional internal data for model-specific identification
/// - A weak back-reference to the owning model
///
/// The parent is not stored: [`parent`](Self::parent) asks the owning model.
/// Indices are created only through [`ItemModel::create_index`].
///
/// # Index Validity
///
/// Model indices should be used immediately and not stored long-term.
/// After model modifications (insertions, deletions, moves), previously
/// obtained indices may point at different items. Use
/// [`ItemModel::register_persistent_index`] for references that must follow
/// structural changes.
///
/// # Equality
///
/// Two indices are equal when they belong to the same model instance and
/// have the same row, column and internal ID. Internal data is not compared.
/// All invalid indices are equal.
#[derive(Clone, Default)]
pub struct ModelIndex {
    /// The row within the parent.
    row: usize,
    /// The column within the parent.
    column: usize,
    /// Model-specific payload, typically a handle to the backing node.
    internal_data: Option<InternalData>,
    /// Model-specific identifier.
    internal_id: u64,
    /// The model that created this index. `None` for invalid indices.
    model: Option<Weak<dyn ItemModel>>,
}

impl ModelIndex {
    /// Creates an invalid (null) model index.
    ///
    /// An invalid index is used to represent:
    /// - The root of the model (as a parent reference)
    /// - A non-existent or out-of-bounds item
    /// - An expired persistent index
    #[inline]
    pub const fn invalid() -> Self {
        Self {
            row: 0,
            column: 0,
            internal_data: None,
            internal_id: 0,
            model: None,
        }
    }

    pub(crate) fn new(
        model: Weak<dyn ItemModel>,
        row: usize,
        column: usize,
        internal_data: Option<InternalData>,
        internal_id: u64,
    ) -> Self {
        Self {
            row,
            column,
            internal_data,
            internal_id,
            model: Some(model),
        }
    }

    /// Returns a copy of this index moved to another position, keeping the
    /// model, internal data and internal ID.
    pub(crate) fn relocated(&self, row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            ..self.clone()
        }
    }

    /// Returns `true` if this is a valid index.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.model.is_some()
    }

    /// Returns the row of this index within its parent.
    ///
    /// Returns 0 for invalid indices.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns the column of this index within its parent.
    ///
    /// Returns 0 for invalid indices.
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns the internal ID associated with this index.
    #[inline]
    pub fn internal_id(&self) -> u64 {
        self.internal_id
    }

    /// Returns the internal data associated with this index, if any.
    #[inline]
    pub fn internal_data(&self) -> Option<&InternalData> {
        self.internal_data.as_ref()
    }

    /// Returns the internal data downcast to a concrete type.
    pub fn internal_data_as<T: Any>(&self) -> Option<&T> {
        self.internal_data.as_ref()?.downcast_ref::<T>()
    }

    /// Returns the owning model, if this index is valid and the model is alive.
    pub fn model(&self) -> Option<Arc<dyn ItemModel>> {
        self.model.as_ref()?.upgrade()
    }

    /// Returns `true` if this index was created by `model`.
    pub fn belongs_to<M: ItemModel + ?Sized>(&self, model: &M) -> bool {
        self.model
            .as_ref()
            .is_some_and(|weak| std::ptr::addr_eq(weak.as_ptr(), model as *const M))
    }

    /// Returns the parent index, computed by the owning model.
    ///
    /// Returns an invalid index for root items, invalid indices, and indices
    /// whose model has been dropped.
    pub fn parent(&self) -> ModelIndex {
        match self.model() {
            Some(model) => model.parent(self),
            None => ModelIndex::invalid(),
        }
    }

    /// Returns the data stored under `role` for this item.
    pub fn data(&self, role: ModelRole) -> Variant {
        match self.model() {
            Some(model) => model.data(self, role),
            None => Variant::Invalid,
        }
    }

    /// Returns the sibling at `(row, column)`, validated by the model.
    pub fn sibling(&self, row: usize, column: usize) -> ModelIndex {
        match self.model() {
            Some(model) => model.sibling(row, column, &self.parent()),
            None => ModelIndex::invalid(),
        }
    }

    /// Returns the depth of this index in the tree hierarchy.
    ///
    /// Root-level items have depth 0. Returns 0 for invalid indices.
    pub fn depth(&self) -> usize {
        self.ancestors().len()
    }

    /// Returns the chain of ancestors from this index up to (but not including) the root.
    ///
    /// The first element is the immediate parent, and the last is the
    /// top-level ancestor.
    pub fn ancestors(&self) -> Vec<ModelIndex> {
        let mut ancestors = Vec::new();
        let Some(model) = self.model() else {
            return ancestors;
        };
        let mut current = model.parent(self);
        while current.is_valid() {
            let next = model.parent(&current);
            ancestors.push(current);
            current = next;
        }
        ancestors
    }

    /// Checks if this index is a descendant of the given ancestor.
    ///
    /// Returns `false` if either index is invalid or if `ancestor` is not
    /// actually an ancestor of this index.
    pub fn is_descendant_of(&self, ancestor: &ModelIndex) -> bool {
        if !self.is_valid() || !ancestor.is_valid() {
            return false;
        }
        self.ancestors().iter().any(|a| a == ancestor)
    }

    /// Address of the owning model, used for identity comparison and hashing.
    fn model_addr(&self) -> Option<*const ()> {
        self.model.as_ref().map(|weak| weak.as_ptr() as *const ())
    }
}

impl std::fmt::Debug for ModelIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            f.debug_struct("ModelIndex")
                .field("row", &self.row)
                .field("column", &self.column)
                .field("internal_id", &self.internal_id)
                .field("has_data", &self.internal_data.is_some())
                .finish()
        } else {
            write!(f, "ModelIndex(invalid)")
        }
    }
}

impl PartialEq for ModelIndex {
    fn eq(&self, other: &Self) -> bool {
        match (self.model_addr(), other.model_addr()) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a == b
                    && self.row == other.row
                    && self.column == other.column
                    && self.internal_id == other.internal_id
            }
            _ => false,
        }
    }
}

impl Eq for ModelIndex {}

impl Hash for ModelIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.model_addr() {
            None => false.hash(state),
            Some(addr) => {
                true.hash(state);
                (addr as usize).hash(state);
                self.row.hash(state);
                self.column.hash(state);
                self.internal_id.hash(state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ListModel;

    #[test]
    fn test_invalid_index() {
        let index = ModelIndex::invalid();
        assert!(!index.is_valid());
        assert_eq!(index.row(), 0);
        assert_eq!(index.column(), 0);
        assert!(!index.parent().is_valid());
        assert!(index.model().is_none());
    }

    #[test]
    fn test_valid_index() {
        let model = ListModel::new(vec!["a".to_string(), "b".to_string()]);
        let index = model.index(1, 0, &ModelIndex::invalid());
        assert!(index.is_valid());
        assert_eq!(index.row(), 1);
        assert_eq!(index.column(), 0);
        assert!(index.belongs_to(&*model));
        assert!(!index.parent().is_valid());
        assert_eq!(index.data(ModelRole::Display).as_str(), Some("b"));
    }

    #[test]
    fn test_equality() {
        // Two invalid indices are equal
        assert_eq!(ModelIndex::invalid(), ModelIndex::invalid());

        let model = ListModel::new(vec!["a".to_string(), "b".to_string()]);
        let root = ModelIndex::invalid();
        assert_eq!(model.index(1, 0, &root), model.index(1, 0, &root));
        assert_ne!(model.index(0, 0, &root), model.index(1, 0, &root));
        assert_ne!(model.index(0, 0, &root), ModelIndex::invalid());

        // Same position in a different model instance is a different index
        let other = ListModel::new(vec!["a".to_string(), "b".to_string()]);
        assert_ne!(model.index(0, 0, &root), other.index(0, 0, &root));
    }

    #[test]
    fn test_internal_data_ignored_by_equality() {
        let model = ListModel::new(vec!["a".to_string()]);
        let plain = model.create_index(0, 0, None, 5);
        let with_data = model.create_index(0, 0, Some(Arc::new(17u32)), 5);
        assert_eq!(plain, with_data);
        assert_eq!(with_data.internal_data_as::<u32>(), Some(&17));
    }

    #[test]
    fn test_index_outlives_model() {
        let model = ListModel::new(vec!["a".to_string()]);
        let index = model.index(0, 0, &ModelIndex::invalid());
        drop(model);
        assert!(index.is_valid());
        assert!(index.model().is_none());
        assert!(!index.parent().is_valid());
        assert!(!index.data(ModelRole::Display).is_valid());
    }
}
