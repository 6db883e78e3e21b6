//! Core traits for the model layer.
//!
//! This module defines the [`ItemModel`] contract that data sources
//! implement, together with the two observer interfaces: [`ModelView`] for
//! coarse "something changed" notifications and [`ModelClient`] for
//! per-transaction structural notifications.

use std::sync::Arc;

use parking_lot::Mutex;
use trellis_core::ObserverId;

use super::index::{InternalData, ModelIndex};
use super::operation::Direction;
use super::persistent::PersistentModelIndex;
use super::state::ModelState;
use super::variant::{ModelRole, Variant};

/// Identifies a registered [`ModelView`].
pub type ViewId = ObserverId;

/// Identifies a registered [`ModelClient`].
pub type ClientId = ObserverId;

slotmap::new_key_type! {
    /// Identifies a subscribed model styler.
    pub struct StylerId;
}

/// Presentation-only decorator consulted by views.
///
/// Receives the index being drawn and its internal data.
pub type ModelStyler = Arc<dyn Fn(&ModelIndex, Option<&InternalData>) -> Variant + Send + Sync>;

/// Flags describing a model update delivered to views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateFlags {
    /// Previously obtained indices must be dropped and re-queried.
    pub invalidate_all_indexes: bool,
    /// Indices remain usable; persistent indices have already been remapped.
    pub dont_invalidate_indexes: bool,
}

impl UpdateFlags {
    /// Indices may no longer be valid.
    pub const INVALIDATE_ALL_INDEXES: Self = Self {
        invalidate_all_indexes: true,
        dont_invalidate_indexes: false,
    };

    /// Indices remain valid.
    pub const DONT_INVALIDATE_INDEXES: Self = Self {
        invalidate_all_indexes: false,
        dont_invalidate_indexes: true,
    };
}

/// Flags indicating what operations are allowed on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    /// Item can be selected.
    pub selectable: bool,
    /// Item can be edited.
    pub editable: bool,
    /// Item is enabled (can interact).
    pub enabled: bool,
    /// Item should never have children (optimizes views).
    pub never_has_children: bool,
}

impl ItemFlags {
    /// Creates flags with all defaults (selectable and enabled only).
    pub fn new() -> Self {
        Self {
            selectable: true,
            enabled: true,
            ..Default::default()
        }
    }

    /// Creates flags for a disabled item.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Creates flags for an editable item.
    pub fn editable() -> Self {
        Self {
            editable: true,
            ..Self::new()
        }
    }

    /// Sets the selectable flag.
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Sets the editable flag.
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the leaf flag.
    pub fn with_never_has_children(mut self, leaf: bool) -> Self {
        self.never_has_children = leaf;
        self
    }
}

/// Receives a coarse notification after any change to a model.
pub trait ModelView: Send + Sync {
    /// Called after data changes or after a structural transaction commits.
    fn on_model_update(&self, flags: UpdateFlags);
}

/// Receives one notification per committed structural transaction.
///
/// Every callback runs after all persistent indices have been remapped, and
/// with no model lock held, so a client may query the model or start another
/// transaction from inside a callback. All methods default to doing nothing.
#[allow(unused_variables)]
pub trait ModelClient: Send + Sync {
    /// Rows `first..=last` were inserted under `parent`.
    fn model_did_insert_rows(&self, parent: &ModelIndex, first: usize, last: usize) {}

    /// Columns `first..=last` were inserted under `parent`.
    fn model_did_insert_columns(&self, parent: &ModelIndex, first: usize, last: usize) {}

    /// Rows `first..=last` were deleted from `parent`.
    fn model_did_delete_rows(&self, parent: &ModelIndex, first: usize, last: usize) {}

    /// Columns `first..=last` were deleted from `parent`.
    fn model_did_delete_columns(&self, parent: &ModelIndex, first: usize, last: usize) {}

    /// Rows `first..=last` of `source_parent` now start at `target` under
    /// `target_parent`.
    fn model_did_move_rows(
        &self,
        source_parent: &ModelIndex,
        first: usize,
        last: usize,
        target_parent: &ModelIndex,
        target: usize,
    ) {
    }

    /// Columns `first..=last` of `source_parent` now start at `target` under
    /// `target_parent`.
    fn model_did_move_columns(
        &self,
        source_parent: &ModelIndex,
        first: usize,
        last: usize,
        target_parent: &ModelIndex,
        target: usize,
    ) {
    }

    /// The model's data changed without a structural change.
    fn on_model_update(&self, flags: UpdateFlags) {}
}

/// The core trait for item models.
///
/// `ItemModel` represents hierarchical data addressed by [`ModelIndex`]. A
/// data source implements the required methods; everything else (observer
/// registries, persistent indices, stylers and the structural transaction
/// API) is provided on top of the model's [`ModelState`].
///
/// # Implementation Requirements
///
/// At minimum, you must implement:
/// - [`row_count`](ItemModel::row_count) - Number of rows under a parent
/// - [`column_count`](ItemModel::column_count) - Number of columns
/// - [`index`](ItemModel::index) - Create an index for a position
/// - [`parent`](ItemModel::parent) - Get the parent of an index
/// - [`data`](ItemModel::data) - Data for a given index and role
/// - [`state`](ItemModel::state) - The model's shared bookkeeping
///
/// Models are created inside an `Arc` (usually with `Arc::new_cyclic`) so
/// that the state can hand out indices that point back at the model.
///
/// # Structural Changes
///
/// Every insertion, deletion or move must be bracketed by a `begin_*` /
/// `end_*` pair, with the data source's storage changed in between:
///
/// ```ignore
/// model.begin_insert_rows(&ModelIndex::invalid(), row, row);
/// items.write().insert(row, item);
/// model.end_insert_rows();
/// ```
///
/// The closure helpers ([`insert_rows_with`](ItemModel::insert_rows_with)
/// and friends) do the bracketing for you.
///
/// Transactions nest in strict LIFO order. Ending a transaction that does not
/// match the most recently begun one panics.
pub trait ItemModel: Send + Sync {
    /// Returns the number of rows under the given parent.
    fn row_count(&self, parent: &ModelIndex) -> usize;

    /// Returns the number of columns for children of the given parent.
    fn column_count(&self, parent: &ModelIndex) -> usize;

    /// Creates a model index for the given row and column under parent.
    ///
    /// Return `ModelIndex::invalid()` if the position is out of bounds.
    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex;

    /// Returns the parent of the given index.
    ///
    /// Return `ModelIndex::invalid()` for:
    /// - Root-level items
    /// - Invalid indices
    /// - Flat (non-hierarchical) models
    fn parent(&self, index: &ModelIndex) -> ModelIndex;

    /// Returns the data stored under the given role for the item at index.
    ///
    /// Return `Variant::Invalid` if the index is invalid, the role is not
    /// supported, or there is no data for that role.
    fn data(&self, index: &ModelIndex, role: ModelRole) -> Variant;

    /// Returns the model's shared bookkeeping.
    fn state(&self) -> &ModelState;

    // -------------------------------------------------------------------------
    // Optional methods with default implementations
    // -------------------------------------------------------------------------

    /// Returns the index at `(row, column)` under `parent`.
    ///
    /// For a non-root parent the row is validated against
    /// [`row_count`](ItemModel::row_count) first.
    fn sibling(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if !parent.is_valid() {
            return self.index(row, column, parent);
        }
        if row >= self.row_count(parent) {
            return ModelIndex::invalid();
        }
        self.index(row, column, parent)
    }

    /// Returns `true` if the item at parent has any children.
    fn has_children(&self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }

    /// Returns the flags for the item at the given index.
    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        if index.is_valid() {
            ItemFlags::new()
        } else {
            ItemFlags::disabled()
        }
    }

    /// Sets the data for the given index and role.
    ///
    /// Returns `true` if the data was successfully set. The default
    /// implementation is read-only.
    fn set_data(&self, _index: &ModelIndex, _value: Variant, _role: ModelRole) -> bool {
        false
    }

    /// Returns the header text of `column`.
    fn column_name(&self, _column: usize) -> Option<String> {
        None
    }

    /// Returns `true` if views may sort by `column`.
    fn is_column_sortable(&self, _column: usize) -> bool {
        true
    }

    /// Returns the column the model is sorted by, if any.
    fn sort_column(&self) -> Option<usize> {
        None
    }

    /// Returns the display text for an item (convenience for `data(index, Display)`).
    fn display_text(&self, index: &ModelIndex) -> Option<String> {
        self.data(index, ModelRole::Display).into_string()
    }

    // -------------------------------------------------------------------------
    // Index creation
    // -------------------------------------------------------------------------

    /// Creates an index into this model.
    ///
    /// This is the only way to obtain a valid [`ModelIndex`]; data sources
    /// call it from [`index`](ItemModel::index).
    fn create_index(
        &self,
        row: usize,
        column: usize,
        internal_data: Option<InternalData>,
        internal_id: u64,
    ) -> ModelIndex {
        ModelIndex::new(
            self.state().model_ref(),
            row,
            column,
            internal_data,
            internal_id,
        )
    }

    // -------------------------------------------------------------------------
    // Observers
    // -------------------------------------------------------------------------

    /// Registers a view. The model holds it weakly.
    fn register_view(&self, view: &Arc<dyn ModelView>) -> ViewId {
        self.state().views().register(view)
    }

    /// Unregisters a view. Returns `true` if it was registered.
    fn unregister_view(&self, id: ViewId) -> bool {
        self.state().views().unregister(id)
    }

    /// Registers a client. The model holds it weakly.
    fn register_client(&self, client: &Arc<dyn ModelClient>) -> ClientId {
        self.state().clients().register(client)
    }

    /// Unregisters a client. Returns `true` if it was registered.
    fn unregister_client(&self, id: ClientId) -> bool {
        self.state().clients().unregister(id)
    }

    /// Announces that data changed without a structural change.
    ///
    /// Views and clients receive `on_model_update(flags)`. No persistent
    /// index is remapped.
    fn invalidate(&self, flags: UpdateFlags) {
        self.state().notify_update(flags);
    }

    // -------------------------------------------------------------------------
    // Persistent indices
    // -------------------------------------------------------------------------

    /// Returns a persistent index tracking the item at `index`.
    ///
    /// Registering an index that is already tracked returns a reference to
    /// the same handle. Invalid indices, and indices of another model, yield
    /// an expired persistent index.
    fn register_persistent_index(&self, index: &ModelIndex) -> PersistentModelIndex {
        if !index.belongs_to(self) {
            return PersistentModelIndex::expired();
        }
        self.state().register_persistent(index)
    }

    /// Number of handles currently tracked.
    fn persistent_index_count(&self) -> usize {
        self.state().persistent_count()
    }

    /// Drops tracked handles that no persistent index refers to.
    ///
    /// Returns the number of handles removed.
    fn prune_persistent_indexes(&self) -> usize {
        self.state().prune_persistent()
    }

    // -------------------------------------------------------------------------
    // Styling
    // -------------------------------------------------------------------------

    /// Attaches a styler consulted by [`model_style`](ItemModel::model_style).
    fn subscribe_model_styler(&self, styler: ModelStyler) -> StylerId {
        self.state().subscribe_styler(styler)
    }

    /// Detaches a styler. Returns `true` if it was subscribed.
    fn unsubscribe_model_styler(&self, id: StylerId) -> bool {
        self.state().unsubscribe_styler(id)
    }

    /// Returns the style for `index`: the first valid value produced by the
    /// subscribed stylers, in subscription order.
    fn model_style(&self, index: &ModelIndex) -> Variant {
        self.state().style(index)
    }

    /// Mutex collaborators use to guard the data source's storage while it
    /// is populated off the model's thread.
    fn resource_mutex(&self) -> &Mutex<()> {
        self.state().resource_mutex()
    }

    // -------------------------------------------------------------------------
    // Structural transactions
    // -------------------------------------------------------------------------

    /// Announces that rows `first..=last` are about to be inserted under `parent`.
    fn begin_insert_rows(&self, parent: &ModelIndex, first: usize, last: usize) {
        self.state()
            .begin_insert(Direction::Row, parent, first, last);
    }

    /// Commits the insertion begun by [`begin_insert_rows`](ItemModel::begin_insert_rows).
    fn end_insert_rows(&self) {
        self.state().end_insert(self, Direction::Row);
    }

    /// Announces that columns `first..=last` are about to be inserted under `parent`.
    fn begin_insert_columns(&self, parent: &ModelIndex, first: usize, last: usize) {
        self.state()
            .begin_insert(Direction::Column, parent, first, last);
    }

    /// Commits the insertion begun by [`begin_insert_columns`](ItemModel::begin_insert_columns).
    fn end_insert_columns(&self) {
        self.state().end_insert(self, Direction::Column);
    }

    /// Announces that rows `first..=last` under `parent` are about to be deleted.
    ///
    /// Returns `false`, and begins nothing, if `last` is not an existing row.
    #[must_use = "the matching end_delete_rows must only be called when this returns true"]
    fn begin_delete_rows(&self, parent: &ModelIndex, first: usize, last: usize) -> bool {
        self.state()
            .begin_delete(self, Direction::Row, parent, first, last)
    }

    /// Commits the deletion begun by [`begin_delete_rows`](ItemModel::begin_delete_rows).
    fn end_delete_rows(&self) {
        self.state().end_delete(self, Direction::Row);
    }

    /// Announces that columns `first..=last` under `parent` are about to be deleted.
    ///
    /// Returns `false`, and begins nothing, if `last` is not an existing column.
    #[must_use = "the matching end_delete_columns must only be called when this returns true"]
    fn begin_delete_columns(&self, parent: &ModelIndex, first: usize, last: usize) -> bool {
        self.state()
            .begin_delete(self, Direction::Column, parent, first, last)
    }

    /// Commits the deletion begun by [`begin_delete_columns`](ItemModel::begin_delete_columns).
    fn end_delete_columns(&self) {
        self.state().end_delete(self, Direction::Column);
    }

    /// Announces that rows `first..=last` under `source_parent` are about to
    /// move so that they start at `target` under `target_parent`.
    ///
    /// `target` is the final position of the first moved row.
    ///
    /// # Panics
    ///
    /// Panics if the range or target is out of bounds.
    fn begin_move_rows(
        &self,
        source_parent: &ModelIndex,
        first: usize,
        last: usize,
        target_parent: &ModelIndex,
        target: usize,
    ) {
        self.state().begin_move(
            self,
            Direction::Row,
            source_parent,
            first,
            last,
            target_parent,
            target,
        );
    }

    /// Commits the move begun by [`begin_move_rows`](ItemModel::begin_move_rows).
    fn end_move_rows(&self) {
        self.state().end_move(self, Direction::Row);
    }

    /// Column counterpart of [`begin_move_rows`](ItemModel::begin_move_rows).
    fn begin_move_columns(
        &self,
        source_parent: &ModelIndex,
        first: usize,
        last: usize,
        target_parent: &ModelIndex,
        target: usize,
    ) {
        self.state().begin_move(
            self,
            Direction::Column,
            source_parent,
            first,
            last,
            target_parent,
            target,
        );
    }

    /// Commits the move begun by [`begin_move_columns`](ItemModel::begin_move_columns).
    fn end_move_columns(&self) {
        self.state().end_move(self, Direction::Column);
    }

    // -------------------------------------------------------------------------
    // Scoped transactions
    // -------------------------------------------------------------------------

    /// Inserts rows by running `insert_fn` between `begin_insert_rows` and
    /// `end_insert_rows`.
    fn insert_rows_with<F, R>(&self, parent: &ModelIndex, first: usize, last: usize, insert_fn: F) -> R
    where
        Self: Sized,
        F: FnOnce() -> R,
    {
        self.begin_insert_rows(parent, first, last);
        let result = insert_fn();
        self.end_insert_rows();
        result
    }

    /// Inserts columns by running `insert_fn` between `begin_insert_columns`
    /// and `end_insert_columns`.
    fn insert_columns_with<F, R>(
        &self,
        parent: &ModelIndex,
        first: usize,
        last: usize,
        insert_fn: F,
    ) -> R
    where
        Self: Sized,
        F: FnOnce() -> R,
    {
        self.begin_insert_columns(parent, first, last);
        let result = insert_fn();
        self.end_insert_columns();
        result
    }

    /// Deletes rows by running `delete_fn` between `begin_delete_rows` and
    /// `end_delete_rows`.
    ///
    /// Returns `None` without calling `delete_fn` if the range is out of bounds.
    fn delete_rows_with<F, R>(
        &self,
        parent: &ModelIndex,
        first: usize,
        last: usize,
        delete_fn: F,
    ) -> Option<R>
    where
        Self: Sized,
        F: FnOnce() -> R,
    {
        if !self.begin_delete_rows(parent, first, last) {
            return None;
        }
        let result = delete_fn();
        self.end_delete_rows();
        Some(result)
    }

    /// Deletes columns by running `delete_fn` between `begin_delete_columns`
    /// and `end_delete_columns`.
    ///
    /// Returns `None` without calling `delete_fn` if the range is out of bounds.
    fn delete_columns_with<F, R>(
        &self,
        parent: &ModelIndex,
        first: usize,
        last: usize,
        delete_fn: F,
    ) -> Option<R>
    where
        Self: Sized,
        F: FnOnce() -> R,
    {
        if !self.begin_delete_columns(parent, first, last) {
            return None;
        }
        let result = delete_fn();
        self.end_delete_columns();
        Some(result)
    }

    /// Moves rows by running `move_fn` between `begin_move_rows` and
    /// `end_move_rows`.
    #[allow(clippy::too_many_arguments)]
    fn move_rows_with<F, R>(
        &self,
        source_parent: &ModelIndex,
        first: usize,
        last: usize,
        target_parent: &ModelIndex,
        target: usize,
        move_fn: F,
    ) -> R
    where
        Self: Sized,
        F: FnOnce() -> R,
    {
        self.begin_move_rows(source_parent, first, last, target_parent, target);
        let result = move_fn();
        self.end_move_rows();
        result
    }

    /// Moves columns by running `move_fn` between `begin_move_columns` and
    /// `end_move_columns`.
    #[allow(clippy::too_many_arguments)]
    fn move_columns_with<F, R>(
        &self,
        source_parent: &ModelIndex,
        first: usize,
        last: usize,
        target_parent: &ModelIndex,
        target: usize,
        move_fn: F,
    ) -> R
    where
        Self: Sized,
        F: FnOnce() -> R,
    {
        self.begin_move_columns(source_parent, first, last, target_parent, target);
        let result = move_fn();
        self.end_move_columns();
        result
    }
}
