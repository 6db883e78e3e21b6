//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use trellis::model::{
    ItemModel, ModelClient, ModelIndex, ModelRole, ModelState, ModelView, PersistentModelIndex,
    UpdateFlags, Variant,
};

/// A flat data source written against the public extension API only.
///
/// Every row holds one value per column. Tests drive `begin_*`/`end_*`
/// directly and edit `rows` in between.
pub struct Grid {
    pub rows: RwLock<Vec<Vec<u64>>>,
    pub columns: RwLock<usize>,
    state: ModelState,
}

impl Grid {
    /// Creates a grid whose cell `(r, c)` holds `r * 100 + c`.
    pub fn new(rows: usize, columns: usize) -> Arc<Self> {
        let data = (0..rows)
            .map(|r| (0..columns).map(|c| (r * 100 + c) as u64).collect())
            .collect();
        Arc::new_cyclic(|weak: &Weak<Self>| Self {
            rows: RwLock::new(data),
            columns: RwLock::new(columns),
            state: ModelState::new(weak.clone()),
        })
    }

    pub fn at(&self, row: usize) -> ModelIndex {
        self.index(row, 0, &ModelIndex::invalid())
    }

    pub fn cell(&self, row: usize, column: usize) -> ModelIndex {
        self.index(row, column, &ModelIndex::invalid())
    }

    /// Registers a persistent index for each of `rows` in column 0.
    pub fn track(&self, rows: &[usize]) -> Vec<PersistentModelIndex> {
        rows.iter()
            .map(|&row| self.register_persistent_index(&self.at(row)))
            .collect()
    }
}

impl ItemModel for Grid {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        if parent.is_valid() {
            0
        } else {
            self.rows.read().len()
        }
    }

    fn column_count(&self, parent: &ModelIndex) -> usize {
        if parent.is_valid() {
            0
        } else {
            *self.columns.read()
        }
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if parent.is_valid() || row >= self.row_count(parent) || column >= self.column_count(parent) {
            return ModelIndex::invalid();
        }
        self.create_index(row, column, None, 0)
    }

    fn parent(&self, _index: &ModelIndex) -> ModelIndex {
        ModelIndex::invalid()
    }

    fn data(&self, index: &ModelIndex, role: ModelRole) -> Variant {
        if role != ModelRole::Display || !index.belongs_to(self) {
            return Variant::Invalid;
        }
        self.rows
            .read()
            .get(index.row())
            .and_then(|row| row.get(index.column()))
            .map_or(Variant::Invalid, |&value| Variant::from(value))
    }

    fn state(&self) -> &ModelState {
        &self.state
    }
}

/// One recorded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    InsertRows(usize, usize),
    InsertColumns(usize, usize),
    DeleteRows(usize, usize),
    DeleteColumns(usize, usize),
    MoveRows(usize, usize, usize),
    MoveColumns(usize, usize, usize),
    Update(UpdateFlags),
}

/// Records client and view callbacks in arrival order.
#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }

    fn push(&self, event: Event) {
        self.events.lock().push(event);
    }
}

impl ModelClient for Recorder {
    fn model_did_insert_rows(&self, _parent: &ModelIndex, first: usize, last: usize) {
        self.push(Event::InsertRows(first, last));
    }

    fn model_did_insert_columns(&self, _parent: &ModelIndex, first: usize, last: usize) {
        self.push(Event::InsertColumns(first, last));
    }

    fn model_did_delete_rows(&self, _parent: &ModelIndex, first: usize, last: usize) {
        self.push(Event::DeleteRows(first, last));
    }

    fn model_did_delete_columns(&self, _parent: &ModelIndex, first: usize, last: usize) {
        self.push(Event::DeleteColumns(first, last));
    }

    fn model_did_move_rows(
        &self,
        _source_parent: &ModelIndex,
        first: usize,
        last: usize,
        _target_parent: &ModelIndex,
        target: usize,
    ) {
        self.push(Event::MoveRows(first, last, target));
    }

    fn model_did_move_columns(
        &self,
        _source_parent: &ModelIndex,
        first: usize,
        last: usize,
        _target_parent: &ModelIndex,
        target: usize,
    ) {
        self.push(Event::MoveColumns(first, last, target));
    }

    fn on_model_update(&self, flags: UpdateFlags) {
        self.push(Event::Update(flags));
    }
}

impl ModelView for Recorder {
    fn on_model_update(&self, flags: UpdateFlags) {
        self.push(Event::Update(flags));
    }
}

/// Routes trace output through the test harness when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
