//! Sorting proxy over another model.
//!
//! `SortingProxyModel` presents the rows of a source model in sorted order
//! without touching the source. Every parent gets its own row mapping, built
//! the first time the proxy is asked about that parent and re-sorted whenever
//! the source reports a change.
//!
//! ```
//! use trellis::model::{ItemModel, ListModel, ModelIndex, SortOrder, SortingProxyModel};
//!
//! let source = ListModel::new(vec!["pear".to_string(), "apple".to_string()]);
//! let proxy = SortingProxyModel::new(source.clone());
//! assert!(proxy.sort(0, SortOrder::Ascending));
//!
//! let root = ModelIndex::invalid();
//! assert_eq!(proxy.display_text(&proxy.index(0, 0, &root)).as_deref(), Some("apple"));
//!
//! source.push("banana".to_string());
//! assert_eq!(proxy.display_text(&proxy.index(1, 0, &root)).as_deref(), Some("banana"));
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use trellis_core::PerfSpan;
use trellis_core::logging::targets;

use super::config::ModelConfig;
use super::index::ModelIndex;
use super::persistent::{PersistentModelIndex, RemapPlan};
use super::state::ModelState;
use super::traits::{ItemFlags, ItemModel, ModelView, UpdateFlags, ViewId};
use super::variant::{ModelRole, Variant};

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest value first.
    #[default]
    Ascending,
    /// Largest value first.
    Descending,
}

#[derive(Debug, Clone)]
struct SortKey {
    column: Option<usize>,
    order: SortOrder,
    role: ModelRole,
    case_sensitive: bool,
}

impl Default for SortKey {
    fn default() -> Self {
        Self {
            column: None,
            order: SortOrder::Ascending,
            role: ModelRole::Display,
            case_sensitive: false,
        }
    }
}

/// Row order of the children of one source parent.
struct Mapping {
    /// `None` for the source root.
    source_parent: Option<PersistentModelIndex>,
    /// Proxy row to source row.
    source_rows: Vec<usize>,
    /// Source row to proxy row.
    proxy_rows: Vec<usize>,
}

impl Mapping {
    fn new(source_parent: Option<PersistentModelIndex>, source_rows: Vec<usize>) -> Self {
        let mut mapping = Self {
            source_parent,
            source_rows: Vec::new(),
            proxy_rows: Vec::new(),
        };
        mapping.set_rows(source_rows);
        mapping
    }

    fn set_rows(&mut self, source_rows: Vec<usize>) {
        self.proxy_rows = vec![0; source_rows.len()];
        for (proxy_row, &source_row) in source_rows.iter().enumerate() {
            self.proxy_rows[source_row] = proxy_row;
        }
        self.source_rows = source_rows;
    }

    fn parent(&self) -> ModelIndex {
        self.source_parent
            .as_ref()
            .map(PersistentModelIndex::index)
            .unwrap_or_default()
    }

    /// The parent this mapping describes was deleted from the source.
    fn is_orphaned(&self) -> bool {
        self.source_parent.as_ref().is_some_and(|parent| !parent.is_valid())
    }
}

#[derive(Default)]
struct Mappings {
    by_id: HashMap<u64, Mapping>,
    ids: HashMap<ModelIndex, u64>,
    next_id: u64,
}

impl Mappings {
    fn insert(&mut self, source_parent: ModelIndex, mapping: Mapping) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.by_id.insert(id, mapping);
        self.ids.insert(source_parent, id);
        id
    }

    fn clear(&mut self) {
        self.by_id.clear();
        self.ids.clear();
    }
}

/// Forwards source updates to the proxy without keeping it alive.
struct SourceListener<S: ItemModel + ?Sized + 'static> {
    proxy: Weak<SortingProxyModel<S>>,
}

impl<S: ItemModel + ?Sized + 'static> ModelView for SourceListener<S> {
    fn on_model_update(&self, flags: UpdateFlags) {
        if let Some(proxy) = self.proxy.upgrade() {
            proxy.refresh(flags);
        }
    }
}

/// A model that shows the rows of a source model sorted by one column.
///
/// Proxy indices carry the id of the row mapping they belong to as their
/// internal id; [`map_to_source`](Self::map_to_source) and
/// [`map_to_proxy`](Self::map_to_proxy) translate in both directions.
///
/// The proxy watches its source as a view. After every source update it
/// re-sorts its mappings, moves its own persistent indices to wherever their
/// source items now appear, and then notifies its views and clients with the
/// same flags. Without a sort column rows appear in source order.
pub struct SortingProxyModel<S: ItemModel + ?Sized + 'static> {
    source: Arc<S>,
    mappings: RwLock<Mappings>,
    key: RwLock<SortKey>,
    /// Source item behind each persistent proxy index, keyed by proxy index.
    tracked: Mutex<HashMap<ModelIndex, PersistentModelIndex>>,
    listener: Arc<SourceListener<S>>,
    listener_id: Mutex<Option<ViewId>>,
    state: ModelState,
}

impl<S: ItemModel + ?Sized + 'static> SortingProxyModel<S> {
    /// Creates an unsorted proxy over `source`.
    pub fn new(source: Arc<S>) -> Arc<Self> {
        Self::with_config(source, ModelConfig::default())
    }

    /// Creates an unsorted proxy over `source` with the given configuration.
    pub fn with_config(source: Arc<S>, config: ModelConfig) -> Arc<Self> {
        let proxy = Arc::new_cyclic(|weak: &Weak<Self>| Self {
            source,
            mappings: RwLock::new(Mappings::default()),
            key: RwLock::new(SortKey::default()),
            tracked: Mutex::new(HashMap::new()),
            listener: Arc::new(SourceListener { proxy: weak.clone() }),
            listener_id: Mutex::new(None),
            state: ModelState::with_config(weak.clone(), config),
        });
        let listener: Arc<dyn ModelView> = proxy.listener.clone();
        *proxy.listener_id.lock() = Some(proxy.source.register_view(&listener));
        proxy
    }

    /// The model being sorted.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Sorts by `column` in the given order.
    ///
    /// Returns `false`, leaving the current order in place, if the source
    /// has no such column or reports it as not sortable.
    pub fn sort(&self, column: usize, order: SortOrder) -> bool {
        let root = ModelIndex::invalid();
        if column >= self.source.column_count(&root) || !self.source.is_column_sortable(column) {
            tracing::debug!(target: targets::MODEL, column, "column is not sortable");
            return false;
        }
        {
            let mut key = self.key.write();
            key.column = Some(column);
            key.order = order;
        }
        self.refresh(UpdateFlags::DONT_INVALIDATE_INDEXES);
        true
    }

    /// Goes back to showing rows in source order.
    pub fn clear_sort(&self) {
        self.key.write().column = None;
        self.refresh(UpdateFlags::DONT_INVALIDATE_INDEXES);
    }

    /// Current sort direction.
    pub fn sort_order(&self) -> SortOrder {
        self.key.read().order
    }

    /// Role whose data is compared when sorting.
    pub fn sort_role(&self) -> ModelRole {
        self.key.read().role
    }

    /// Compare `role` instead of [`ModelRole::Display`].
    pub fn set_sort_role(&self, role: ModelRole) {
        self.key.write().role = role;
        self.refresh(UpdateFlags::DONT_INVALIDATE_INDEXES);
    }

    /// Whether text compares case-sensitively. Off by default.
    pub fn is_sort_case_sensitive(&self) -> bool {
        self.key.read().case_sensitive
    }

    pub fn set_sort_case_sensitive(&self, case_sensitive: bool) {
        self.key.write().case_sensitive = case_sensitive;
        self.refresh(UpdateFlags::DONT_INVALIDATE_INDEXES);
    }

    /// Returns the source index shown at `proxy_index`.
    pub fn map_to_source(&self, proxy_index: &ModelIndex) -> ModelIndex {
        if !proxy_index.belongs_to(self) {
            return ModelIndex::invalid();
        }
        let (parent, source_row) = {
            let mappings = self.mappings.read();
            let Some(mapping) = mappings.by_id.get(&proxy_index.internal_id()) else {
                return ModelIndex::invalid();
            };
            let Some(&source_row) = mapping.source_rows.get(proxy_index.row()) else {
                return ModelIndex::invalid();
            };
            (mapping.parent(), source_row)
        };
        self.source.index(source_row, proxy_index.column(), &parent)
    }

    /// Returns the proxy index showing `source_index`.
    pub fn map_to_proxy(&self, source_index: &ModelIndex) -> ModelIndex {
        if !source_index.belongs_to(&*self.source) {
            return ModelIndex::invalid();
        }
        let source_parent = self.source.parent(source_index);
        if source_index.column() >= self.source.column_count(&source_parent) {
            return ModelIndex::invalid();
        }
        let Some(id) = self.mapping_id(&source_parent) else {
            return ModelIndex::invalid();
        };
        let proxy_row = {
            let mappings = self.mappings.read();
            mappings
                .by_id
                .get(&id)
                .and_then(|mapping| mapping.proxy_rows.get(source_index.row()).copied())
        };
        match proxy_row {
            Some(row) => self.create_index(row, source_index.column(), None, id),
            None => ModelIndex::invalid(),
        }
    }

    /// Source parent behind a proxy parent; the root maps to the root.
    fn source_parent_of(&self, parent: &ModelIndex) -> Option<ModelIndex> {
        if !parent.is_valid() {
            return Some(ModelIndex::invalid());
        }
        let source_parent = self.map_to_source(parent);
        source_parent.is_valid().then_some(source_parent)
    }

    /// Id of the mapping for the children of `source_parent`, building it on
    /// first use.
    fn mapping_id(&self, source_parent: &ModelIndex) -> Option<u64> {
        if source_parent.is_valid() && !source_parent.belongs_to(&*self.source) {
            return None;
        }
        if let Some(&id) = self.mappings.read().ids.get(source_parent) {
            return Some(id);
        }

        let rows = self.sorted_rows(source_parent);
        let tracked_parent = source_parent
            .is_valid()
            .then(|| self.source.register_persistent_index(source_parent));

        let mut mappings = self.mappings.write();
        if let Some(&id) = mappings.ids.get(source_parent) {
            return Some(id);
        }
        let id = mappings.insert(source_parent.clone(), Mapping::new(tracked_parent, rows));
        tracing::trace!(target: targets::MODEL, id, "proxy mapping built");
        Some(id)
    }

    fn with_mapping<R>(&self, id: u64, f: impl FnOnce(&Mapping) -> R) -> Option<R> {
        self.mappings.read().by_id.get(&id).map(f)
    }

    /// Source rows under `source_parent` in display order.
    fn sorted_rows(&self, source_parent: &ModelIndex) -> Vec<usize> {
        let key = self.key.read().clone();
        let count = self.source.row_count(source_parent);
        let mut rows: Vec<usize> = (0..count).collect();
        let Some(column) = key.column else {
            return rows;
        };

        let values: Vec<Variant> = rows
            .iter()
            .map(|&row| {
                let index = self.source.index(row, column, source_parent);
                self.source.data(&index, key.role)
            })
            .collect();
        rows.sort_by(|&a, &b| {
            let ordering = compare_variants(&values[a], &values[b], key.case_sensitive);
            match key.order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
        rows
    }

    /// Re-sorts after the source or the sort key changed, then tells the
    /// proxy's own observers.
    fn refresh(&self, flags: UpdateFlags) {
        let _perf = PerfSpan::new("proxy_resort");
        let parents: Vec<(u64, ModelIndex)> = {
            let mut mappings = self.mappings.write();
            if flags.invalidate_all_indexes {
                mappings.clear();
            } else {
                mappings.by_id.retain(|_, mapping| !mapping.is_orphaned());
            }
            mappings
                .by_id
                .iter()
                .map(|(&id, mapping)| (id, mapping.parent()))
                .collect()
        };

        let sorted: Vec<(u64, ModelIndex, Vec<usize>)> = parents
            .into_iter()
            .map(|(id, parent)| {
                let rows = self.sorted_rows(&parent);
                (id, parent, rows)
            })
            .collect();
        {
            let mut mappings = self.mappings.write();
            mappings.ids.clear();
            for (id, parent, rows) in sorted {
                if let Some(mapping) = mappings.by_id.get_mut(&id) {
                    mapping.set_rows(rows);
                }
                mappings.ids.insert(parent, id);
            }
        }

        self.remap_tracked();
        self.invalidate(flags);
    }

    /// Moves every persistent proxy index to where its source item now shows.
    fn remap_tracked(&self) {
        let tracked: Vec<(ModelIndex, PersistentModelIndex)> = self.tracked.lock().drain().collect();
        let mut plan = RemapPlan::default();
        let mut retained = HashMap::with_capacity(tracked.len());
        for (key, source_item) in tracked {
            if !self.state.is_tracked(&key) {
                continue;
            }
            let target = self.map_to_proxy(&source_item.index());
            if !target.is_valid() {
                plan.expired.push(key);
                continue;
            }
            if target != key {
                plan.relocations.push((key, target.clone()));
            }
            retained.insert(target, source_item);
        }

        let relocated = plan.relocations.len();
        let expired = plan.expired.len();
        self.state.remap_persistent(plan);
        if self.state.config().prune_unobserved_handles {
            self.state.prune_persistent();
            retained.retain(|key, _| self.state.is_tracked(key));
        }
        tracing::trace!(
            target: targets::PERSISTENT,
            model = self.state.config().display_name(),
            relocated,
            expired,
            "proxy persistent indices remapped"
        );
        self.tracked.lock().extend(retained);
    }
}

/// Orders two values of the sort role.
///
/// Invalid values sort first; values of unrelated types compare equal and
/// keep their source order.
fn compare_variants(a: &Variant, b: &Variant, case_sensitive: bool) -> Ordering {
    match (a, b) {
        (Variant::String(a), Variant::String(b)) if case_sensitive => a.cmp(b),
        (Variant::String(a), Variant::String(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Variant::Int(a), Variant::Int(b)) => a.cmp(b),
        (Variant::UInt(a), Variant::UInt(b)) => a.cmp(b),
        (Variant::Int(a), Variant::UInt(b)) => i128::from(*a).cmp(&i128::from(*b)),
        (Variant::UInt(a), Variant::Int(b)) => i128::from(*a).cmp(&i128::from(*b)),
        (Variant::Float(a), Variant::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Variant::Bool(a), Variant::Bool(b)) => a.cmp(b),
        (Variant::Invalid, Variant::Invalid) => Ordering::Equal,
        (Variant::Invalid, _) => Ordering::Less,
        (_, Variant::Invalid) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

impl<S: ItemModel + ?Sized + 'static> ItemModel for SortingProxyModel<S> {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        self.source_parent_of(parent)
            .and_then(|source_parent| self.mapping_id(&source_parent))
            .and_then(|id| self.with_mapping(id, |mapping| mapping.source_rows.len()))
            .unwrap_or(0)
    }

    fn column_count(&self, parent: &ModelIndex) -> usize {
        self.source_parent_of(parent)
            .map_or(0, |source_parent| self.source.column_count(&source_parent))
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        let Some(source_parent) = self.source_parent_of(parent) else {
            return ModelIndex::invalid();
        };
        if column >= self.source.column_count(&source_parent) {
            return ModelIndex::invalid();
        }
        let Some(id) = self.mapping_id(&source_parent) else {
            return ModelIndex::invalid();
        };
        let rows = self.with_mapping(id, |mapping| mapping.source_rows.len()).unwrap_or(0);
        if row >= rows {
            return ModelIndex::invalid();
        }
        self.create_index(row, column, None, id)
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        if !index.belongs_to(self) {
            return ModelIndex::invalid();
        }
        match self.with_mapping(index.internal_id(), Mapping::parent) {
            Some(source_parent) => self.map_to_proxy(&source_parent),
            None => ModelIndex::invalid(),
        }
    }

    fn data(&self, index: &ModelIndex, role: ModelRole) -> Variant {
        self.source.data(&self.map_to_source(index), role)
    }

    fn state(&self) -> &ModelState {
        &self.state
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        self.source.flags(&self.map_to_source(index))
    }

    fn column_name(&self, column: usize) -> Option<String> {
        self.source.column_name(column)
    }

    fn is_column_sortable(&self, column: usize) -> bool {
        self.source.is_column_sortable(column)
    }

    fn sort_column(&self) -> Option<usize> {
        self.key.read().column
    }

    /// Tracks the source item behind `index`, so the persistent index
    /// follows it through re-sorts and source changes.
    fn register_persistent_index(&self, index: &ModelIndex) -> PersistentModelIndex {
        let source_index = self.map_to_source(index);
        if !source_index.is_valid() {
            return PersistentModelIndex::expired();
        }
        let persistent = self.state.register_persistent(index);
        let source_item = self.source.register_persistent_index(&source_index);
        self.tracked.lock().insert(index.clone(), source_item);
        persistent
    }
}

impl<S: ItemModel + ?Sized + 'static> Drop for SortingProxyModel<S> {
    fn drop(&mut self) {
        if let Some(id) = self.listener_id.get_mut().take() {
            self.source.unregister_view(id);
        }
    }
}
