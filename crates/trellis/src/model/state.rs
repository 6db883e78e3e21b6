//! Per-model bookkeeping shared by every data source.
//!
//! [`ModelState`] is what a data source embeds to get the provided half of
//! [`ItemModel`]: the weak self-reference used to mint indices, the view and
//! client registries, the persistent index registry, the pending operation
//! stack, the styler table and the resource mutex.
//!
//! Internal locks are only held for bookkeeping. They are always released
//! before a data source method, a client or a view is called, so observers
//! may query the model or open a nested transaction from a callback.

use std::collections::HashMap;
use std::sync::Weak;

use parking_lot::{Mutex, RwLock};
use slotmap::SlotMap;
use trellis_core::logging::{span_names, targets};
use trellis_core::{ObserverList, ThreadAffinity};

use super::config::ModelConfig;
use super::index::ModelIndex;
use super::operation::{Direction, Operation, OperationKind};
use super::persistent::{
    PersistentModelIndex, PersistentRegistry, RemapPlan, doomed_handles, plan_remap,
};
use super::traits::{ItemModel, ModelClient, ModelStyler, ModelView, StylerId, UpdateFlags};
use super::variant::Variant;

/// Shared state behind the provided methods of [`ItemModel`].
///
/// # Example
///
/// ```ignore
/// struct Numbers {
///     values: RwLock<Vec<i64>>,
///     state: ModelState,
/// }
///
/// impl Numbers {
///     fn new(values: Vec<i64>) -> Arc<Self> {
///         Arc::new_cyclic(|weak| Self {
///             values: RwLock::new(values),
///             state: ModelState::new(weak.clone()),
///         })
///     }
/// }
/// ```
pub struct ModelState {
    model: Weak<dyn ItemModel>,
    operations: Mutex<Vec<Operation>>,
    persistent: Mutex<PersistentRegistry>,
    views: ObserverList<dyn ModelView>,
    clients: ObserverList<dyn ModelClient>,
    stylers: RwLock<SlotMap<StylerId, ModelStyler>>,
    resource_mutex: Mutex<()>,
    affinity: ThreadAffinity,
    config: ModelConfig,
}

impl ModelState {
    /// Creates the state for the model behind `model`, with default configuration.
    pub fn new<M: ItemModel + 'static>(model: Weak<M>) -> Self {
        Self::with_config(model, ModelConfig::default())
    }

    /// Creates the state for the model behind `model`.
    pub fn with_config<M: ItemModel + 'static>(model: Weak<M>, config: ModelConfig) -> Self {
        let model: Weak<dyn ItemModel> = model;
        Self {
            model,
            operations: Mutex::new(Vec::new()),
            persistent: Mutex::new(PersistentRegistry::new()),
            views: ObserverList::new(),
            clients: ObserverList::new(),
            stylers: RwLock::new(SlotMap::with_key()),
            resource_mutex: Mutex::new(()),
            affinity: ThreadAffinity::current(),
            config,
        }
    }

    /// The model's configuration.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Thread the model was created on.
    pub fn affinity(&self) -> ThreadAffinity {
        self.affinity
    }

    pub(crate) fn model_ref(&self) -> Weak<dyn ItemModel> {
        self.model.clone()
    }

    /// Registered views.
    pub fn views(&self) -> &ObserverList<dyn ModelView> {
        &self.views
    }

    /// Registered clients.
    pub fn clients(&self) -> &ObserverList<dyn ModelClient> {
        &self.clients
    }

    /// Mutex guarding the data source's storage during off-thread loading.
    pub fn resource_mutex(&self) -> &Mutex<()> {
        &self.resource_mutex
    }

    /// Number of transactions begun but not yet ended.
    pub fn pending_operations(&self) -> usize {
        self.operations.lock().len()
    }

    // -------------------------------------------------------------------------
    // Persistent indices
    // -------------------------------------------------------------------------

    pub(crate) fn register_persistent(&self, index: &ModelIndex) -> PersistentModelIndex {
        let persistent = self.persistent.lock().register(index);
        tracing::trace!(
            target: targets::PERSISTENT,
            model = self.config.display_name(),
            row = index.row(),
            column = index.column(),
            "persistent index registered"
        );
        persistent
    }

    pub(crate) fn persistent_count(&self) -> usize {
        self.persistent.lock().len()
    }

    pub(crate) fn prune_persistent(&self) -> usize {
        self.persistent.lock().prune_unobserved()
    }

    pub(crate) fn persistent_keys(&self) -> Vec<ModelIndex> {
        self.persistent.lock().keys()
    }

    /// Re-keys handles outside a transaction, for models whose layout
    /// changes without structural edits.
    pub(crate) fn remap_persistent(&self, plan: RemapPlan) {
        if !plan.is_empty() {
            self.persistent.lock().apply(plan);
        }
    }

    /// Returns `true` if a persistent handle currently tracks `index`.
    pub fn is_tracked(&self, index: &ModelIndex) -> bool {
        self.persistent.lock().contains(index)
    }

    // -------------------------------------------------------------------------
    // Stylers
    // -------------------------------------------------------------------------

    pub(crate) fn subscribe_styler(&self, styler: ModelStyler) -> StylerId {
        self.stylers.write().insert(styler)
    }

    pub(crate) fn unsubscribe_styler(&self, id: StylerId) -> bool {
        self.stylers.write().remove(id).is_some()
    }

    pub(crate) fn style(&self, index: &ModelIndex) -> Variant {
        let stylers: Vec<ModelStyler> = self.stylers.read().values().cloned().collect();
        stylers
            .iter()
            .map(|styler| styler(index, index.internal_data()))
            .find(Variant::is_valid)
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Notification
    // -------------------------------------------------------------------------

    pub(crate) fn notify_update(&self, flags: UpdateFlags) {
        let _span = tracing::trace_span!(target: targets::MODEL, span_names::NOTIFY).entered();
        for view in self.views.snapshot() {
            view.on_model_update(flags);
        }
        for client in self.clients.snapshot() {
            client.on_model_update(flags);
        }
    }

    fn notify_views(&self) {
        for view in self.views.snapshot() {
            view.on_model_update(UpdateFlags::DONT_INVALIDATE_INDEXES);
        }
    }

    fn notify_clients(&self, op: &Operation) {
        let clients = self.clients.snapshot();
        if clients.is_empty() {
            return;
        }
        let source = &op.source_parent;
        match (op.kind, op.direction) {
            (OperationKind::Insert, Direction::Row) => {
                for c in &clients {
                    c.model_did_insert_rows(source, op.first, op.last);
                }
            }
            (OperationKind::Insert, Direction::Column) => {
                for c in &clients {
                    c.model_did_insert_columns(source, op.first, op.last);
                }
            }
            (OperationKind::Delete, Direction::Row) => {
                for c in &clients {
                    c.model_did_delete_rows(source, op.first, op.last);
                }
            }
            (OperationKind::Delete, Direction::Column) => {
                for c in &clients {
                    c.model_did_delete_columns(source, op.first, op.last);
                }
            }
            (OperationKind::Move, direction) => {
                let target_parent = op.target_parent.clone().unwrap_or_default();
                let target = op.target.unwrap_or(op.first);
                for c in &clients {
                    match direction {
                        Direction::Row => c.model_did_move_rows(
                            source,
                            op.first,
                            op.last,
                            &target_parent,
                            target,
                        ),
                        Direction::Column => c.model_did_move_columns(
                            source,
                            op.first,
                            op.last,
                            &target_parent,
                            target,
                        ),
                    }
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Transactions
    // -------------------------------------------------------------------------

    fn check_thread(&self, what: &str) {
        if self.config.debug_thread_checks {
            self.affinity.assert_same_thread_with_msg(what);
        }
    }

    fn count_of<M: ItemModel + ?Sized>(model: &M, direction: Direction, parent: &ModelIndex) -> usize {
        match direction {
            Direction::Row => model.row_count(parent),
            Direction::Column => model.column_count(parent),
        }
    }

    fn push(&self, op: Operation) {
        tracing::trace!(
            target: targets::MODEL,
            model = self.config.display_name(),
            kind = %op.kind,
            direction = %op.direction,
            first = op.first,
            last = op.last,
            "begin"
        );
        self.operations.lock().push(op);
    }

    pub(crate) fn begin_insert(
        &self,
        direction: Direction,
        parent: &ModelIndex,
        first: usize,
        last: usize,
    ) {
        self.check_thread("structural transactions must run on the model's thread");
        assert!(first <= last, "begin_insert_{direction}: first ({first}) > last ({last})");
        self.push(Operation::insert(direction, parent.clone(), first, last));
    }

    pub(crate) fn begin_delete<M: ItemModel + ?Sized>(
        &self,
        model: &M,
        direction: Direction,
        parent: &ModelIndex,
        first: usize,
        last: usize,
    ) -> bool {
        self.check_thread("structural transactions must run on the model's thread");
        assert!(first <= last, "begin_delete_{direction}: first ({first}) > last ({last})");

        let count = Self::count_of(model, direction, parent);
        if last >= count {
            tracing::debug!(
                target: targets::MODEL,
                model = self.config.display_name(),
                %direction,
                first,
                last,
                count,
                "delete range out of bounds, nothing begun"
            );
            return false;
        }

        let mut op = Operation::delete(direction, parent.clone(), first, last);
        let keys = self.persistent.lock().keys();
        op.doomed = doomed_handles(&keys, &op, |index| model.parent(index));
        self.push(op);
        true
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn begin_move<M: ItemModel + ?Sized>(
        &self,
        model: &M,
        direction: Direction,
        source_parent: &ModelIndex,
        first: usize,
        last: usize,
        target_parent: &ModelIndex,
        target: usize,
    ) {
        self.check_thread("structural transactions must run on the model's thread");
        assert!(first <= last, "begin_move_{direction}: first ({first}) > last ({last})");

        let source_count = Self::count_of(model, direction, source_parent);
        assert!(
            last < source_count,
            "begin_move_{direction}: last ({last}) out of range ({source_count})"
        );
        let moved = last - first + 1;
        if source_parent == target_parent {
            assert!(
                target <= source_count - moved,
                "begin_move_{direction}: target ({target}) out of range for {moved} item(s) in {source_count}"
            );
        } else {
            let target_count = Self::count_of(model, direction, target_parent);
            assert!(
                target <= target_count,
                "begin_move_{direction}: target ({target}) out of range ({target_count})"
            );
        }

        let mut op = Operation::moving(
            direction,
            source_parent.clone(),
            first,
            last,
            target_parent.clone(),
            target,
        );
        let keys = self.persistent.lock().keys();
        op.parents = keys
            .into_iter()
            .map(|key| {
                let parent = model.parent(&key);
                (key, parent)
            })
            .collect();
        self.push(op);
    }

    pub(crate) fn end_insert<M: ItemModel + ?Sized>(&self, model: &M, direction: Direction) {
        self.end(model, OperationKind::Insert, direction);
    }

    pub(crate) fn end_delete<M: ItemModel + ?Sized>(&self, model: &M, direction: Direction) {
        self.end(model, OperationKind::Delete, direction);
    }

    pub(crate) fn end_move<M: ItemModel + ?Sized>(&self, model: &M, direction: Direction) {
        self.end(model, OperationKind::Move, direction);
    }

    fn end<M: ItemModel + ?Sized>(&self, model: &M, kind: OperationKind, direction: Direction) {
        let _span = tracing::trace_span!(
            target: targets::MODEL,
            span_names::TRANSACTION,
            kind = %kind,
            direction = %direction
        )
        .entered();
        self.check_thread("structural transactions must run on the model's thread");

        let op = self.operations.lock().pop();
        let Some(op) = op else {
            panic!("end_{kind}_{direction} called with no pending operation");
        };
        assert!(
            op.kind == kind && op.direction == direction,
            "end_{kind}_{direction} does not match the pending {} {} operation",
            op.kind,
            op.direction
        );

        let plan = self.plan(model, &op);
        let relocated = plan.relocations.len();
        let expired = plan.expired.len();
        let pruned = {
            let mut registry = self.persistent.lock();
            if !plan.is_empty() {
                registry.apply(plan);
            }
            if self.config.prune_unobserved_handles {
                registry.prune_unobserved()
            } else {
                0
            }
        };
        tracing::trace!(
            target: targets::PERSISTENT,
            model = self.config.display_name(),
            relocated,
            expired,
            pruned,
            "persistent indices remapped"
        );

        self.notify_clients(&op);
        self.notify_views();
    }

    fn plan<M: ItemModel + ?Sized>(&self, model: &M, op: &Operation) -> RemapPlan {
        let _span = tracing::trace_span!(target: targets::PERSISTENT, span_names::REMAP).entered();
        if op.kind == OperationKind::Move {
            return plan_remap(op, &op.parents);
        }
        let keys = self.persistent.lock().keys();
        let parents: HashMap<ModelIndex, ModelIndex> = keys
            .into_iter()
            .filter(|key| !op.doomed.contains(key))
            .map(|key| {
                let parent = model.parent(&key);
                (key, parent)
            })
            .collect();
        plan_remap(op, &parents)
    }
}

impl Drop for ModelState {
    fn drop(&mut self) {
        self.persistent.get_mut().clear();
    }
}

impl std::fmt::Debug for ModelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelState")
            .field("name", &self.config.name)
            .field("pending_operations", &self.operations.lock().len())
            .field("persistent_indices", &self.persistent.lock().len())
            .field("views", &self.views.len())
            .field("clients", &self.clients.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(ModelState: Send, Sync);
