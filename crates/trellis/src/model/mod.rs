//! Structural item models.
//!
//! This module provides the pieces views and data sources share:
//!
//! - `ModelIndex`: a cheap, transient reference to one cell of a model
//! - `ItemModel`: the trait data sources implement; its provided methods run
//!   the begin/end transaction protocol for structural changes
//! - `PersistentModelIndex`: an index that keeps pointing at the same item
//!   while rows and columns are inserted, deleted or moved around it
//! - `ModelView` / `ModelClient`: observers notified after every commit
//!
//! # Model Implementations
//!
//! - `ListModel`: single-column list of items
//! - `TableModel`: rows of cells under named columns
//! - `TreeModel`: node hierarchy keyed by stable node ids
//! - `SortingProxyModel`: sorted view over any other model
//!
//! # Example
//!
//! ```
//! use trellis::model::{ItemModel, ListModel, ModelIndex};
//!
//! let model = ListModel::new(vec!["Apple".to_string(), "Banana".to_string()]);
//!
//! let root = ModelIndex::invalid();
//! let banana = model.register_persistent_index(&model.index(1, 0, &root));
//!
//! model.insert(0, "Cherry".to_string()).unwrap();
//! assert_eq!(banana.row(), Some(2));
//!
//! model.remove(2).unwrap();
//! assert!(!banana.is_valid());
//! ```
//!
//! # Transactions
//!
//! ```text
//! begin_*  ──> push Operation ──> (delete: snapshot doomed handles)
//!    │
//! mutate the backing store
//!    │
//! end_*    ──> pop Operation ──> remap persistent handles
//!                             ──> notify clients (did_insert/delete/move)
//!                             ──> notify views (DONT_INVALIDATE_INDEXES)
//! ```

mod config;
mod debug;
mod index;
mod list_model;
mod operation;
mod persistent;
pub mod selection;
mod sorting_proxy;
mod state;
mod table_model;
mod traits;
mod tree_model;
mod variant;

pub use config::{ModelConfig, ModelConfigBuilder};
pub use debug::ModelTreeDebug;
pub use index::{InternalData, ModelIndex};
pub use list_model::{DataExtractor, FlagsExtractor, ListItem, ListModel};
pub use operation::{Direction, Operation, OperationKind};
pub use persistent::{PersistentHandle, PersistentModelIndex};
pub use selection::{ModelSelection, SelectionMode};
pub use sorting_proxy::{SortOrder, SortingProxyModel};
pub use state::ModelState;
pub use table_model::{CellExtractor, TableModel};
pub use traits::{
    ClientId, ItemFlags, ItemModel, ModelClient, ModelStyler, ModelView, StylerId, UpdateFlags,
    ViewId,
};
pub use tree_model::{NodeId, TreeDataExtractor, TreeModel, TreeNodeData};
pub use variant::{ModelRole, Variant};

static_assertions::assert_impl_all!(ModelIndex: Send, Sync, Clone);
static_assertions::assert_impl_all!(PersistentModelIndex: Send, Sync, Clone);
static_assertions::assert_impl_all!(ListModel<String>: ItemModel);
static_assertions::assert_impl_all!(TreeModel<String>: ItemModel);
static_assertions::assert_impl_all!(SortingProxyModel<dyn ItemModel>: ItemModel);
