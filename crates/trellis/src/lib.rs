//! Trellis - item models whose indices survive structural change.
//!
//! This is the main crate. It re-exports `trellis-core` and provides the
//! [`model`] module: [`ModelIndex`](model::ModelIndex), the
//! [`ItemModel`](model::ItemModel) transaction protocol, persistent indices
//! the ready-made list, table and tree models, and a sorting proxy.
//!
//! # Example
//!
//! ```
//! use trellis::prelude::*;
//!
//! let model = ListModel::new(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
//! let c = model.register_persistent_index(&model.index(2, 0, &ModelIndex::invalid()));
//!
//! model.move_rows(2, 2, 0).unwrap();
//! assert_eq!(c.row(), Some(0));
//! ```

pub use trellis_core::*;

pub mod model;

/// Commonly used types, for glob import.
pub mod prelude {
    pub use crate::model::{
        ItemModel, ListModel, ModelClient, ModelConfig, ModelIndex, ModelRole, ModelView,
        PersistentModelIndex, SortOrder, SortingProxyModel, TableModel, TreeModel, UpdateFlags,
        Variant,
    };
    pub use trellis_core::{ModelError, Result};
}
