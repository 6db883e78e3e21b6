//! Core systems for Trellis.
//!
//! This crate provides the infrastructure the model layer is built on:
//!
//! - **Errors**: [`ModelError`] and the [`Result`] alias
//! - **Logging**: tracing targets, span names and [`PerfSpan`]
//! - **Signal/Slot System**: synchronous, type-safe notification
//! - **Observer Lists**: weakly-held trait-object observers
//! - **Thread Affinity**: owning-thread assertions
//!
//! # Signal/Slot Example
//!
//! ```
//! use trellis_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod observer;
pub mod signal;
pub mod thread_check;

pub use error::{ModelError, Result};
pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use observer::{ObserverId, ObserverList};
pub use signal::{ConnectionId, Signal};
pub use thread_check::ThreadAffinity;

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
static_assertions::assert_impl_all!(ThreadAffinity: Send, Sync, Copy);
