//! sectree: editable, reorderable section trees.
//!
//! A document is a tree of nodes. User-defined composites receive edit capabilities when
//! rendered; built-in primitives and structural wrappers never do, though their children
//! might. The [`store::SectionStore`] owns the top-level list, rebuilds it on every edit,
//! and reports structural changes to a host.

pub mod app_state;
pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod journal;
pub mod loader;
pub mod node;
pub mod render;
pub mod store;
pub mod traversal;
pub mod typeset;
pub mod ui;

pub use error::{Error, Result};
pub use node::{Node, NodeKind};
pub use store::{Action, SectionStore};
