//! Template catalog: storage, lookup with locale fallback, and the manager
//! facade that renders stored templates through an [`Engine`].
//!
//! [`Engine`]: crate::engine::Engine

pub mod builtin;
mod loader;
mod manager;
mod store;


pub use loader::{load_dir, load_file};
pub use manager::TemplateManager;
pub use store::TemplateStore;
