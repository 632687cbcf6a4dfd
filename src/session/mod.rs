//! The explorer and its actor runtime.

pub mod actor;
pub(crate) mod explorer;

pub use actor::ExplorerHandle;
pub use explorer::Explorer;
