//! Explorer operations split into focused modules.

mod browse;
pub mod content;
pub mod delete;
mod dir_ops;
pub mod drop;
mod spaces;
pub mod upload;
pub(crate) mod utils;
