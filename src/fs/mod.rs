//! Remote tree model and the operations performed on it.

pub mod cache;
pub mod node;
pub mod operations;
pub mod tree;

pub use cache::NodeCache;
pub use node::{NodeKind, RemoteNode};
pub use operations::delete::{DeleteSummary, RecursiveDelete};
pub use operations::drop::{DataTransfer, DropOutcome, DropPayload, TransferItem};
pub use operations::upload::{UploadOptions, UploadOutcome, UploadPipeline};
pub use tree::{TreeEvent, TreeProvider};
