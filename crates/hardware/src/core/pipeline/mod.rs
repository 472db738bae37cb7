//! Pipeline structures: latches, rename, reorder buffer, wait queues,
//! writeback broadcast, and the commit stage.

pub mod broadcast;
pub mod commit;
pub mod frontend;
pub mod iq;
pub mod latches;
pub mod lsq;
pub mod rename;
pub mod rob;

pub use broadcast::Broadcast;
pub use frontend::Frontend;
pub use iq::IssueQueue;
pub use lsq::LoadStoreQueue;
pub use rename::{RenameTable, Tag};
pub use rob::Rob;
