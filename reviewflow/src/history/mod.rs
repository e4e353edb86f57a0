//! Review records and the in-memory history of completed runs.

mod record;
mod store;

pub use record::ReviewRecord;
pub use store::HistoryStore;
