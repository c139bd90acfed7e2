pub mod model;
pub mod printer;
pub mod recorder;
pub mod selector;
pub mod storage;

pub use model::HistoryEntry;
pub use recorder::record_history;
pub use storage::{HistoryStorage, MAX_HISTORY_ENTRIES};
