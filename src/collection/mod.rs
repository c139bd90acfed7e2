pub mod model;
pub mod printer;
pub mod storage;

pub use model::{Collection, SaveTarget, SavedRequest};
pub use storage::CollectionStorage;
