pub mod formatter;
pub mod id;

pub use formatter::{ResponseFormat, ResponseFormatter};
pub use id::next_id;
