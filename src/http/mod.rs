pub mod cancel;
pub mod client;
pub mod request;
pub mod response;
pub mod types;

// Re-export commonly used types for convenient access
pub use cancel::CancelToken;
pub use client::Client;
pub use request::{KeyValue, RequestModel};
pub use response::ResponseRecord;
pub use types::{BodyType, Method};
