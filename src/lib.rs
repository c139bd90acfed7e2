pub mod builder;
pub mod collection;
pub mod config;
pub mod error;
pub mod history;
pub mod http;
pub mod i18n;
pub mod logger;
pub mod replay;
pub mod settings;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use error::{ReqlabError, Result};
