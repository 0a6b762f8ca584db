pub mod completion;
pub mod config;
pub mod error;
pub mod handlers;

pub use config::Config;
pub use error::{AssistantError, Result};
