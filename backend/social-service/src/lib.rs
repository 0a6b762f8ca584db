pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod navigation;
pub mod notify;
pub mod repository;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::{AppState, Repositories};
