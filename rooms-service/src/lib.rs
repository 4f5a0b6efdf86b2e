pub mod api;
pub mod config;
pub mod domain;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;

pub use config::AppConfig;
pub use server::Server;
pub use utils::errors::{Result, RoomsServiceError};
