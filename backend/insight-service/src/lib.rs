pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod tikhub;

pub use config::Config;
pub use error::{AppError, Result};
