pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod render;
pub mod routes;
pub mod services;

pub use config::{Config, ErrorPolicy};
pub use error::{ApiError, AppError, AppResult};
pub use routes::{AppState, Route};
