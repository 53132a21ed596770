//! HTTP API handlers for fc-api

pub mod applications;
pub mod error;
pub mod health;

pub use applications::{application_routes, create_application, submit_application};
pub use error::ApiError;
pub use health::health_routes;
