//! # Fit-and-Competent Common Library
//!
//! Core of the application API:
//! - Field sanitizer for fill-in requests
//! - Random application number allocation
//! - One-time fill-in of allocated applications
//! - Store boundary and its SQLite implementation
//! - Configuration loading

pub mod allocator;
pub mod config;
pub mod db;
pub mod error;
pub mod sanitize;
pub mod store;
pub mod updater;

pub use error::{Error, Result};
pub use store::{ApplicationStore, InsertOutcome};
