//! Domain library for the busline backend.
//!
//! Holds the MongoDB connection wrapper, the catalog read services, and the
//! error taxonomy shared with the HTTP server.

pub mod catalog;
pub mod db;
pub mod error;

pub use db::MongoDb;
pub use error::{ApiError, ApiResult};
