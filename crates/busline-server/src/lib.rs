//! Busline HTTP server: catalog reads and session authentication.

pub mod auth;
pub mod config;
pub mod routes;
pub mod state;

pub use routes::build_router;
