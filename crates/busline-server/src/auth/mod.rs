//! Authentication module for the busline server

pub mod routes;
pub mod service;
pub mod session;
