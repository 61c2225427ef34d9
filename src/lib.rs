pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod field;
pub mod geometry;
pub mod hydrate;
pub mod metrics;
pub mod model;
pub mod scout;
pub mod source;
pub mod store;
