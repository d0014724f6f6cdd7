//! MovieTime backend - movie and TV show catalogue over a graph database
//!
//! Users register, log in, rate and favorite movies and TV shows; admins
//! maintain the catalogue. All data lives in Neo4j (or the in-memory store
//! for tests and local runs).

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod services;

pub use app::{build_app, AppState};
