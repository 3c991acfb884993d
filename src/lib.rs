//! GitHub profile dashboard: ingest a user's public GitHub data into a
//! document store and derive chart-ready datasets from it.

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod models;
pub mod normalize;
pub mod presentation;
pub mod session;
pub mod storage;
pub mod sync;
pub mod types;

pub use error::{DashboardError, Result};
