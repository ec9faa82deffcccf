pub mod config;
pub mod constants;
pub mod error;
pub mod gate;
pub mod graph;
pub mod model;
pub mod normalizer;
pub mod provider;
pub mod session;
pub mod summary;
pub mod tracing;
pub mod tracker;
pub mod utils;

pub use error::*;
pub use self::tracing::setup_tracing;
pub use tracker::Tracker;
