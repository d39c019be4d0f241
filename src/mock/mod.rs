//! Synthetic market data used when the backend is disabled or failing.

pub mod catalog;
mod generator;

pub use generator::{DEFAULT_TRENDING_COUNT, MockGenerator, point_count, seeded_noise};
