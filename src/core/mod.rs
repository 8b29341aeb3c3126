//! Core domain types and abstractions

pub mod catalog;
pub mod config;
pub mod fetch;
pub mod log;
pub mod observation;

// Re-export main types for cleaner imports
pub use catalog::SeriesCatalog;
pub use fetch::{FetchError, ObservationProvider};
pub use observation::{Observation, RawObservation, normalize};
