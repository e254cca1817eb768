// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod benchmark;
pub mod extract;
pub mod gate;
pub mod inference;
pub mod metrics;
pub mod report;
pub mod risk;
pub mod segment;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::inference::ModelSet;
