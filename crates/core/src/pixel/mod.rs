//! In-memory frame model and color correction.

pub mod frame;
pub mod gamma;
