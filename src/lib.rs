// src/lib.rs

pub mod authoring;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod store;
pub mod sweep;

// Re-export specific items for convenience if needed
pub use error::ExamError;
