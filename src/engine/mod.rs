// src/engine/mod.rs

pub mod feasibility;
pub mod selector;

pub use feasibility::evaluate;
pub use selector::select;
