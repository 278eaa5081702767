// src/models/mod.rs

pub mod attempt;
pub mod blueprint;
pub mod exam;
pub mod question;
