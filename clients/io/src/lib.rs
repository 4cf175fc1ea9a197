//! # Deformable mirror inputs/outputs
//!
//! Unique identifiers of the data exchanged between the modal command clients.

pub mod mirror;
