//! Domain layer - core entities and traits

pub mod entities;
pub mod traits;
