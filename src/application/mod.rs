//! Application layer - message routing and services

pub mod errors;
pub mod messaging;
pub mod services;
