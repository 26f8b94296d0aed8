//! Infrastructure layer - adapters, config, persistence, scripting

pub mod adapters;
pub mod config;
pub mod script;
pub mod storage;
