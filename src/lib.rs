//! instantcmd - a chat bot whose commands can be defined at runtime.
//!
//! The owner submits a script snippet through chat; the snippet is compiled,
//! validated and registered as a live command, and its text is persisted so
//! the command survives restarts.

pub mod application;
pub mod domain;
pub mod infrastructure;
