pub mod builtin;
pub mod instant;

pub use instant::{InstantCmd, RegistrySettings};
