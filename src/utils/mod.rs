//! Shared helpers: command execution, hashing, paths.

pub mod exec;
pub mod hash;
pub mod path;
