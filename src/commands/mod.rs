//! Command implementations, one module per utility.

pub mod genkey;
pub mod get;
pub mod invertkey;
pub mod put;
