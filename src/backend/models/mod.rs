pub mod aleo_value;
pub mod common;
pub mod config;
pub mod init;
pub mod payload;
pub mod session;
pub mod subscription;
pub mod vault;

// Re-export common types/enums for easier access
pub use common::*;
