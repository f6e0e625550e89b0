//! CLI command implementations.

pub mod generate;
pub mod init_config;
pub mod validate;
