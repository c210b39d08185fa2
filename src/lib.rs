// Library module for checksum
// Re-exports modules for use in integration tests and the binary

pub mod checksum;
pub mod cli;
pub mod config;
