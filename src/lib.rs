// ABOUTME: Library root for act-container: runtime detection, the container
// ABOUTME: factory and its adapters. The CLI binary is in main.rs.

pub mod config;
pub mod error;
pub mod runtime;
pub mod ssh;
pub mod types;
