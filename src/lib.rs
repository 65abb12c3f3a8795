pub mod cleanup;
pub mod config;
pub mod error;
pub mod format;
pub mod procs;
pub mod telemetry;
