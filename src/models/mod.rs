pub mod commands;
pub mod config;
pub mod devices;
pub mod telemetry;
