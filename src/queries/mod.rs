pub mod commands;
pub mod devices;
pub mod telemetry;
