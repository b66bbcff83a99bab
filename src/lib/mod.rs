//! Shared library modules providing error types, file and path helpers, command
//! construction, and telemetry initialization.

pub mod command;
pub mod errors;
pub mod fs;
pub mod paths;
pub mod telemetry;
