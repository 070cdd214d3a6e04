// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod bank;
pub mod codes;
pub mod config;
pub mod history;
pub mod quiz;
pub mod runtime;
pub mod stopwatch;
