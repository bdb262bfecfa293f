// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod controller;
pub mod countdown;
pub mod effects;
pub mod error;
pub mod focus;
pub mod history;
pub mod prompt;
pub mod readout;
pub mod registry;
pub mod rest;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod status;
pub mod store;
pub mod timer;
pub mod ui;
