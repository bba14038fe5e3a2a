pub mod backend;
pub mod config;
pub mod explain;
pub mod output;
pub mod record;
pub mod stderr_buffer;
pub mod telemetry;
pub mod tui;
