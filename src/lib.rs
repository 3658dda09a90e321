pub mod cli;
pub mod cli_handlers;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod realtime;
