// CLI command handlers module
//
// Server: serve
// Client: send, typing, listen

pub mod client_commands;
pub mod serve_command;

pub use client_commands::{handle_listen, handle_send, handle_typing};
pub use serve_command::{handle_serve, resolve_server_config};
