use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const LONG_ABOUT: &str = r#"
Lost & Found Relay - real-time direct messaging for the campus Lost & Found app

Clients open a WebSocket to /ws, send `register` with their user id, and then
exchange `send_message` and `typing` events addressed by recipient id. Events
for users who are not connected are dropped.

Environment:
  PORT                 Listen port (default 5000)
  FRONTEND_URL         Allowed CORS origin (default http://localhost:5173)
  LFR_HOST             Bind address (default 0.0.0.0)
  LFR_HEARTBEAT_SECS   WebSocket ping interval (default 30)
  LFR_LOG_FILE         Write server logs to a daily-rolling file
  LFR_LOG_RETENTION_DAYS  Days to keep rotated logs (default 7)
  RUST_LOG             Override log filtering
"#;

#[derive(Parser, Clone)]
#[command(name = "lfr")]
#[command(about = "Real-time presence and direct-message relay for Lost & Found")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output (-q)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run the relay server
    ///
    /// Examples:
    ///   lfr serve
    ///   lfr serve --port 8080 --frontend-url https://lostfound.example.edu
    Serve(ServeArgs),

    /// Send one direct message and exit
    ///
    /// The message is sent as JSON when it parses as JSON, otherwise as a string.
    ///
    /// Examples:
    ///   lfr send --to bob "I found your keys"
    ///   lfr send --to bob '{"text":"Claimed","itemId":"42"}'
    Send {
        #[command(flatten)]
        target: ClientTarget,

        /// Message payload
        message: String,
    },

    /// Send a typing indicator and exit
    Typing {
        #[command(flatten)]
        target: ClientTarget,

        /// Send "stopped typing" instead
        #[arg(long)]
        stop: bool,
    },

    /// Register as a user and print every event relayed to it
    ///
    /// Each event is printed as one JSON line. Reconnects automatically.
    ///
    /// Examples:
    ///   lfr listen --as bob
    ///   lfr listen --as bob --count 1
    Listen {
        /// Server WebSocket URL
        #[arg(long, default_value = DEFAULT_WS_URL)]
        url: String,

        /// User id to register as
        #[arg(long = "as", value_name = "USER")]
        user: String,

        /// Exit after this many events
        #[arg(long)]
        count: Option<usize>,
    },
}

pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:5000/ws";

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    /// Bind address
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Allowed CORS origin
    #[arg(long)]
    pub frontend_url: Option<String>,

    /// Seconds between WebSocket pings
    #[arg(long)]
    pub heartbeat_secs: Option<u64>,

    /// Write logs to a daily-rolling file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct ClientTarget {
    /// Server WebSocket URL
    #[arg(long, default_value = DEFAULT_WS_URL)]
    pub url: String,

    /// Recipient user id
    #[arg(long)]
    pub to: String,
}
