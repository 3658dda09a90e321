use clap::Parser;
use lostfound_relay::cli::{Cli, Commands};
use lostfound_relay::cli_handlers::{
    handle_listen, handle_send, handle_serve, handle_typing, resolve_server_config,
};
use lostfound_relay::config::ServerConfig;
use lostfound_relay::error::{RelayError, Result};
use lostfound_relay::logging::{ApplicationMode, LoggingConfig};
use tracing::Level;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Server config is resolved before logging so the log file can be honoured
    let server_config = match &cli.command {
        Commands::Serve(args) => match resolve_server_config(args.clone()) {
            Ok(config) => Some(config),
            Err(e) => exit_with(&e),
        },
        _ => None,
    };

    let log_config = logging_config(&cli, server_config.as_ref());
    if let Err(e) = lostfound_relay::logging::init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli, server_config).await {
        exit_with(&e);
    }
}

fn logging_config(cli: &Cli, server_config: Option<&ServerConfig>) -> LoggingConfig {
    let Some(server_config) = server_config else {
        let mut config = LoggingConfig::from_args(cli.quiet, cli.verbose > 0, cli.json);
        if cli.verbose == 0 && !cli.quiet {
            config.level = LoggingConfig::for_mode(ApplicationMode::Client).level;
        }
        return config;
    };

    let mut config = LoggingConfig::for_mode(ApplicationMode::Server);
    if cli.verbose > 0 {
        config.level = Level::DEBUG;
        config.enable_spans = true;
    } else if cli.quiet {
        config.level = Level::ERROR;
    }
    config.json_format = cli.json;
    config.file_output = server_config.log_file.clone();
    config
}

async fn run(cli: Cli, server_config: Option<ServerConfig>) -> Result<()> {
    match cli.command {
        Commands::Serve(_) => {
            let config = server_config
                .ok_or_else(|| RelayError::ConfigError("server configuration missing".into()))?;
            handle_serve(config).await?
        },
        Commands::Send { target, message } => handle_send(target, message).await?,
        Commands::Typing { target, stop } => handle_typing(target, stop).await?,
        Commands::Listen { url, user, count } => handle_listen(url, user, count).await?,
    }

    Ok(())
}

fn exit_with(err: &RelayError) -> ! {
    let error_response = err.to_error_response();
    match serde_json::to_string_pretty(&error_response) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("{}", err),
    }
    std::process::exit(1);
}
