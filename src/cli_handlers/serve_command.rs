use crate::cli::ServeArgs;
use crate::config::{ConfigOverrides, ServerConfig};
use crate::error::Result;
use crate::logging::cleanup_old_logs;
use crate::realtime::server::RelayServer;

impl From<ServeArgs> for ConfigOverrides {
    fn from(args: ServeArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            frontend_url: args.frontend_url,
            heartbeat_secs: args.heartbeat_secs,
            log_file: args.log_file,
        }
    }
}

/// Defaults, then environment, then flags
pub fn resolve_server_config(args: ServeArgs) -> Result<ServerConfig> {
    let config = ServerConfig::from_env()?.with_overrides(args.into());
    config.validate()?;
    Ok(config)
}

pub async fn handle_serve(config: ServerConfig) -> Result<()> {
    if let Some(dir) = config.log_file.as_ref().and_then(|f| f.parent()) {
        if let Err(e) = cleanup_old_logs(dir, config.log_retention_days) {
            tracing::warn!("Log cleanup failed: {}", e);
        }
    }

    RelayServer::new(config).run().await?;
    Ok(())
}
