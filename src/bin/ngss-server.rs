/// NGSS Toolkit WebSocket Server
///
/// Serves curation sessions to browser clients. Configuration comes from the
/// environment; see `ServerConfig`.

use ngss_toolkit::server::run_server;
use ngss_toolkit::websocket::AppState;
use ngss_toolkit::ServerConfig;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let aliases = config
        .load_aliases()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if let Some(path) = &config.alias_file {
        log::info!("using alias table from {}", path.display());
    }

    let state = AppState::from_config(&config, aliases);
    run_server(config, state).await
}
