/// attendview HTTP server
///
/// Serves collection views and accepts attendance submissions for the
/// browser UI.

use attendview::config::ServerConfig;
use attendview::server::run_server;
use attendview::source::{DataSource, InMemorySource, JsonDirSource};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let source: Arc<dyn DataSource> = match &config.data_dir {
        Some(dir) => Arc::new(JsonDirSource::new(dir)),
        None => Arc::new(
            InMemorySource::demo()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?,
        ),
    };

    run_server(&config, source).await
}
