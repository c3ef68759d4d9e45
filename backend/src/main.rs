//! User directory entry-point: loads settings, wires backends, serves HTTP,
//! and drains backend pools on shutdown.

mod server;

use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{AppSettings, Backends, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let bind_addr = settings.bind_addr()?;

    let backends = Backends::connect(&settings).await?;
    let server = create_server(backends.directory(), &settings, bind_addr)?;
    let result = server.await;

    info!("http server stopped; draining backends");
    backends.shutdown();
    result
}
