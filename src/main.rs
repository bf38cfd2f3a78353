use std::sync::Arc;

use roster::{Config, ProfileService, Server, routes};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> roster::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,roster=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let cfg = Config::load()?;
    info!(
        addr = %cfg.listen_addr(),
        data_dir = %cfg.storage.data_dir.display(),
        max_body_size = cfg.http.max_body_size,
        "configuration loaded"
    );

    let service = Arc::new(ProfileService::open(&cfg.storage).await?);
    let app = routes::app(service, cfg.http.max_body_size);

    Server::bind(&cfg.listen_addr())?.serve(app).await
}
