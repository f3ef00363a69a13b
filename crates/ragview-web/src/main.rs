//! ragview web server
//!
//! Run with: cargo run -p ragview-web

use tracing::info;
use tracing_subscriber::EnvFilter;

use ragview_config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ragview=debug,tower_http=info,info")),
        )
        .init();

    info!("Starting ragview web server...");

    let config = Config::load()?;
    info!(
        root = %config.explorer.root_dir.display(),
        engine = %config.query.program,
        "Configuration loaded"
    );

    let state = ragview_web::state::AppState::new(&config)?;
    let app = ragview_web::router::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
