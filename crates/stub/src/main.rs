//! Standalone stub server binary.
//!
//! Serves the in-memory REST namespace on `OMRS_STUB_ADDR` (default `127.0.0.1:8080`) so the CLI
//! and scenario runner can be pointed at it with
//! `OPENMRS_BASE_URL=http://127.0.0.1:8080/openmrs/ws/rest/v1`.

use omrs_stub::{router, StubState, BASE_PATH};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("omrs_stub=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("OMRS_STUB_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into());

    tracing::info!("-- Starting OMRS stub on http://{}{}", addr, BASE_PATH);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(StubState::seeded())).await?;

    Ok(())
}
