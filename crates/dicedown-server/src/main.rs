//! Runnable Dicedown server.
//!
//! Bind address comes from the first CLI argument, then the
//! `DICEDOWN_ADDR` environment variable, then the default.

use dicedown_server::{GameServer, ServerError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("DICEDOWN_ADDR").ok())
        .unwrap_or_else(|| "0.0.0.0:8080".to_string());

    let server = GameServer::builder().bind(&addr).build().await?;
    server.run().await
}
