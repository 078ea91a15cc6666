use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use server::accounts::MemoryAccounts;
use server::config::ServerConfig;
use server::connection::{serve, Shared};
use server::ServerError;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let shared = Shared::new(config, Arc::new(MemoryAccounts::new()));
    serve(shared).await
}
