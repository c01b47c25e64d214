//! Backend entry-point: wires REST endpoints, persistence, and OpenAPI docs.

mod server;

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use backend::inbound::http::health::HealthState;
use backend::outbound::blob::{S3Config, S3ImageStore};
use backend::outbound::persistence::{run_migrations, DbPool, PoolConfig};
use server::{create_server, ServerConfig};

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

    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;

    let mut config = ServerConfig::new(bind_addr);

    match env::var("DATABASE_URL") {
        Ok(database_url) => {
            run_migrations(&database_url)
                .await
                .map_err(std::io::Error::other)?;
            let pool = DbPool::new(PoolConfig::new(database_url))
                .await
                .map_err(std::io::Error::other)?;
            config = config.with_db_pool(pool);
        }
        Err(_) => warn!("DATABASE_URL not set; running without persistence"),
    }

    match env::var("IMAGE_BUCKET") {
        Ok(bucket) => {
            let public_base_url = env::var("IMAGE_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("https://{bucket}.s3.amazonaws.com"));
            let store = S3ImageStore::from_env(S3Config {
                bucket,
                public_base_url,
            })
            .await;
            config = config.with_image_store(Arc::new(store));
        }
        Err(_) => warn!("IMAGE_BUCKET not set; running without a blob store"),
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting server");
    create_server(health_state, config)?.await
}
