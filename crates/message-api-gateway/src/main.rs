mod config;
mod error;
mod routes;
mod service;

use anyhow::Result;
use crate::config::Config;
use crate::service::GatewayService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Create and run gateway service
    let gateway = GatewayService::new(config);
    gateway.run().await
}
