//! Joymap dashboard server
//!
//! Load the happiness dataset and serve the interactive dashboard.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use joymap_dash::{DashConfig, DashServer, Dashboard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// World happiness dashboard.
#[derive(Debug, Parser)]
#[command(name = "joymap", version, about)]
struct Cli {
    /// Verbose logging and request tracing
    #[arg(long)]
    debug: bool,

    /// CSV dataset to load (overrides JOYMAP_DATA_PATH)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Listen address (overrides JOYMAP_ADDR)
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Local TopoJSON used to check the region join (overrides JOYMAP_GEOMETRY_PATH)
    #[arg(long)]
    geometry: Option<PathBuf>,
}

impl Cli {
    fn apply(self, mut config: DashConfig) -> DashConfig {
        config.debug |= self.debug;
        if let Some(data) = self.data {
            config.data_path = data;
        }
        if let Some(addr) = self.addr {
            config.addr = addr;
        }
        if let Some(geometry) = self.geometry {
            config.geometry_path = Some(geometry);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.apply(DashConfig::from_env()?);

    // Initialize tracing
    let default_filter = if config.debug {
        "joymap=debug,joymap_dash=debug,joymap_data=debug,tower_http=debug"
    } else {
        "joymap=info,joymap_dash=info,joymap_data=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Joymap dashboard");
    tracing::info!("  Data: {:?}", config.data_path);
    tracing::info!("  Geometry: {}", config.geometry_url);
    if let Some(path) = &config.geometry_path {
        tracing::info!("  Join check: {:?}", path);
    }

    let dashboard = match Dashboard::from_config(&config) {
        Ok(dashboard) => dashboard,
        Err(err) => {
            tracing::error!(%err, "Failed to load dashboard data");
            return Err(err.into());
        }
    };

    DashServer::new(dashboard)
        .with_debug(config.debug)
        .serve(config.addr)
        .await?;

    Ok(())
}
