//! Chef Menu Server
//!
//! An in-memory menu service implementing the API the `chef` CLI talks to.
//!
//! # Configuration
//!
//! Environment variables:
//! - `CHEFMENU_PORT`: Port to listen on (default: 8080)
//! - `CHEFMENU_CONFIG`: Path to config file (default: ~/.config/chefmenu-server/config.yaml)
//! - `CHEFMENU_PUBLIC_URL`: Base URL used in photo links (default: http://localhost:<port>)
//!
//! # Config File Format
//!
//! ```yaml
//! api_keys:
//!   - key: "your-secret-key-here"
//!     chef_id: 1
//! chefs:
//!   - chef_id: 1
//!     name: "Ana"
//!     cuisines: ["Mexican"]
//! ```

use std::net::SocketAddr;

use chefmenu::{app, AppState, ConfigFile, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chefmenu=info,chefmenu_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!("Config file: {}", config.config_path.display());
    tracing::info!("Public URL: {}", config.public_url);

    let state = AppState::from_config(ConfigFile::load(&config.config_path), &config.public_url);
    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
