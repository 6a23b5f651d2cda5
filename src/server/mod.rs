//! Reference implementation of the chef menu REST API.
//!
//! Menus, featured lists and photos are kept in memory. Every route except
//! `/health` and `/photos/{name}` requires a bearer API key that maps to a
//! chef account; writes are only accepted for the caller's own menu.

pub mod auth;
pub mod config;
pub mod handlers;
pub mod store;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

pub use auth::{ApiKeyStore, AuthChef};
pub use config::{ApiKeyEntry, ConfigFile, ServerConfig};
pub use store::{ChefProfile, MenuStore, StoreError};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub api_keys: Arc<ApiKeyStore>,
    pub store: Arc<MenuStore>,
    /// Base URL used to build photo links, without a trailing slash
    pub public_url: Arc<str>,
}

impl AppState {
    pub fn new(api_keys: ApiKeyStore, store: MenuStore, public_url: &str) -> Self {
        Self {
            api_keys: Arc::new(api_keys),
            store: Arc::new(store),
            public_url: Arc::from(public_url.trim_end_matches('/')),
        }
    }

    pub fn from_config(file: ConfigFile, public_url: &str) -> Self {
        Self::new(
            ApiKeyStore::from_entries(file.api_keys),
            MenuStore::new(file.chefs),
            public_url,
        )
    }
}

/// Builds the full router.
pub fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/photos/{name}", get(handlers::photo));

    let protected_routes = Router::new()
        .route(
            "/menu/chef/{chef_id}",
            get(handlers::fetch_menu).post(handlers::create_item),
        )
        .route(
            "/menu/chef/{chef_id}/categories",
            post(handlers::create_category),
        )
        .route(
            "/menu/chef/{chef_id}/featured",
            get(handlers::featured).post(handlers::set_featured),
        )
        .route(
            "/menu/categories/{category_id}",
            put(handlers::rename_category).delete(handlers::delete_category),
        )
        .route(
            "/menu/item/{item_id}",
            put(handlers::update_item).delete(handlers::delete_item),
        )
        .route(
            "/menu/item/{item_id}/photo",
            post(handlers::upload_photo).layer(DefaultBodyLimit::max(handlers::MAX_PHOTO_BYTES)),
        )
        .route("/search/chefs", get(handlers::search_chefs))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
