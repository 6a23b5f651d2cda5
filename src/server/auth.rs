//! Bearer-key authentication.

use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chef_menu_core::models::ChefId;
use serde::Serialize;

use super::config::ApiKeyEntry;
use super::AppState;

/// Authenticated chef, added to request extensions after auth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthChef {
    pub chef_id: ChefId,
}

/// API key store - maps key -> AuthChef
#[derive(Debug, Clone, Default)]
pub struct ApiKeyStore {
    keys: HashMap<String, AuthChef>,
}

impl ApiKeyStore {
    pub fn from_entries(entries: Vec<ApiKeyEntry>) -> Self {
        let keys = entries
            .into_iter()
            .map(|entry| {
                (
                    entry.key,
                    AuthChef {
                        chef_id: entry.chef_id,
                    },
                )
            })
            .collect();
        Self { keys }
    }

    /// Validate an API key and return the associated chef
    pub fn validate(&self, key: &str) -> Option<AuthChef> {
        self.keys.get(key).copied()
    }
}

/// Auth error response
#[derive(Serialize)]
struct AuthError {
    success: bool,
    error: &'static str,
}

fn unauthorized(error: &'static str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(AuthError {
            success: false,
            error,
        }),
    )
        .into_response()
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let api_key = match auth_header {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(key) => key,
            None => return unauthorized("Authorization header must use Bearer scheme"),
        },
        None => return unauthorized("Authorization header required"),
    };

    match state.api_keys.validate(api_key) {
        Some(chef) => {
            request.extensions_mut().insert(chef);
            next.run(request).await
        }
        None => unauthorized("Invalid API key"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let store = ApiKeyStore::from_entries(vec![ApiKeyEntry {
            key: "ana-key".to_string(),
            chef_id: ChefId(1),
        }]);
        assert_eq!(
            store.validate("ana-key"),
            Some(AuthChef { chef_id: ChefId(1) })
        );
        assert_eq!(store.validate("nope"), None);
    }
}
