//! Route handlers for the menu API.

use axum::{
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chef_menu_core::api::wire::{
    CategoryRequest, CreateCategoryResponse, CreateItemResponse,
    FeaturedResponse, ItemPayload, MenuResponse, PhotoResponse, SearchResponse,
    SetFeaturedRequest, StatusBody,
};
use chef_menu_core::models::{CategoryId, ChefId, ChefQuery, ItemId};
use chef_menu_core::picker::mime_for;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::AuthChef;
use super::store::{StoreError, StoredPhoto};
use super::AppState;

// ============================================================================
// Errors
// ============================================================================

/// Failure answered as `{success: false, error}` with a matching status.
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    BadRequest(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Store(err) => {
                let status = match err {
                    StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    StoreError::Forbidden => StatusCode::FORBIDDEN,
                    StoreError::Conflict { .. } => StatusCode::CONFLICT,
                    StoreError::Invalid(_) => StatusCode::BAD_REQUEST,
                };
                (status, err.to_string())
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };
        (status, Json(StatusBody::failed(message))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Rejects writes to a menu other than the caller's own.
fn ensure_owner(auth: AuthChef, chef: ChefId) -> Result<(), ApiError> {
    if auth.chef_id == chef {
        Ok(())
    } else {
        Err(StoreError::Forbidden.into())
    }
}

// ============================================================================
// Public
// ============================================================================

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint (no auth required)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn photo(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.store.photo(&name) {
        Some(photo) => ([(header::CONTENT_TYPE, photo.content_type)], photo.bytes).into_response(),
        None => ApiError::Store(StoreError::NotFound("Photo")).into_response(),
    }
}

// ============================================================================
// Menu
// ============================================================================

pub async fn fetch_menu(
    State(state): State<AppState>,
    Path(chef): Path<ChefId>,
) -> Json<MenuResponse> {
    Json(state.store.menu(chef))
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthChef>,
    Path(chef): Path<ChefId>,
    body: Result<Json<CategoryRequest>, JsonRejection>,
) -> ApiResult<CreateCategoryResponse> {
    ensure_owner(auth, chef)?;
    let Json(body) = body?;
    let category_id = state.store.create_category(chef, &body.name)?;
    Ok(Json(CreateCategoryResponse { category_id }))
}

pub async fn rename_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthChef>,
    Path(id): Path<CategoryId>,
    body: Result<Json<CategoryRequest>, JsonRejection>,
) -> ApiResult<StatusBody> {
    let Json(body) = body?;
    state.store.rename_category(auth.chef_id, id, &body.name)?;
    Ok(Json(StatusBody::ok()))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthChef>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_category(auth.chef_id, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthChef>,
    Path(chef): Path<ChefId>,
    body: Result<Json<ItemPayload>, JsonRejection>,
) -> ApiResult<CreateItemResponse> {
    ensure_owner(auth, chef)?;
    let Json(payload) = body?;
    let item_id = state.store.create_item(chef, &payload)?;
    Ok(Json(CreateItemResponse {
        success: Some(true),
        item_id,
    }))
}

/// `PUT /menu/item/{id}` carries either the full dish or just availability.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum ItemUpdate {
    Fields(ItemPayload),
    Availability(AvailabilityOnly),
}

/// An availability-only body. Anything else is treated as a broken dish update.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AvailabilityOnly {
    is_available: bool,
}

pub async fn update_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthChef>,
    Path(id): Path<ItemId>,
    body: Result<Json<ItemUpdate>, JsonRejection>,
) -> ApiResult<StatusBody> {
    match body? {
        Json(ItemUpdate::Fields(payload)) => state.store.update_item(auth.chef_id, id, &payload)?,
        Json(ItemUpdate::Availability(AvailabilityOnly { is_available })) => {
            state.store.set_availability(auth.chef_id, id, is_available)?
        }
    }
    Ok(Json(StatusBody::ok()))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthChef>,
    Path(id): Path<ItemId>,
) -> ApiResult<StatusBody> {
    state.store.delete_item(auth.chef_id, id)?;
    Ok(Json(StatusBody::ok()))
}

// ============================================================================
// Featured
// ============================================================================

pub async fn featured(
    State(state): State<AppState>,
    Path(chef): Path<ChefId>,
) -> Json<FeaturedResponse> {
    Json(state.store.featured(chef))
}

#[derive(Serialize)]
pub struct SetFeaturedResponse {
    success: bool,
    version: u64,
}

pub async fn set_featured(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthChef>,
    Path(chef): Path<ChefId>,
    body: Result<Json<SetFeaturedRequest>, JsonRejection>,
) -> ApiResult<SetFeaturedResponse> {
    ensure_owner(auth, chef)?;
    let Json(request) = body?;
    let version = state
        .store
        .set_featured(chef, &request.item_ids, request.version)?;
    Ok(Json(SetFeaturedResponse {
        success: true,
        version,
    }))
}

// ============================================================================
// Photos
// ============================================================================

/// Largest accepted photo upload.
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthChef>,
    Path(id): Path<ItemId>,
    mut multipart: Multipart,
) -> ApiResult<PhotoResponse> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("photo") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("photo").to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| mime_for(&file_name).to_string());
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("Photo is empty".to_string()));
        }

        let name = format!("{}-{}.{}", id, Uuid::new_v4().simple(), extension(&file_name));
        let url = format!("{}/photos/{}", state.public_url, name);
        state.store.store_photo(
            auth.chef_id,
            id,
            name,
            url.clone(),
            StoredPhoto {
                content_type,
                bytes: bytes.to_vec(),
            },
        )?;
        tracing::info!(item = %id, url = %url, "Photo stored");
        return Ok(Json(PhotoResponse {
            photo_url: Some(url),
        }));
    }
    Err(ApiError::BadRequest("Missing 'photo' file part".to_string()))
}

fn extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string())
}

// ============================================================================
// Search
// ============================================================================

pub async fn search_chefs(
    State(state): State<AppState>,
    query: Result<Query<ChefQuery>, QueryRejection>,
) -> ApiResult<SearchResponse> {
    let Query(query) = query?;
    Ok(Json(SearchResponse {
        chefs: state.store.search(&query),
    }))
}
