//! HTTP implementation of [`MenuApi`] backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Method, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;

use super::wire::{
    AvailabilityPayload, CategoryRequest, CreateCategoryResponse, CreateItemResponse,
    FeaturedResponse, ItemPayload, MenuResponse, PhotoResponse, SearchResponse,
    SetFeaturedRequest,
};
use super::{FeaturedSnapshot, MenuApi, MenuSnapshot};
use crate::error::MenuError;
use crate::models::{CategoryId, ChefId, ChefQuery, ChefSummary, ItemId};
use crate::picker::PickedImage;

/// Timeout for a single request when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Menu service client authenticated with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpMenuApi {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpMenuApi {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(base_url, api_key, reqwest::Client::new())
    }

    /// Creates a client whose requests give up after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MenuError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, api_key, client))
    }

    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            api_key: api_key.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns true if the service answers its health endpoint.
    pub async fn check_health(&self) -> bool {
        match self
            .client
            .get(self.url("/health"))
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(&self.api_key)
    }

    /// Sends a request and decodes the body once it is known to be a success.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, MenuError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("Request could not be completed: {}", e);
            MenuError::Transport(e.to_string())
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| MenuError::Transport(e.to_string()))?;

        let body = parse_body(status, &bytes)?;
        check_outcome(status, &body)?;

        serde_json::from_value(body).map_err(|e| {
            MenuError::application(
                Some(status.as_u16()),
                Some(format!("Unexpected response from server: {}", e)),
            )
        })
    }
}

#[async_trait]
impl MenuApi for HttpMenuApi {
    async fn fetch_menu(&self, chef: ChefId) -> Result<MenuSnapshot, MenuError> {
        tracing::debug!(%chef, "Fetching menu");
        let response: MenuResponse = self
            .send(self.request(Method::GET, &format!("/menu/chef/{}", chef)))
            .await?;
        Ok(MenuSnapshot {
            categories: response.categories,
            items: response.items.into_iter().map(Into::into).collect(),
        })
    }

    async fn create_category(&self, chef: ChefId, name: &str) -> Result<CategoryId, MenuError> {
        tracing::debug!(%chef, name, "Creating category");
        let body = CategoryRequest {
            name: name.to_string(),
        };
        let response: CreateCategoryResponse = self
            .send(
                self.request(Method::POST, &format!("/menu/chef/{}/categories", chef))
                    .json(&body),
            )
            .await?;
        Ok(response.category_id)
    }

    async fn rename_category(&self, id: CategoryId, name: &str) -> Result<(), MenuError> {
        tracing::debug!(category = %id, name, "Renaming category");
        let body = CategoryRequest {
            name: name.to_string(),
        };
        self.send::<IgnoredAny>(
            self.request(Method::PUT, &format!("/menu/categories/{}", id))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), MenuError> {
        tracing::debug!(category = %id, "Deleting category");
        self.send::<IgnoredAny>(self.request(Method::DELETE, &format!("/menu/categories/{}", id)))
            .await?;
        Ok(())
    }

    async fn create_item(&self, chef: ChefId, item: &ItemPayload) -> Result<ItemId, MenuError> {
        tracing::debug!(%chef, dish = %item.dish_name, "Creating item");
        let response: CreateItemResponse = self
            .send(
                self.request(Method::POST, &format!("/menu/chef/{}", chef))
                    .json(item),
            )
            .await?;
        Ok(response.item_id)
    }

    async fn update_item(&self, id: ItemId, item: &ItemPayload) -> Result<(), MenuError> {
        tracing::debug!(item = %id, "Updating item");
        self.send::<IgnoredAny>(
            self.request(Method::PUT, &format!("/menu/item/{}", id))
                .json(item),
        )
        .await?;
        Ok(())
    }

    async fn set_availability(&self, id: ItemId, available: bool) -> Result<(), MenuError> {
        tracing::debug!(item = %id, available, "Setting availability");
        self.send::<IgnoredAny>(
            self.request(Method::PUT, &format!("/menu/item/{}", id))
                .json(&AvailabilityPayload {
                    is_available: available,
                }),
        )
        .await?;
        Ok(())
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), MenuError> {
        tracing::debug!(item = %id, "Deleting item");
        self.send::<IgnoredAny>(self.request(Method::DELETE, &format!("/menu/item/{}", id)))
            .await?;
        Ok(())
    }

    async fn featured(&self, chef: ChefId) -> Result<FeaturedSnapshot, MenuError> {
        let response: FeaturedResponse = self
            .send(self.request(Method::GET, &format!("/menu/chef/{}/featured", chef)))
            .await?;
        Ok(FeaturedSnapshot {
            ids: response.featured_items.into_iter().map(|i| i.id).collect(),
            version: response.version,
        })
    }

    async fn set_featured(
        &self,
        chef: ChefId,
        ids: &[ItemId],
        version: Option<u64>,
    ) -> Result<(), MenuError> {
        tracing::debug!(%chef, count = ids.len(), ?version, "Replacing featured list");
        let body = SetFeaturedRequest {
            item_ids: ids.to_vec(),
            version,
        };
        self.send::<IgnoredAny>(
            self.request(Method::POST, &format!("/menu/chef/{}/featured", chef))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn upload_photo(&self, id: ItemId, image: PickedImage) -> Result<String, MenuError> {
        tracing::debug!(item = %id, file = %image.file_name, size = image.bytes.len(), "Uploading photo");
        let part = multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime_type)
            .map_err(|e| MenuError::Image(e.to_string()))?;
        let form = multipart::Form::new().part("photo", part);

        let response: PhotoResponse = self
            .send(
                self.request(Method::POST, &format!("/menu/item/{}/photo", id))
                    .multipart(form),
            )
            .await?;

        response
            .photo_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                MenuError::application(None, Some("Upload failed: no photo URL returned".into()))
            })
    }

    async fn search_chefs(&self, query: &ChefQuery) -> Result<Vec<ChefSummary>, MenuError> {
        let response: SearchResponse = self
            .send(self.request(Method::GET, "/search/chefs").query(query))
            .await?;
        Ok(response.chefs)
    }
}

/// Accepts `host:port` and `http://host/` forms and returns a base without a trailing slash.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

fn parse_body(status: StatusCode, bytes: &[u8]) -> Result<Value, MenuError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Ok(value),
        // Error pages are often plain text; let the status decide.
        Err(_) if !status.is_success() => Ok(Value::Null),
        Err(e) => Err(MenuError::application(
            Some(status.as_u16()),
            Some(format!("Unexpected response from server: {}", e)),
        )),
    }
}

/// Treats non-2xx statuses, `success: false` and a bare `error` field as failures.
fn check_outcome(status: StatusCode, body: &Value) -> Result<(), MenuError> {
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .map(str::to_string);
    let success = body.get("success").and_then(Value::as_bool);

    let failed = !status.is_success()
        || success == Some(false)
        || (success.is_none() && body.get("error").is_some_and(|e| !e.is_null()));

    if failed {
        tracing::warn!(status = status.as_u16(), ?message, "Request declined by server");
        return Err(MenuError::application(Some(status.as_u16()), message));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GENERIC_FAILURE_MESSAGE;
    use serde_json::json;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("localhost:8080"), "http://localhost:8080");
        assert_eq!(normalize_base_url("http://localhost:8080/"), "http://localhost:8080");
        assert_eq!(normalize_base_url("https://menu.example.com"), "https://menu.example.com");
    }

    #[test]
    fn test_success_false_on_200_is_failure() {
        let body = json!({"success": false, "error": "Dish name already used"});
        let err = check_outcome(StatusCode::OK, &body).unwrap_err();
        assert_eq!(
            err,
            MenuError::Application {
                status: Some(200),
                message: "Dish name already used".to_string()
            }
        );
    }

    #[test]
    fn test_error_field_without_success_is_failure() {
        let body = json!({"error": "Category not found"});
        assert!(check_outcome(StatusCode::OK, &body).is_err());

        let body = json!({"success": true, "error": null});
        assert!(check_outcome(StatusCode::OK, &body).is_ok());
    }

    #[test]
    fn test_non_2xx_without_message_uses_generic() {
        let err = check_outcome(StatusCode::INTERNAL_SERVER_ERROR, &Value::Null).unwrap_err();
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_empty_body_is_empty_object() {
        let body = parse_body(StatusCode::NO_CONTENT, b"").unwrap();
        assert_eq!(body, json!({}));
        assert!(check_outcome(StatusCode::NO_CONTENT, &body).is_ok());
    }

    #[test]
    fn test_invalid_json_on_success_is_application_error() {
        let err = parse_body(StatusCode::OK, b"<html>").unwrap_err();
        assert!(matches!(err, MenuError::Application { .. }));
        assert!(parse_body(StatusCode::BAD_GATEWAY, b"<html>").is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port 9 (discard) on localhost is almost never listening.
        let api = HttpMenuApi::with_timeout("127.0.0.1:9", "key", Duration::from_secs(2)).unwrap();
        let err = api.delete_item(ItemId(1)).await.unwrap_err();
        assert!(matches!(err, MenuError::Transport(_)));
        assert!(!api.check_health().await);
    }
}
