//! Authenticated HTTP client for the remote catalog/order service.
//!
//! All endpoints live under `/api/v1`. Read-only catalog queries are
//! cached with `moka` (5-minute TTL); catalog mutations invalidate the
//! cache. Authenticated requests carry the session's bearer token.

mod cache;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use copperpot_core::{OrderId, ProductId};

use crate::models::{
    AuthResponse, Category, Credentials, NewProduct, OrderRequest, OrderSummary, Product,
    RegisterRequest,
};
use crate::session::SessionStore;

use cache::{CacheKey, CacheValue};

/// Catalog cache TTL.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Shown when the service reports a failure without a usable message.
pub const GENERIC_REMOTE_ERROR: &str = "Failed to place order.";

/// Errors from the remote service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused, reset).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("remote error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Remote {
        status: u16,
        /// Human-readable message from the error payload, when present.
        message: Option<String>,
    },

    /// The response body was not what we expected.
    #[error("response parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// The message to surface to the user: the server-provided one when
    /// available, otherwise a generic fallback.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote {
                message: Some(message),
                ..
            } => message.clone(),
            _ => GENERIC_REMOTE_ERROR.to_owned(),
        }
    }
}

/// Error payload shape: `{"message": ...}` or the legacy `{"error": ...}`.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Success payload of `POST /orders` when the service returns JSON.
#[derive(Debug, serde::Deserialize)]
struct OrderPlaced {
    id: Option<OrderId>,
}

/// Client for the catalog/order service.
///
/// Cheap to clone; the HTTP connection pool, cache, and session handle
/// are shared.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base: Url,
    sessions: SessionStore,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a client rooted at `base` (e.g. `http://localhost:8080`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(base: Url, timeout: Duration, sessions: SessionStore) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();
        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base,
                sessions,
                cache,
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}api/v1/{path}", self.inner.base)
    }

    /// Attach the bearer token when a session exists.
    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.inner.sessions.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and decode a JSON success body.
    async fn expect_json<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let text = Self::expect_text(request).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Send a request and return the raw success body, mapping non-success
    /// statuses to [`ApiError::Remote`] with the payload's message.
    async fn expect_text(request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message.or(body.error));
        debug!(status = status.as_u16(), ?message, "remote call failed");
        Err(ApiError::Remote {
            status: status.as_u16(),
            message,
        })
    }

    // =========================================================================
    // Catalog (read-only, cached)
    // =========================================================================

    /// `GET /products`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network, remote, or decode failure.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("products cache hit");
            return Ok(products);
        }

        let products: Vec<Product> =
            Self::expect_json(self.authed(self.inner.http.get(self.endpoint("products")))).await?;
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// `GET /products/:id`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network, remote, or decode failure.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        if let Some(CacheValue::Product(product)) =
            self.inner.cache.get(&CacheKey::Product(id)).await
        {
            debug!(%id, "product cache hit");
            return Ok(*product);
        }

        let product: Product = Self::expect_json(
            self.authed(self.inner.http.get(self.endpoint(&format!("products/{id}")))),
        )
        .await?;
        self.inner
            .cache
            .insert(
                CacheKey::Product(id),
                CacheValue::Product(Box::new(product.clone())),
            )
            .await;
        Ok(product)
    }

    /// `GET /categories`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network, remote, or decode failure.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("categories cache hit");
            return Ok(categories);
        }

        let categories: Vec<Category> =
            Self::expect_json(self.authed(self.inner.http.get(self.endpoint("categories"))))
                .await?;
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;
        Ok(categories)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// `POST /orders`
    ///
    /// The service may answer with a JSON `{id}` or a plain confirmation
    /// string; both count as success.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network or remote failure.
    #[instrument(skip(self, order), fields(lines = order.items.len()))]
    pub async fn place_order(&self, order: &OrderRequest) -> Result<Option<OrderId>, ApiError> {
        let text = Self::expect_text(
            self.authed(self.inner.http.post(self.endpoint("orders")).json(order)),
        )
        .await?;
        Ok(serde_json::from_str::<OrderPlaced>(&text)
            .ok()
            .and_then(|placed| placed.id))
    }

    /// `GET /orders` - order history for the current session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network, remote, or decode failure.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<OrderSummary>, ApiError> {
        Self::expect_json(self.authed(self.inner.http.get(self.endpoint("orders")))).await
    }

    // =========================================================================
    // Admin catalog mutation
    // =========================================================================

    /// `POST /products`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network, remote, or decode failure.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        let created = Self::expect_json(
            self.authed(self.inner.http.post(self.endpoint("products")).json(product)),
        )
        .await?;
        self.invalidate_catalog().await;
        Ok(created)
    }

    /// `PUT /products/:id`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network, remote, or decode failure.
    #[instrument(skip(self, product))]
    pub async fn update_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, ApiError> {
        let updated = Self::expect_json(
            self.authed(
                self.inner
                    .http
                    .put(self.endpoint(&format!("products/{id}")))
                    .json(product),
            ),
        )
        .await?;
        self.invalidate_catalog().await;
        Ok(updated)
    }

    /// `POST /products/upload` - bulk CSV upload, multipart field `file`.
    ///
    /// Returns the service's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network or remote failure.
    #[instrument(skip(self, contents), fields(bytes = contents.len()))]
    pub async fn upload_products(
        &self,
        file_name: String,
        contents: Vec<u8>,
    ) -> Result<String, ApiError> {
        let part = reqwest::multipart::Part::bytes(contents).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);
        let message = Self::expect_text(
            self.authed(
                self.inner
                    .http
                    .post(self.endpoint("products/upload"))
                    .multipart(form),
            ),
        )
        .await?;
        self.invalidate_catalog().await;
        Ok(message)
    }

    async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        debug!("catalog cache invalidated");
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// `POST /auth/register` - the response token is handed to the session
    /// store by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network, remote, or decode failure.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        Self::expect_json(self.inner.http.post(self.endpoint("auth/register")).json(request))
            .await
    }

    /// `POST /auth/authenticate`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network, remote, or decode failure.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        Self::expect_json(
            self.inner
                .http
                .post(self.endpoint("auth/authenticate"))
                .json(credentials),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_message() {
        let err = ApiError::Remote {
            status: 400,
            message: Some("Product not found".to_owned()),
        };
        assert_eq!(err.user_message(), "Product not found");
    }

    #[test]
    fn test_user_message_falls_back_to_generic() {
        let err = ApiError::Remote {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), GENERIC_REMOTE_ERROR);
    }

    #[test]
    fn test_error_body_accepts_both_keys() {
        let body: ErrorBody = serde_json::from_str(r#"{"message": "m"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("m"));
        let body: ErrorBody = serde_json::from_str(r#"{"error": "e"}"#).unwrap();
        assert_eq!(body.error.as_deref(), Some("e"));
    }
}
