//! Marketplace backend API client implementation.
//!
//! One shared `reqwest::Client` behind an `Arc`, JSON envelope handling in
//! a single `send` path, and a `moka` cache (5-minute TTL) in front of the
//! catalog reads.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::COOKIE;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use tiffinbox_core::{MealId, OrderId, OrderStatus, ProviderId};

use crate::api::ApiError;
use crate::api::cache::{CacheKey, CacheValue};
use crate::api::types::{
    BackendSession, CreateOrderInput, CreateReviewInput, Meal, MealFilter, MealPage, Order,
    Provider, Review, UserProfile,
};
use crate::config::BackendConfig;

/// Success envelope: `{ "data": ... }`.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Error envelope: `{ "message": ... }`.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

// Named wrappers inside the `data` object.

#[derive(Deserialize)]
struct MealData {
    meal: Meal,
}

#[derive(Deserialize)]
struct ProvidersData {
    #[serde(default)]
    providers: Vec<Provider>,
}

#[derive(Deserialize)]
struct ProviderData {
    provider: Provider,
}

#[derive(Deserialize)]
struct OrderData {
    order: Order,
}

#[derive(Deserialize)]
struct OrdersData {
    #[serde(default)]
    orders: Vec<Order>,
}

#[derive(Deserialize)]
struct UserData {
    user: UserProfile,
}

#[derive(Deserialize)]
struct ReviewData {
    review: Review,
}

#[derive(Deserialize)]
struct ReviewsData {
    #[serde(default)]
    reviews: Vec<Review>,
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the marketplace REST backend.
///
/// Cheaply cloneable; catalog responses are cached for 5 minutes.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend API client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                cache,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.inner.client.get(self.url(path))
    }

    fn get_auth(&self, path: &str, auth: &BackendSession) -> reqwest::RequestBuilder {
        self.get(path).header(COOKIE, auth.cookie_header().to_owned())
    }

    fn post_auth(&self, path: &str, auth: &BackendSession) -> reqwest::RequestBuilder {
        self.inner
            .client
            .post(self.url(path))
            .header(COOKIE, auth.cookie_header().to_owned())
    }

    fn patch_auth(&self, path: &str, auth: &BackendSession) -> reqwest::RequestBuilder {
        self.inner
            .client
            .patch(self.url(path))
            .header(COOKIE, auth.cookie_header().to_owned())
    }

    /// Send a request and unwrap the `{ data }` envelope.
    ///
    /// Non-2xx responses become `ApiError` variants carrying the backend's
    /// `message` field (or a synthesized one when the body is not JSON).
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|error| error.message)
                .unwrap_or_else(|| format!("Request failed with HTTP {status}"));

            return Err(match status {
                reqwest::StatusCode::NOT_FOUND => ApiError::NotFound(message),
                reqwest::StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
                _ => ApiError::Backend {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })?;

        Ok(envelope.data)
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Fetch one page of the meal catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_meals(&self, filter: &MealFilter) -> Result<MealPage, ApiError> {
        let query = filter.to_query();
        let cache_key = CacheKey::Meals(
            query
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join("&"),
        );

        if let Some(CacheValue::Meals(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for meal page");
            return Ok(page);
        }

        let page: MealPage = self.send(self.get("/meals").query(&query)).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Meals(page.clone()))
            .await;

        Ok(page)
    }

    /// Fetch a single meal by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the meal is not found or the API request fails.
    #[instrument(skip(self), fields(meal_id = %id))]
    pub async fn get_meal(&self, id: &MealId) -> Result<Meal, ApiError> {
        let cache_key = CacheKey::Meal(id.as_str().to_string());

        if let Some(CacheValue::Meal(meal)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for meal");
            return Ok(*meal);
        }

        let data: MealData = self.send(self.get(&format!("/meals/{id}"))).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Meal(Box::new(data.meal.clone())))
            .await;

        Ok(data.meal)
    }

    /// Fetch all providers.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_providers(&self) -> Result<Vec<Provider>, ApiError> {
        if let Some(CacheValue::Providers(providers)) =
            self.inner.cache.get(&CacheKey::Providers).await
        {
            debug!("Cache hit for providers");
            return Ok(providers);
        }

        let data: ProvidersData = self.send(self.get("/providers")).await?;

        self.inner
            .cache
            .insert(
                CacheKey::Providers,
                CacheValue::Providers(data.providers.clone()),
            )
            .await;

        Ok(data.providers)
    }

    /// Fetch a provider with its menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is not found or the API request fails.
    #[instrument(skip(self), fields(provider_id = %id))]
    pub async fn get_provider(&self, id: &ProviderId) -> Result<Provider, ApiError> {
        let cache_key = CacheKey::Provider(id.as_str().to_string());

        if let Some(CacheValue::Provider(provider)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for provider");
            return Ok(*provider);
        }

        let data: ProviderData = self.send(self.get(&format!("/providers/{id}"))).await?;

        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::Provider(Box::new(data.provider.clone())),
            )
            .await;

        Ok(data.provider)
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Log in against the backend, capturing its session cookie.
    ///
    /// # Errors
    ///
    /// Returns an error on bad credentials, a missing session cookie, or a
    /// failed request.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(UserProfile, BackendSession), ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let auth = BackendSession::from_response(&response);
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|error| error.message)
                .unwrap_or_else(|| "Login failed".to_string());
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let auth = auth.ok_or_else(|| ApiError::Backend {
            status: status.as_u16(),
            message: "Login response carried no session cookie".to_string(),
        })?;

        let envelope: Envelope<UserData> = serde_json::from_str(&body)?;
        Ok((envelope.data.user, auth))
    }

    /// Register a new account. The caller logs in afterwards; registration
    /// itself does not create a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<UserProfile, ApiError> {
        let data: UserData = self
            .send(self.inner.client.post(self.url("/auth/register")).json(
                &serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": password,
                    "role": role,
                }),
            ))
            .await?;
        Ok(data.user)
    }

    /// Fetch the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the backend session is gone.
    #[instrument(skip(self, auth))]
    pub async fn me(&self, auth: &BackendSession) -> Result<UserProfile, ApiError> {
        let data: UserData = self.send(self.get_auth("/auth/me", auth)).await?;
        Ok(data.user)
    }

    /// Invalidate the backend session. Best-effort; errors propagate so the
    /// caller can decide to ignore them.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, auth))]
    pub async fn logout(&self, auth: &BackendSession) -> Result<(), ApiError> {
        let response = self.post_auth("/auth/logout", auth).send().await?;
        let _ = response.text().await;
        Ok(())
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Create an order for one provider group.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend's message if the order is
    /// rejected.
    #[instrument(skip(self, auth, input))]
    pub async fn create_order(
        &self,
        auth: &BackendSession,
        input: &CreateOrderInput,
    ) -> Result<Order, ApiError> {
        let data: OrderData = self.send(self.post_auth("/orders", auth).json(input)).await?;
        Ok(data.order)
    }

    /// List the authenticated customer's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth))]
    pub async fn my_orders(&self, auth: &BackendSession) -> Result<Vec<Order>, ApiError> {
        let data: OrdersData = self.send(self.get_auth("/orders/my-orders", auth)).await?;
        Ok(data.orders)
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the API request fails.
    #[instrument(skip(self, auth), fields(order_id = %id))]
    pub async fn get_order(&self, auth: &BackendSession, id: &OrderId) -> Result<Order, ApiError> {
        let data: OrderData = self.send(self.get_auth(&format!("/orders/{id}"), auth)).await?;
        Ok(data.order)
    }

    /// Cancel an order. Only valid while the backend still has it `PLACED`.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend's message if the cancellation
    /// is rejected.
    #[instrument(skip(self, auth), fields(order_id = %id))]
    pub async fn cancel_order(
        &self,
        auth: &BackendSession,
        id: &OrderId,
    ) -> Result<Order, ApiError> {
        let data: OrderData = self
            .send(self.patch_auth(&format!("/orders/{id}/cancel"), auth))
            .await?;
        Ok(data.order)
    }

    /// Advance an order to the given status (provider side).
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend's message if the transition is
    /// rejected.
    #[instrument(skip(self, auth), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        auth: &BackendSession,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let data: OrderData = self
            .send(
                self.patch_auth(&format!("/orders/{id}/status"), auth)
                    .json(&serde_json::json!({ "status": status })),
            )
            .await?;
        Ok(data.order)
    }

    /// List orders for the authenticated provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth))]
    pub async fn provider_orders(&self, auth: &BackendSession) -> Result<Vec<Order>, ApiError> {
        let data: OrdersData = self
            .send(self.get_auth("/orders/provider/orders", auth))
            .await?;
        Ok(data.orders)
    }

    // =========================================================================
    // Review Methods
    // =========================================================================

    /// Submit a review for a delivered meal.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend's message if the review is
    /// rejected.
    #[instrument(skip(self, auth, input))]
    pub async fn create_review(
        &self,
        auth: &BackendSession,
        input: &CreateReviewInput,
    ) -> Result<Review, ApiError> {
        let data: ReviewData = self
            .send(self.post_auth("/reviews", auth).json(input))
            .await?;
        Ok(data.review)
    }

    /// List the authenticated customer's reviews.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth))]
    pub async fn my_reviews(&self, auth: &BackendSession) -> Result<Vec<Review>, ApiError> {
        let data: ReviewsData = self.send(self.get_auth("/reviews/my-reviews", auth)).await?;
        Ok(data.reviews)
    }
}
