//! EONET API client creation and management.

use std::sync::Arc;
#[cfg(feature = "client")]
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;
use url::Url;

use super::convert::{parse_categories, parse_events};
use super::error::EonetError;
use super::types::{CategoriesEnvelope, EventsEnvelope};
use crate::http::{HttpRequest, HttpTransport};
use crate::model::{Category, Event, EventStatus};
use crate::source::CatalogSource;

#[cfg(feature = "client")]
use crate::http::reqwest_transport::ReqwestTransport;

/// Default EONET API root.
pub const DEFAULT_API: &str = "https://eonet.gsfc.nasa.gov/api/v3";

/// Category listing endpoint.
pub const CATEGORIES_ENDPOINT: &str = "/categories";

/// Event listing endpoint.
pub const EVENTS_ENDPOINT: &str = "/events";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// EONET API client.
///
/// The category list is fetched at most once per client: the first successful
/// response is cached and handed to every later caller. Failed fetches are not
/// cached.
#[derive(Clone)]
pub struct EonetClient {
    transport: Arc<dyn HttpTransport>,
    base_url: Url,
    categories: Arc<OnceCell<Vec<Category>>>,
}

impl EonetClient {
    /// Create a new client backed by reqwest.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use std::time::Duration;
    ///
    /// let client = EonetClient::new(DEFAULT_API, Duration::from_secs(30))?;
    /// let categories = client.fetch_categories().await?;
    /// ```
    #[cfg(feature = "client")]
    pub fn new(base_url: &str, timeout: StdDuration) -> Result<Self, EonetError> {
        let transport =
            ReqwestTransport::with_timeout(timeout).map_err(|e| EonetError::Config(e.to_string()))?;
        Self::new_with_transport(base_url, Arc::new(transport))
    }

    pub fn new_with_transport(
        base_url: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, EonetError> {
        let trimmed = base_url.trim_end_matches('/');
        let base_url =
            Url::parse(trimmed).map_err(|_| EonetError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(EonetError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            transport,
            base_url,
            categories: Arc::new(OnceCell::new()),
        })
    }

    /// Get the API root.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build the URL for `endpoint` with the given query parameters.
    ///
    /// Query values must be JSON scalars; anything else is rejected with
    /// [`EonetError::InvalidParameter`].
    pub fn endpoint_url(&self, endpoint: &str, query: &[(&str, Value)]) -> Result<Url, EonetError> {
        let raw = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw).map_err(|_| EonetError::InvalidUrl(endpoint.to_string()))?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(EonetError::InvalidParameter {
                            name: (*name).to_string(),
                            value: other.to_string(),
                        });
                    }
                };
                pairs.append_pair(name, &rendered);
            }
        }

        Ok(url)
    }

    /// Make a GET request and decode the JSON body.
    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, EonetError> {
        let response = self
            .transport
            .send(HttpRequest::get_json(url.as_str()))
            .await
            .map_err(|e| EonetError::Http(e.to_string()))?;

        if !response.is_success() {
            let message = String::from_utf8_lossy(&response.body).to_string();
            return Err(EonetError::Api {
                status: response.status,
                message,
            });
        }

        serde_json::from_slice(&response.body).map_err(|_| EonetError::InvalidJson(url.to_string()))
    }

    #[tracing::instrument(skip(self))]
    async fn load_categories(&self) -> Result<Vec<Category>, EonetError> {
        let url = self.endpoint_url(CATEGORIES_ENDPOINT, &[])?;
        let envelope: CategoriesEnvelope = self.get(url).await?;
        let categories = parse_categories(&envelope.categories);

        tracing::debug!(
            received = envelope.categories.len(),
            parsed = categories.len(),
            "Fetched categories"
        );
        Ok(categories)
    }

    /// Fetch one page of events, propagating errors.
    #[tracing::instrument(skip(self, category), fields(category = %category.id))]
    pub async fn try_fetch_events(
        &self,
        category: &Category,
        window_days: u32,
        status: EventStatus,
    ) -> Result<Vec<Event>, EonetError> {
        let url = self.endpoint_url(
            EVENTS_ENDPOINT,
            &[
                ("category", Value::from(category.id.as_str())),
                ("days", Value::from(window_days)),
                ("status", Value::from(status.as_str())),
            ],
        )?;
        let envelope: EventsEnvelope = self.get(url).await?;
        Ok(parse_events(&envelope.events))
    }
}

#[async_trait]
impl CatalogSource for EonetClient {
    async fn fetch_categories(&self) -> Result<Vec<Category>, EonetError> {
        self.categories
            .get_or_try_init(|| self.load_categories())
            .await
            .cloned()
    }

    async fn fetch_events(
        &self,
        category: &Category,
        window_days: u32,
        status: EventStatus,
    ) -> Vec<Event> {
        match self.try_fetch_events(category, window_days, status).await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(
                    category = %category.id,
                    status = %status,
                    error = %e,
                    "Event fetch failed, using empty result"
                );
                Vec::new()
            }
        }
    }
}
