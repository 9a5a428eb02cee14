use crate::domain::feed::{Filter, Listing, ListingPage, PageInfo, PopularTag};
use crate::error::{AppError, AppResult, ErrorResponse};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const LISTINGS_PATH: &str = "/api/listings";
const MY_LISTINGS_PATH: &str = "/api/me/listings";
const TAGS_PATH: &str = "/api/tags";

const TAGS_CACHE_KEY: &str = "popular";
const TAGS_CACHE_TTL: Duration = Duration::from_secs(300);

/// Gateway to the listings service. Fetches must be idempotent for identical
/// parameters and safe to retry.
#[async_trait]
pub trait ListingsGateway: Send + Sync {
    async fn fetch_page(&self, filter: &Filter, page: u32) -> AppResult<ListingPage>;

    async fn popular_tags(&self) -> AppResult<Vec<PopularTag>>;
}

/// Management operations on the caller's own listings. Every request carries
/// the bearer token of the current session; the backend enforces ownership.
#[async_trait]
pub trait ListingManagementGateway: Send + Sync {
    async fn create_listing(&self, token: &str, draft: &ListingDraft) -> AppResult<Listing>;

    async fn my_listings(&self, token: &str) -> AppResult<Vec<Listing>>;

    /// Single listing, as shown in the profile/edit views
    async fn fetch_listing(&self, token: &str, listing_id: i64) -> AppResult<Listing>;

    async fn update_listing(
        &self,
        token: &str,
        listing_id: i64,
        update: &ListingUpdate,
    ) -> AppResult<Listing>;

    async fn delete_listing(&self, token: &str, listing_id: i64) -> AppResult<()>;
}

/// Payload for creating a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDraft {
    pub name: String,
    pub price: Decimal,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub description: String,
    pub stock: u32,
}

/// Partial update; absent fields are left unchanged by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

/// Listing row as the backend serializes it
#[derive(Debug, Deserialize)]
struct WireListing {
    id: i64,
    name: String,
    price: Decimal,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    images: Vec<String>,
    user_id: Option<String>,
    #[serde(default)]
    description: Option<String>,
    stock: Option<u32>,
}

impl From<WireListing> for Listing {
    fn from(wire: WireListing) -> Self {
        Listing {
            id: wire.id,
            name: wire.name,
            unit_price: wire.price,
            tags: wire.tags,
            image_urls: wire.images,
            owner_id: wire.user_id,
            description: wire.description,
            stock: wire.stock,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePagination {
    page: u32,
    has_next: bool,
}

#[derive(Debug, Deserialize)]
struct WirePage {
    items: Vec<WireListing>,
    pagination: WirePagination,
}

#[derive(Debug, Deserialize)]
struct WireTag {
    name: String,
    count: u64,
}

/// HTTP implementation of the listings gateway. Popular tags change slowly,
/// so they can optionally be served from a short-lived cache.
pub struct HttpListingsClient {
    base_url: String,
    http_client: reqwest::Client,
    tags_cache: Option<moka::future::Cache<&'static str, Arc<Vec<PopularTag>>>>,
}

impl HttpListingsClient {
    pub fn new(base_url: impl Into<String>, cache_tags: bool) -> Self {
        let tags_cache = cache_tags.then(|| {
            moka::future::Cache::builder()
                .max_capacity(1)
                .time_to_live(TAGS_CACHE_TTL)
                .build()
        });

        Self {
            base_url: base_url.into(),
            http_client: reqwest::Client::new(),
            tags_cache,
        }
    }

    async fn fetch_tags(&self) -> AppResult<Vec<PopularTag>> {
        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, TAGS_PATH))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        let tags: Vec<WireTag> = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse tags: {}", e)))?;

        Ok(tags
            .into_iter()
            .map(|t| PopularTag {
                name: t.name,
                count: t.count,
            })
            .collect())
    }
}

#[async_trait]
impl ListingsGateway for HttpListingsClient {
    async fn fetch_page(&self, filter: &Filter, page: u32) -> AppResult<ListingPage> {
        let mut query: Vec<(&str, String)> = vec![("page", page.to_string())];
        if let Some(tag) = filter.tag.as_param() {
            query.push(("tag", tag.to_string()));
        }
        if !filter.search.is_empty() {
            query.push(("search", filter.search.clone()));
        }

        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, LISTINGS_PATH))
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        let page: WirePage = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse listings page: {}", e))
        })?;

        Ok(ListingPage {
            items: page.items.into_iter().map(Listing::from).collect(),
            pagination: PageInfo {
                page: page.pagination.page,
                has_next: page.pagination.has_next,
            },
        })
    }

    async fn popular_tags(&self) -> AppResult<Vec<PopularTag>> {
        let Some(cache) = &self.tags_cache else {
            return self.fetch_tags().await;
        };

        if let Some(tags) = cache.get(TAGS_CACHE_KEY).await {
            return Ok(tags.as_ref().clone());
        }

        let tags = Arc::new(self.fetch_tags().await?);
        cache.insert(TAGS_CACHE_KEY, Arc::clone(&tags)).await;
        Ok(tags.as_ref().clone())
    }
}

#[async_trait]
impl ListingManagementGateway for HttpListingsClient {
    async fn create_listing(&self, token: &str, draft: &ListingDraft) -> AppResult<Listing> {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, LISTINGS_PATH))
            .header("Authorization", format!("Bearer {}", token))
            .json(draft)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        let listing: WireListing = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse listing: {}", e)))?;
        Ok(listing.into())
    }

    async fn my_listings(&self, token: &str) -> AppResult<Vec<Listing>> {
        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, MY_LISTINGS_PATH))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        let listings: Vec<WireListing> = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse listings: {}", e)))?;
        Ok(listings.into_iter().map(Listing::from).collect())
    }

    async fn fetch_listing(&self, token: &str, listing_id: i64) -> AppResult<Listing> {
        let response = self
            .http_client
            .get(format!("{}{}/{}", self.base_url, LISTINGS_PATH, listing_id))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        let listing: WireListing = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse listing: {}", e)))?;
        Ok(listing.into())
    }

    async fn update_listing(
        &self,
        token: &str,
        listing_id: i64,
        update: &ListingUpdate,
    ) -> AppResult<Listing> {
        let response = self
            .http_client
            .put(format!("{}{}/{}", self.base_url, LISTINGS_PATH, listing_id))
            .header("Authorization", format!("Bearer {}", token))
            .json(update)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        let listing: WireListing = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse listing: {}", e)))?;
        Ok(listing.into())
    }

    async fn delete_listing(&self, token: &str, listing_id: i64) -> AppResult<()> {
        let response = self
            .http_client
            .delete(format!("{}{}/{}", self.base_url, LISTINGS_PATH, listing_id))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        Ok(())
    }
}

async fn service_error(response: reqwest::Response) -> AppError {
    let status = response.status();
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };

    match status {
        reqwest::StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        reqwest::StatusCode::BAD_REQUEST => AppError::BadRequest(message),
        reqwest::StatusCode::NOT_FOUND => AppError::NotFound(message),
        _ => AppError::ExternalService(message),
    }
}
