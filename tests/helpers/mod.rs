#![allow(dead_code)]

use async_trait::async_trait;
use bazaar_client::domain::feed::{Filter, Listing, ListingPage, PageInfo, PopularTag};
use bazaar_client::error::{AppError, AppResult};
use bazaar_client::infrastructure::listings::ListingsGateway;
use bazaar_client::infrastructure::storage::KeyValueStore;
use axum::Router;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::net::TcpListener;
use tokio::sync::Notify;

/// Binds a stub backend on an ephemeral port and serves it in the background;
/// returns the base URL clients should point at.
pub async fn spawn_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind stub server");
    let addr = listener.local_addr().expect("stub server has no address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("stub server failed");
    });
    format!("http://{}", addr)
}

pub fn listing(id: i64, name: &str, price: &str) -> Listing {
    Listing {
        id,
        name: name.to_string(),
        unit_price: price.parse().expect("invalid test price"),
        tags: Vec::new(),
        image_urls: Vec::new(),
        owner_id: None,
        description: None,
        stock: Some(1),
    }
}

pub fn page(items: Vec<Listing>, page_number: u32, has_next: bool) -> ListingPage {
    ListingPage {
        items,
        pagination: PageInfo {
            page: page_number,
            has_next,
        },
    }
}

/// Gateway fed with a script of responses, popped in fetch order. Records
/// every call so tests can assert which filter/page combinations were issued.
pub struct ScriptedListings {
    responses: Mutex<VecDeque<AppResult<ListingPage>>>,
    calls: Mutex<Vec<(Filter, u32)>>,
}

impl ScriptedListings {
    pub fn new(responses: Vec<AppResult<ListingPage>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, response: AppResult<ListingPage>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<(Filter, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListingsGateway for ScriptedListings {
    async fn fetch_page(&self, filter: &Filter, page: u32) -> AppResult<ListingPage> {
        self.calls.lock().unwrap().push((filter.clone(), page));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::ExternalService("script exhausted".to_string())))
    }

    async fn popular_tags(&self) -> AppResult<Vec<PopularTag>> {
        Ok(Vec::new())
    }
}

/// Gateway that holds responses for one search text until released, so tests
/// can interleave a newer filter with an in-flight fetch.
pub struct GatedListings {
    slow_search: String,
    pub release: Notify,
}

impl GatedListings {
    pub fn new(slow_search: &str) -> Self {
        Self {
            slow_search: slow_search.to_string(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl ListingsGateway for GatedListings {
    async fn fetch_page(&self, filter: &Filter, page_number: u32) -> AppResult<ListingPage> {
        if filter.search == self.slow_search {
            self.release.notified().await;
        }
        let name = format!("result-{}", filter.search);
        Ok(page(vec![listing(page_number as i64, &name, "1.00")], page_number, true))
    }

    async fn popular_tags(&self) -> AppResult<Vec<PopularTag>> {
        Ok(Vec::new())
    }
}

/// Store whose writes always fail; reads behave as if nothing was ever stored
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> AppResult<()> {
        Err(AppError::Storage("disk full".to_string()))
    }
}
