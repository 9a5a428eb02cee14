use super::controller::{FeedController, FeedPhase, FetchOutcome};
use super::error::FeedError;
use super::model::Listing;
use super::{Filter, PopularTag, TagFilter};
use crate::infrastructure::listings::ListingsGateway;
use crate::util::Debouncer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Async driver around the pagination state machine. The controller lock is
/// released for the duration of each fetch, so a filter change can land while
/// a request is in flight; the stale guard in the controller then drops the
/// old response when it resolves.
pub struct FeedService {
    controller: Arc<Mutex<FeedController>>,
    listings: Arc<dyn ListingsGateway>,
    search_debounce: Mutex<Debouncer>,
}

impl FeedService {
    pub fn new(listings: Arc<dyn ListingsGateway>, search_quiet_window: Duration) -> Self {
        Self {
            controller: Arc::new(Mutex::new(FeedController::new())),
            listings,
            search_debounce: Mutex::new(Debouncer::new(search_quiet_window)),
        }
    }

    /// Applies a new filter and fetches page 1.
    pub async fn apply_filter(&self, filter: Filter) -> FetchOutcome {
        fetch_with_filter(
            Arc::clone(&self.controller),
            Arc::clone(&self.listings),
            filter,
        )
        .await
    }

    /// Advances pagination under the current filter. Returns `None` when the
    /// transition is not permitted (fetch in flight, or feed exhausted).
    /// Scroll-into-view and explicit "load more" both call this.
    pub async fn load_next(&self) -> Option<FetchOutcome> {
        let request = self.controller.lock().await.load_next()?;
        tracing::debug!(
            request_id = %request.request_id,
            page = request.page,
            "fetching listings page"
        );
        let result = self
            .listings
            .fetch_page(&request.filter, request.page)
            .await
            .map_err(FeedError::from);
        Some(self.controller.lock().await.complete(&request, result))
    }

    /// Immediate tag selection (no debounce); keeps the current search text.
    pub async fn select_tag(&self, tag: TagFilter) -> FetchOutcome {
        let filter = {
            let controller = self.controller.lock().await;
            Filter {
                tag,
                search: controller.filter().search.clone(),
            }
        };
        self.apply_filter(filter).await
    }

    /// Debounced search input: a burst of keystrokes inside the quiet window
    /// collapses to a single filter application with the last entered text.
    pub async fn search_changed(&self, text: String) {
        let controller = Arc::clone(&self.controller);
        let listings = Arc::clone(&self.listings);
        self.search_debounce.lock().await.debounce(async move {
            let tag = controller.lock().await.filter().tag.clone();
            let _ = fetch_with_filter(controller, listings, Filter { tag, search: text }).await;
        });
    }

    /// Snapshot of the rendered item set for the current filter
    pub async fn items(&self) -> Vec<Listing> {
        self.controller.lock().await.items().to_vec()
    }

    pub async fn phase(&self) -> FeedPhase {
        self.controller.lock().await.phase()
    }

    pub async fn active_filter(&self) -> Filter {
        self.controller.lock().await.filter().clone()
    }

    pub async fn popular_tags(&self) -> Result<Vec<PopularTag>, FeedError> {
        self.listings.popular_tags().await.map_err(FeedError::from)
    }
}

async fn fetch_with_filter(
    controller: Arc<Mutex<FeedController>>,
    listings: Arc<dyn ListingsGateway>,
    filter: Filter,
) -> FetchOutcome {
    let request = controller.lock().await.apply_filter(filter);
    tracing::debug!(
        request_id = %request.request_id,
        page = request.page,
        "fetching listings page"
    );
    let result = listings
        .fetch_page(&request.filter, request.page)
        .await
        .map_err(FeedError::from);
    controller.lock().await.complete(&request, result)
}
