use super::error::FeedError;
use super::model::Listing;
use super::{Filter, ListingPage};
use uuid::Uuid;

/// Feed pagination phase. `Exhausted` means the service confirmed there are
/// no further pages for the current filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    Loading,
    Exhausted,
}

/// A fetch issued by the controller, tagged with the filter snapshot it was
/// issued under. The tag is what lets `complete` discard responses that
/// arrive after a newer filter was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub request_id: Uuid,
    pub filter: Filter,
    pub page: u32,
}

#[derive(Debug, PartialEq)]
pub enum FetchOutcome {
    /// Response applied; `exhausted` when the service reported no further pages
    Applied { appended: usize, exhausted: bool },
    /// Fetch failed; the controller is back in `Idle` with `next_page`
    /// unchanged so the same page can be retried
    Failed(FeedError),
    /// Response belonged to a superseded filter and was discarded
    Stale,
}

/// Pure pagination/filter state machine. It owns no transport: callers take
/// the `PageRequest` it hands out, perform the fetch however they like, and
/// feed the result back through `complete`.
pub struct FeedController {
    filter: Filter,
    next_page: u32,
    phase: FeedPhase,
    items: Vec<Listing>,
}

impl Default for FeedController {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedController {
    pub fn new() -> Self {
        Self {
            filter: Filter::default(),
            next_page: 1,
            phase: FeedPhase::Idle,
            items: Vec::new(),
        }
    }

    /// Applies a new filter. Permitted from any phase, including `Loading`:
    /// the in-flight request keeps its old filter tag and will resolve as
    /// stale. Clears rendered items, resets pagination to page 1 and issues
    /// the page-1 request.
    pub fn apply_filter(&mut self, filter: Filter) -> PageRequest {
        self.filter = filter;
        self.items.clear();
        self.next_page = 1;
        self.phase = FeedPhase::Loading;
        self.request(1)
    }

    /// Advances pagination. Only permitted from `Idle`; returns `None` while
    /// a fetch is in flight or once the feed is exhausted, so scroll and
    /// button triggers can both call this unconditionally.
    pub fn load_next(&mut self) -> Option<PageRequest> {
        if self.phase != FeedPhase::Idle {
            return None;
        }
        self.phase = FeedPhase::Loading;
        Some(self.request(self.next_page))
    }

    /// Feeds a fetch result back into the state machine.
    pub fn complete(
        &mut self,
        request: &PageRequest,
        result: Result<ListingPage, FeedError>,
    ) -> FetchOutcome {
        if request.filter != self.filter {
            tracing::debug!(
                request_id = %request.request_id,
                page = request.page,
                "discarding page response for a superseded filter"
            );
            return FetchOutcome::Stale;
        }

        match result {
            Ok(page) => {
                let appended = page.items.len();
                if request.page == 1 {
                    // the filter reset already cleared the set; page 1 replaces it
                    self.items = page.items;
                } else {
                    self.items.extend(page.items);
                }

                if page.pagination.has_next {
                    self.next_page = page.pagination.page + 1;
                    self.phase = FeedPhase::Idle;
                    FetchOutcome::Applied {
                        appended,
                        exhausted: false,
                    }
                } else {
                    self.phase = FeedPhase::Exhausted;
                    FetchOutcome::Applied {
                        appended,
                        exhausted: true,
                    }
                }
            }
            Err(err) => {
                tracing::warn!(
                    request_id = %request.request_id,
                    page = request.page,
                    error = %err,
                    "listings page fetch failed"
                );
                self.phase = FeedPhase::Idle;
                FetchOutcome::Failed(err)
            }
        }
    }

    pub fn items(&self) -> &[Listing] {
        &self.items
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    fn request(&self, page: u32) -> PageRequest {
        PageRequest {
            request_id: Uuid::new_v4(),
            filter: self.filter.clone(),
            page,
        }
    }
}
