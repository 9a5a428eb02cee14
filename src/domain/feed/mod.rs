pub mod controller;
pub mod error;
pub mod model;
pub mod service;

pub use controller::{FeedController, FeedPhase, FetchOutcome, PageRequest};
pub use error::FeedError;
pub use model::Listing;
pub use service::FeedService;

use serde::{Deserialize, Serialize};

/// Tag selection is mutually exclusive: exactly one tag, or the `All` sentinel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagFilter {
    #[default]
    All,
    Tag(String),
}

impl TagFilter {
    /// Query-parameter form; `All` sends no tag parameter
    pub fn as_param(&self) -> Option<&str> {
        match self {
            TagFilter::All => None,
            TagFilter::Tag(tag) => Some(tag),
        }
    }
}

/// The pair that parameterizes every listings fetch. Each page request
/// carries the filter snapshot it was issued under, so late responses for a
/// superseded filter can be told apart and discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub tag: TagFilter,
    pub search: String,
}

impl Filter {
    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: TagFilter::Tag(tag.into()),
            search: String::new(),
        }
    }

    pub fn with_search(search: impl Into<String>) -> Self {
        Self {
            tag: TagFilter::All,
            search: search.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u32,
    pub has_next: bool,
}

/// One page of the listings feed as returned by the listings service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingPage {
    pub items: Vec<Listing>,
    pub pagination: PageInfo,
}

/// Aggregated tag with its usage count, served by the tags endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularTag {
    pub name: String,
    pub count: u64,
}
