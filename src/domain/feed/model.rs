use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A marketplace listing. Owned and stored by the listings service; the
/// client only reads and renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub owner_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub stock: Option<u32>,
}

impl Listing {
    /// Cart item ids are strings; listing ids are stringified at the boundary
    pub fn cart_item_id(&self) -> String {
        self.id.to_string()
    }
}
