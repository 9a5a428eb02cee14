use super::error::CartError;
use super::model::{CartLine, CartSnapshot, CartTotals};
use crate::domain::feed::Listing;
use crate::infrastructure::storage::KeyValueStore;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Receives the full cart state after every mutation. The contract is a full
/// re-render from current state; no incremental diffing is assumed.
pub trait CartObserver: Send + Sync {
    fn cart_changed(&self, lines: &BTreeMap<String, CartLine>, totals: &CartTotals);
}

/// Owns the item-id to cart-line mapping. All operations are synchronous and
/// never touch the network; the snapshot is written to durable storage after
/// every mutation.
pub struct CartStore {
    lines: BTreeMap<String, CartLine>,
    storage: Arc<dyn KeyValueStore>,
    storage_key: String,
    observers: Vec<Box<dyn CartObserver>>,
}

impl CartStore {
    /// Loads the cart from storage. A missing or malformed snapshot yields an
    /// empty cart; this constructor never fails.
    pub fn restore(storage: Arc<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let lines = match storage.get(&storage_key) {
            Ok(Some(raw)) => match serde_json::from_str::<CartSnapshot>(&raw) {
                Ok(snapshot) => snapshot
                    .lines
                    .into_iter()
                    .filter(|(item_id, line)| {
                        let valid = line.quantity >= 1 && line.unit_price >= Decimal::ZERO;
                        if !valid {
                            tracing::warn!(item_id = %item_id, "dropping invalid line from cart snapshot");
                        }
                        valid
                    })
                    .collect(),
                Err(err) => {
                    tracing::warn!(error = %err, "cart snapshot is malformed, starting with an empty cart");
                    BTreeMap::new()
                }
            },
            Ok(None) => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(error = %err, "cart snapshot could not be read, starting with an empty cart");
                BTreeMap::new()
            }
        };

        Self {
            lines,
            storage,
            storage_key,
            observers: Vec::new(),
        }
    }

    /// Subscribes a renderer once; it is notified on every subsequent mutation
    /// regardless of which feed item triggered it.
    pub fn subscribe(&mut self, observer: Box<dyn CartObserver>) {
        self.observers.push(observer);
    }

    /// Adds one unit of an item: increments the quantity when the id is
    /// already present, otherwise inserts a fresh line with quantity 1.
    pub fn add(&mut self, item_id: impl Into<String>, name: impl Into<String>, unit_price: Decimal) {
        self.lines
            .entry(item_id.into())
            .and_modify(|line| line.quantity += 1)
            .or_insert_with(|| CartLine {
                name: name.into(),
                unit_price,
                quantity: 1,
            });
        self.after_mutation();
    }

    /// Adds one unit of a rendered listing (the add-to-cart action on a feed
    /// card); listing ids are stringified at this boundary.
    pub fn add_listing(&mut self, listing: &Listing) {
        self.add(
            listing.cart_item_id(),
            listing.name.clone(),
            listing.unit_price,
        );
    }

    /// Increments the quantity of an existing line; no-op for an absent id.
    pub fn increase(&mut self, item_id: &str) {
        if let Some(line) = self.lines.get_mut(item_id) {
            line.quantity += 1;
            self.after_mutation();
        }
    }

    /// Decrements the quantity of an existing line, deleting the line when it
    /// would reach zero; no-op for an absent id.
    pub fn decrease(&mut self, item_id: &str) {
        let Some(line) = self.lines.get_mut(item_id) else {
            return;
        };
        if line.quantity <= 1 {
            self.lines.remove(item_id);
        } else {
            line.quantity -= 1;
        }
        self.after_mutation();
    }

    /// Deletes a line regardless of quantity; no-op for an absent id.
    pub fn remove(&mut self, item_id: &str) {
        if self.lines.remove(item_id).is_some() {
            self.after_mutation();
        }
    }

    /// Pure aggregate over all lines
    pub fn totals(&self) -> CartTotals {
        let mut total_items: u64 = 0;
        let mut total_price = Decimal::ZERO;
        for line in self.lines.values() {
            total_items += u64::from(line.quantity);
            total_price += line.line_price();
        }
        CartTotals {
            total_items,
            total_price,
        }
    }

    /// Serializes the full mapping to storage, overwriting any prior snapshot
    pub fn persist(&self) -> Result<(), CartError> {
        let snapshot = CartSnapshot {
            lines: self.lines.clone(),
            saved_at: Utc::now(),
        };
        let raw = serde_json::to_string(&snapshot)
            .map_err(|e| CartError::InvalidSnapshot(e.to_string()))?;
        self.storage
            .set(&self.storage_key, &raw)
            .map_err(CartError::from)
    }

    pub fn get(&self, item_id: &str) -> Option<&CartLine> {
        self.lines.get(item_id)
    }

    pub fn lines(&self) -> &BTreeMap<String, CartLine> {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    // The in-memory cart stays authoritative when a write fails; the next
    // successful mutation re-persists the whole mapping anyway.
    fn after_mutation(&self) {
        if let Err(err) = self.persist() {
            tracing::warn!(error = %err, "failed to persist cart snapshot");
        }
        let totals = self.totals();
        for observer in &self.observers {
            observer.cart_changed(&self.lines, &totals);
        }
    }
}
