//! The shopping cart.

use crate::{ads::Ad, storage::Storage};
use serde_derive::{Deserialize, Serialize};

/// The storage key the cart is persisted under.
pub const CART_KEY: &str = "cart";

/// A listing the user intends to buy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    /// The listing's ID, which doubles as the entry's key.
    pub id: i64,
    pub brand: String,
    pub size: String,
    /// The price, kept as text so we never lose precision.
    pub price: String,
    /// Who was selling the listing when it was added.
    pub owner_email: String,
    #[serde(default)]
    pub image_path: Option<String>,
}

impl From<&Ad> for CartEntry {
    fn from(ad: &Ad) -> CartEntry {
        CartEntry {
            id: ad.id,
            brand: ad.brand.clone(),
            size: ad.size.clone(),
            price: ad.price.clone(),
            owner_email: ad.owner_email.clone(),
            image_path: ad.image_path.clone(),
        }
    }
}

/// An ordered list of [`CartEntry`]s with at most one entry per ID.
///
/// Every change is serialized to the [`Storage`] before the mutating method
/// returns, so the persisted copy never lags behind what's in memory.
#[derive(Debug)]
pub struct Cart<S> {
    storage: S,
    items: Vec<CartEntry>,
}

impl<S: Storage> Cart<S> {
    /// Restore the cart persisted in `storage`.
    ///
    /// Missing or unreadable data gives you an empty cart.
    pub fn load(storage: S) -> Self {
        let items = match storage.get(CART_KEY) {
            Some(raw) => parse_items(&raw),
            None => Vec::new(),
        };
        log::debug!("Restored a cart with {} items", items.len());

        Cart { storage, items }
    }

    /// Add `entry` to the end of the cart, returning `false` (and leaving
    /// everything untouched) if an entry with the same ID is already there.
    pub fn add_to_cart(&mut self, entry: CartEntry) -> bool {
        if self.contains(entry.id) {
            log::trace!("Item {} is already in the cart", entry.id);
            return false;
        }

        log::debug!("Adding item {} to the cart", entry.id);
        self.items.push(entry);
        self.persist();
        true
    }

    /// Remove the entry with this `id`, if there is one.
    pub fn remove_from_cart(&mut self, id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);

        if self.items.len() == before {
            return false;
        }

        log::debug!("Removed item {} from the cart", id);
        self.persist();
        true
    }

    pub fn clear_cart(&mut self) {
        log::debug!("Clearing {} items from the cart", self.items.len());
        self.items.clear();
        self.persist();
    }

    pub fn items(&self) -> &[CartEntry] { &self.items }

    pub fn count(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn contains(&self, id: i64) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// The IDs of everything in the cart, in the order they were added.
    pub fn ids(&self) -> Vec<i64> {
        self.items.iter().map(|item| item.id).collect()
    }

    fn persist(&self) {
        match serde_json::to_string(&self.items) {
            Ok(json) => self.storage.set(CART_KEY, &json),
            // serializing plain strings and integers can't really fail
            Err(e) => log::warn!("Unable to serialize the cart: {}", e),
        }
    }
}

fn parse_items(raw: &str) -> Vec<CartEntry> {
    let parsed: Vec<CartEntry> = match serde_json::from_str(raw) {
        Ok(items) => items,
        Err(e) => {
            log::warn!("Discarding the persisted cart: {}", e);
            return Vec::new();
        },
    };

    let mut items: Vec<CartEntry> = Vec::with_capacity(parsed.len());

    for item in parsed {
        if items.iter().any(|existing| existing.id == item.id) {
            log::warn!("Dropping a duplicate cart entry for item {}", item.id);
        } else {
            items.push(item);
        }
    }

    items
}
