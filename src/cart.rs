use serde::{Deserialize, Serialize};

use crate::Result;
use crate::catalog::Product;
use crate::storage::Storage;

pub const CART_STORAGE_KEY: &str = "shopping_cart";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default = "default_selected")]
    pub selected: bool,
}

impl CartItem {
    pub fn product_id(&self) -> &str {
        &self.product.product_id
    }

    pub fn subtotal(&self) -> u64 {
        self.product.price.saturating_mul(u64::from(self.quantity))
    }
}

fn default_quantity() -> u32 {
    1
}

fn default_selected() -> bool {
    true
}

/// Sum of `price * quantity` over every line item.
pub fn cart_total(items: &[CartItem]) -> u64 {
    items
        .iter()
        .fold(0u64, |sum, item| sum.saturating_add(item.subtotal()))
}

pub fn selected_total(items: &[CartItem]) -> u64 {
    items
        .iter()
        .filter(|item| item.selected)
        .fold(0u64, |sum, item| sum.saturating_add(item.subtotal()))
}

/// Persisted cart. Every mutation reads the whole record, applies the change and writes it back,
/// so the store never caches and two stores over the same storage always agree.
#[derive(Debug, Clone)]
pub struct CartStore<S: Storage> {
    storage: S,
}

impl<S: Storage> CartStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Current cart. Missing or unparsable data reads as an empty cart.
    pub fn items(&self) -> Vec<CartItem> {
        let Some(raw) = self.storage.get_item(CART_STORAGE_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<CartItem>>(&raw) {
            Ok(mut items) => {
                for item in &mut items {
                    item.quantity = item.quantity.max(1);
                }
                items
            }
            Err(_) => Vec::new(),
        }
    }

    /// Number of distinct line items; this is what the cart badge shows.
    pub fn count(&self) -> usize {
        self.items().len()
    }

    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<Vec<CartItem>> {
        let quantity = quantity.max(1);
        self.mutate(|items| {
            if let Some(existing) = items
                .iter_mut()
                .find(|item| item.product.product_id == product.product_id)
            {
                existing.quantity = existing.quantity.saturating_add(quantity);
            } else {
                items.push(CartItem {
                    product: product.clone(),
                    quantity,
                    selected: true,
                });
            }
        })
    }

    pub fn remove(&mut self, product_id: &str) -> Result<Vec<CartItem>> {
        self.mutate(|items| items.retain(|item| item.product_id() != product_id))
    }

    /// Sets the quantity of an existing item, clamped to at least 1.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> Result<Vec<CartItem>> {
        let quantity = quantity.clamp(1, i64::from(u32::MAX)) as u32;
        self.mutate(|items| {
            if let Some(item) = items.iter_mut().find(|item| item.product_id() == product_id) {
                item.quantity = quantity;
            }
        })
    }

    pub fn toggle_selection(&mut self, product_id: &str) -> Result<Vec<CartItem>> {
        self.mutate(|items| {
            if let Some(item) = items.iter_mut().find(|item| item.product_id() == product_id) {
                item.selected = !item.selected;
            }
        })
    }

    pub fn toggle_all(&mut self, selected: bool) -> Result<Vec<CartItem>> {
        self.mutate(|items| {
            for item in items.iter_mut() {
                item.selected = selected;
            }
        })
    }

    pub fn remove_selected(&mut self) -> Result<Vec<CartItem>> {
        self.mutate(|items| items.retain(|item| !item.selected))
    }

    pub fn clear(&mut self) -> Result<Vec<CartItem>> {
        self.storage.remove_item(CART_STORAGE_KEY)?;
        Ok(Vec::new())
    }

    fn mutate(&mut self, apply: impl FnOnce(&mut Vec<CartItem>)) -> Result<Vec<CartItem>> {
        let mut items = self.items();
        apply(&mut items);
        let encoded = serde_json::to_string(&items)?;
        self.storage.set_item(CART_STORAGE_KEY, &encoded)?;
        Ok(items)
    }
}
