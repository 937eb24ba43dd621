//! Shopping cart kept in memory for the current session.

use serde::{Deserialize, Serialize};

use crate::api::order::models::{CreateOrderRequest, OrderProduct};
use crate::api::product::models::Product;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn subtotal(&self) -> f64 {
        self.product.price * self.quantity as f64
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds one unit of `product`, merging with an existing line.
    pub fn add(&mut self, product: Product) {
        match self.items.iter_mut().find(|item| item.product.id == product.id) {
            Some(item) => item.quantity += 1,
            None => self.items.push(CartItem {
                product,
                quantity: 1,
            }),
        }
    }

    pub fn remove(&mut self, product_id: i64) {
        self.items.retain(|item| item.product.id != product_id);
    }

    /// Sets the quantity of a line; zero removes it. Unknown products are
    /// ignored.
    pub fn update_quantity(&mut self, product_id: i64, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product_id)
        {
            item.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn total_price(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Order payload for the current contents.
    pub fn to_order_request(&self) -> CreateOrderRequest {
        CreateOrderRequest {
            products: self
                .items
                .iter()
                .map(|item| OrderProduct {
                    product_id: item.product.id,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}
