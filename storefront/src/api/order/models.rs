use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::api::common::{deserialize_id, deserialize_optional_id};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub items: Option<Vec<OrderItem>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub order_id: Option<i64>,
    #[serde(deserialize_with = "deserialize_id")]
    pub product_id: i64,
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Line of an order being placed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderProduct {
    pub product_id: i64,
    pub quantity: u32,
}

/// Payload for placing an order
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(
        length(min = 1, message = "An order needs at least one product"),
        custom(function = "validate_quantities")
    )]
    pub products: Vec<OrderProduct>,
}

fn validate_quantities(products: &[OrderProduct]) -> Result<(), ValidationError> {
    if products.iter().any(|p| p.quantity == 0) {
        let mut error = ValidationError::new("quantity");
        error.message = Some("Quantities must be at least 1".into());
        return Err(error);
    }
    Ok(())
}

/// Administrative order update; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
}
