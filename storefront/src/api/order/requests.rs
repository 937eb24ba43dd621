use crate::api::client::ApiClient;
use crate::api::common::{resource_path, validate_payload};
use crate::api::order::models::{CreateOrderRequest, Order, UpdateOrderRequest};
use crate::api::transport::ApiRequest;
use crate::errors::ApiResult;

const ORDERS_PATH: &str = "/orders";

impl ApiClient {
    pub async fn create_order(&self, order: &CreateOrderRequest) -> ApiResult<Order> {
        validate_payload(order, "createOrder")?;
        self.call(ApiRequest::post(ORDERS_PATH, "createOrder").payload(order)?)
            .await
    }

    pub async fn get_order(&self, id: i64) -> ApiResult<Order> {
        self.call(ApiRequest::get(resource_path(ORDERS_PATH, id), "getOrder"))
            .await
    }

    /// All orders; the backend restricts this to administrators.
    pub async fn list_orders(&self) -> ApiResult<Vec<Order>> {
        self.call(ApiRequest::get(ORDERS_PATH, "listOrders")).await
    }

    /// Orders placed by the signed-in user.
    pub async fn my_orders(&self) -> ApiResult<Vec<Order>> {
        self.call(ApiRequest::get(resource_path(ORDERS_PATH, "user"), "myOrders"))
            .await
    }

    pub async fn update_order(&self, id: i64, update: &UpdateOrderRequest) -> ApiResult<Order> {
        self.call(ApiRequest::put(resource_path(ORDERS_PATH, id), "updateOrder").payload(update)?)
            .await
    }

    /// Deletes an order, returning the backend's confirmation message.
    pub async fn delete_order(&self, id: i64) -> ApiResult<String> {
        self.call(ApiRequest::delete(resource_path(ORDERS_PATH, id), "deleteOrder"))
            .await
    }
}
