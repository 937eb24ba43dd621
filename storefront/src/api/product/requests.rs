use serde_json::Value;

use crate::api::client::ApiClient;
use crate::api::common::{Page, PageQuery, resource_path, validate_payload};
use crate::api::product::models::{NewProduct, Product};
use crate::api::transport::ApiRequest;
use crate::errors::ApiResult;

const PRODUCTS_PATH: &str = "/products";

impl ApiClient {
    /// Fetches one page of the catalogue.
    pub async fn list_products(&self, query: &PageQuery) -> ApiResult<Page<Product>> {
        validate_payload(query, "listProducts")?;
        self.call(ApiRequest::get(PRODUCTS_PATH, "listProducts").payload(query)?)
            .await
    }

    pub async fn get_product(&self, id: i64) -> ApiResult<Product> {
        self.call(ApiRequest::get(resource_path(PRODUCTS_PATH, id), "getProduct"))
            .await
    }

    pub async fn create_product(&self, product: &NewProduct) -> ApiResult<Product> {
        validate_payload(product, "createProduct")?;
        self.call(ApiRequest::post(PRODUCTS_PATH, "createProduct").payload(product)?)
            .await
    }

    /// Deletes a product. The backend answers with an empty `data`.
    pub async fn delete_product(&self, id: i64) -> ApiResult<Value> {
        self.call_raw(ApiRequest::delete(resource_path(PRODUCTS_PATH, id), "deleteProduct"))
            .await
    }
}
