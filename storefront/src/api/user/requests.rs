use serde_json::Value;

use crate::api::client::ApiClient;
use crate::api::common::{resource_path, validate_payload};
use crate::api::transport::ApiRequest;
use crate::api::user::models::{NewUser, UpdateUser, User};
use crate::errors::ApiResult;

const USERS_PATH: &str = "/users";

impl ApiClient {
    pub async fn get_all_users(&self) -> ApiResult<Vec<User>> {
        self.call(ApiRequest::get(USERS_PATH, "getAllUsers")).await
    }

    pub async fn get_user_by_id(&self, id: i64) -> ApiResult<User> {
        self.call(ApiRequest::get(resource_path(USERS_PATH, id), "getUserById"))
            .await
    }

    /// Creates a user. The response shape is not enforced.
    pub async fn create_user(&self, user: &NewUser) -> ApiResult<Value> {
        validate_payload(user, "createUser")?;
        self.call_raw(ApiRequest::post(USERS_PATH, "createUser").payload(user)?)
            .await
    }

    /// Updates a user. The response shape is not enforced.
    pub async fn update_user(&self, id: i64, update: &UpdateUser) -> ApiResult<Value> {
        self.call_raw(ApiRequest::put(resource_path(USERS_PATH, id), "updateUser").payload(update)?)
            .await
    }

    /// Deletes a user. The response shape is not enforced.
    pub async fn delete_user(&self, id: i64) -> ApiResult<Value> {
        self.call_raw(ApiRequest::delete(resource_path(USERS_PATH, id), "deleteUser"))
            .await
    }
}
