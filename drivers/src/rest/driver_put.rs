// Paddock
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! API to modify some fields of a driver.  Serves both `PUT` and `PATCH`.

use crate::model::{DriverId, DriverUpdate};
use crate::rest::{DRIVER_NOT_FOUND, DriverResponse};
use crate::service::DriverService;
use axum::Json;
use axum::extract::Path;
use paddock_core::rest::{RestError, RestResult};

/// API handler.
pub(crate) async fn handler(
    service: DriverService,
    Path(id): Path<DriverId>,
    Json(update): Json<DriverUpdate>,
) -> RestResult<Json<DriverResponse>> {
    match service.update_driver(id, update).await? {
        Some(driver) => Ok(Json(DriverResponse::try_from(driver)?)),
        None => Err(RestError::NotFound(DRIVER_NOT_FOUND.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Driver;
    use crate::rest::testutils::*;
    use axum::http;
    use paddock_core::rest::testutils::*;
    use serde_json::json;

    fn route(id: DriverId) -> (http::Method, String) {
        (http::Method::PUT, format!("/drivers/{}", id))
    }

    fn patch_route(id: DriverId) -> (http::Method, String) {
        (http::Method::PATCH, format!("/drivers/{}", id))
    }

    #[tokio::test]
    async fn test_only_age() {
        let context = TestContext::setup().await;

        let id = context.create_driver("John Doe", 25, "Speed King").await;

        let response = OneShotBuilder::new(context.app(), route(id))
            .send_json(json!({"age": 26}))
            .await
            .expect_json::<DriverResponse>()
            .await;
        assert_eq!(DriverResponse { id, name: "John Doe".to_owned(), age: 26 }, response);

        let exp_driver = Driver::new("John Doe", 26, "Speed King").with_id(id);
        assert_eq!(Some(exp_driver), context.get_driver(id).await);
    }

    #[tokio::test]
    async fn test_all_fields_with_patch() {
        let context = TestContext::setup().await;

        let id = context.create_driver("John Doe", 25, "Speed King").await;

        let response = OneShotBuilder::new(context.app(), patch_route(id))
            .send_json(json!({"name": "Jane Doe", "age": 31, "secret_name": "Fast Queen"}))
            .await
            .expect_json::<DriverResponse>()
            .await;
        assert_eq!(DriverResponse { id, name: "Jane Doe".to_owned(), age: 31 }, response);

        let exp_driver = Driver::new("Jane Doe", 31, "Fast Queen").with_id(id);
        assert_eq!(Some(exp_driver), context.get_driver(id).await);
    }

    #[tokio::test]
    async fn test_empty_update() {
        let context = TestContext::setup().await;

        let id = context.create_driver("John Doe", 25, "Speed King").await;

        let response = OneShotBuilder::new(context.app(), route(id))
            .send_json(json!({}))
            .await
            .expect_json::<DriverResponse>()
            .await;
        assert_eq!(DriverResponse { id, name: "John Doe".to_owned(), age: 25 }, response);
    }

    #[tokio::test]
    async fn test_too_young() {
        let context = TestContext::setup().await;

        let id = context.create_driver("John Doe", 25, "Speed King").await;

        OneShotBuilder::new(context.app(), route(id))
            .send_json(json!({"name": "Other", "age": 17}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Age must be at least 18")
            .await;

        let exp_driver = Driver::new("John Doe", 25, "Speed King").with_id(id);
        assert_eq!(Some(exp_driver), context.get_driver(id).await);
    }

    #[tokio::test]
    async fn test_missing() {
        let context = TestContext::setup().await;

        for body in [json!({}), json!({"age": 30}), json!({"age": 10}), json!({"name": "X"})] {
            OneShotBuilder::new(context.app(), route(DriverId::from(1)))
                .send_json(body)
                .await
                .expect_status(http::StatusCode::NOT_FOUND)
                .expect_error("Driver not found")
                .await;
        }

        assert!(context.get_all_drivers().await.is_empty());
    }

    #[tokio::test]
    async fn test_db_unavailable() {
        let context = TestContext::setup().await;
        let id = context.create_driver("John Doe", 25, "Speed King").await;
        context.close_db().await;

        OneShotBuilder::new(context.into_app(), patch_route(id))
            .send_json(json!({"age": 30}))
            .await
            .expect_status(http::StatusCode::INTERNAL_SERVER_ERROR)
            .expect_error("Database connection failed")
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route(DriverId::from(1)));
}
