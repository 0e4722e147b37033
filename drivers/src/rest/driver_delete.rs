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

//! API to delete a driver.

use crate::model::DriverId;
use crate::rest::DRIVER_NOT_FOUND;
use crate::service::DriverService;
use axum::Json;
use axum::extract::Path;
use paddock_core::rest::{EmptyBody, RestError, RestResult};
use serde::Serialize;

/// Message returned after a successful deletion.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, serde::Deserialize, PartialEq))]
pub(crate) struct DeleteResponse {
    /// Human-readable confirmation.
    message: String,
}

/// API handler.
pub(crate) async fn handler(
    service: DriverService,
    Path(id): Path<DriverId>,
    _: EmptyBody,
) -> RestResult<Json<DeleteResponse>> {
    if service.delete_driver(id).await? {
        Ok(Json(DeleteResponse { message: "Driver deleted successfully".to_owned() }))
    } else {
        Err(RestError::NotFound(DRIVER_NOT_FOUND.to_owned()))
    }
}
