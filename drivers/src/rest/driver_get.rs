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

//! API to get one driver.

use crate::model::DriverId;
use crate::rest::{DRIVER_NOT_FOUND, DriverResponse};
use crate::service::DriverService;
use axum::Json;
use axum::extract::Path;
use paddock_core::rest::{EmptyBody, RestError, RestResult};

/// API handler.
pub(crate) async fn handler(
    service: DriverService,
    Path(id): Path<DriverId>,
    _: EmptyBody,
) -> RestResult<Json<DriverResponse>> {
    match service.get_driver(id).await? {
        Some(driver) => Ok(Json(DriverResponse::try_from(driver)?)),
        None => Err(RestError::NotFound(DRIVER_NOT_FOUND.to_owned())),
    }
}
