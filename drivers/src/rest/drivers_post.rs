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

//! API to register a new driver.

use crate::rest::DriverResponse;
use crate::service::DriverService;
use axum::Json;
use paddock_core::rest::RestResult;
use serde::Deserialize;

/// Message sent to the server to register a driver.
#[derive(Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
pub(crate) struct CreateDriverRequest {
    /// Public name of the driver.
    name: String,

    /// Age of the driver.
    age: i64,

    /// Alias of the driver that is never exposed publicly.
    secret_name: String,
}

/// API handler.
pub(crate) async fn handler(
    service: DriverService,
    Json(request): Json<CreateDriverRequest>,
) -> RestResult<Json<DriverResponse>> {
    let driver = service.create_driver(request.name, request.age, request.secret_name).await?;
    Ok(Json(DriverResponse::try_from(driver)?))
}
