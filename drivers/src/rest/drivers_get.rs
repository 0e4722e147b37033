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

//! API to list registered drivers.

use crate::rest::DriverResponse;
use crate::service::DriverService;
use axum::Json;
use axum::extract::Query;
use paddock_core::rest::{EmptyBody, RestError, RestResult};
use serde::Deserialize;

/// Maximum number of drivers returned by a single request.
const MAX_LIMIT: usize = 100;

/// Default value for the `limit` query parameter.
fn default_limit() -> usize {
    MAX_LIMIT
}

/// Window of the list of drivers to return.
#[derive(Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
pub(crate) struct ListQuery {
    /// Number of drivers to skip from the beginning of the list.
    #[serde(default)]
    offset: usize,

    /// Maximum number of drivers to return.
    #[serde(default = "default_limit")]
    limit: usize,
}

/// API handler.
pub(crate) async fn handler(
    service: DriverService,
    Query(query): Query<ListQuery>,
    _: EmptyBody,
) -> RestResult<Json<Vec<DriverResponse>>> {
    if query.limit > MAX_LIMIT {
        return Err(RestError::InvalidRequest(format!("limit cannot exceed {}", MAX_LIMIT)));
    }

    let drivers = service.get_all_drivers().await?;
    let drivers = drivers
        .into_iter()
        .skip(query.offset)
        .take(query.limit)
        .map(DriverResponse::try_from)
        .collect::<RestResult<Vec<DriverResponse>>>()?;
    Ok(Json(drivers))
}
