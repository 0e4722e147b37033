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

//! API to check whether the service can reach its database.

use crate::rest::AppState;
use axum::Json;
use axum::extract::State;
use paddock_core::rest::{EmptyBody, RestError, RestResult};
use serde::Serialize;

/// Report of a healthy service.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, serde::Deserialize, PartialEq))]
pub(crate) struct HealthResponse {
    /// Always `ok`.
    status: String,

    /// Outcome of the database probe.
    message: String,
}

/// API handler.
pub(crate) async fn handler(
    State(state): State<AppState>,
    _: EmptyBody,
) -> RestResult<Json<HealthResponse>> {
    match state.checked_repository().await {
        (Some(_), message) => Ok(Json(HealthResponse { status: "ok".to_owned(), message })),
        (None, message) => Err(RestError::InternalError(message)),
    }
}
