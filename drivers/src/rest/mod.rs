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

//! Entry point to the REST server.

use crate::db::DriverRepository;
use crate::model::{Driver, DriverId};
use crate::service::DriverService;
use async_trait::async_trait;
use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use log::warn;
use paddock_core::db::Db;
use paddock_core::rest::RestError;
use serde::Serialize;
use std::sync::Arc;

mod driver_delete;
mod driver_get;
mod driver_put;
mod drivers_get;
mod drivers_post;
mod health_get;
#[cfg(test)]
mod testutils;

/// Error message returned when a request references a driver that does not exist.
const DRIVER_NOT_FOUND: &str = "Driver not found";

/// State shared by all requests.
#[derive(Clone)]
pub(crate) struct AppState {
    /// The database that all requests take their connections from.
    db: Arc<dyn Db + Send + Sync>,
}

impl AppState {
    /// Acquires a connection for a single request and probes the database through it.
    ///
    /// The connection is acquired without retries so that an unreachable database is reported
    /// as soon as the pool gives up on it.
    ///
    /// Returns the repository bound to that connection only if the database is healthy, along
    /// with a message that describes the outcome of the probe.
    async fn checked_repository(&self) -> (Option<DriverRepository>, String) {
        let ex = match self.db.try_ex().await {
            Ok(ex) => ex,
            Err(e) => {
                warn!("Cannot acquire database connection: {}", e);
                return (None, format!("Database connection failed: {}", e));
            }
        };

        let mut repo = DriverRepository::new(ex);
        match repo.health_check().await {
            (true, message) => (Some(repo), message),
            (false, message) => (None, message),
        }
    }
}

/// Obtains the business layer for a request, refusing to serve the request at all if the
/// database is not healthy.
#[async_trait]
impl FromRequestParts<AppState> for DriverService {
    type Rejection = RestError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match state.checked_repository().await {
            (Some(repo), _) => Ok(DriverService::new(repo)),
            (None, message) => Err(RestError::InternalError(message)),
        }
    }
}

/// Public representation of a driver.  The secret name is never exposed.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, serde::Deserialize, PartialEq))]
pub(crate) struct DriverResponse {
    /// Identifier of the driver.
    pub(crate) id: DriverId,

    /// Public name of the driver.
    pub(crate) name: String,

    /// Age of the driver.
    pub(crate) age: i64,
}

impl TryFrom<Driver> for DriverResponse {
    type Error = RestError;

    fn try_from(driver: Driver) -> Result<Self, Self::Error> {
        match driver.id() {
            Some(id) => Ok(DriverResponse { id, name: driver.name().clone(), age: driver.age() }),
            None => Err(RestError::InternalError("Driver has not been persisted".to_owned())),
        }
    }
}

/// Creates the router for the application.
pub(crate) fn app(db: Arc<dyn Db + Send + Sync>) -> Router {
    use axum::routing::get;
    Router::new()
        .route("/drivers", get(drivers_get::handler).post(drivers_post::handler))
        .route(
            "/drivers/:id",
            get(driver_get::handler)
                .put(driver_put::handler)
                .patch(driver_put::handler)
                .delete(driver_delete::handler),
        )
        .route("/health", get(health_get::handler))
        .with_state(AppState { db })
}
