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

//! Operations on one driver.

use crate::model::{Driver, DriverId, DriverUpdate};
use crate::service::DriverService;
use paddock_core::db::DbError;
use paddock_core::service::ServiceResult;

impl DriverService {
    /// Gets the driver identified by `id`, or `None` if it does not exist.
    pub(crate) async fn get_driver(mut self, id: DriverId) -> ServiceResult<Option<Driver>> {
        let driver = self.repo.get_by_id(id).await?;
        Ok(driver)
    }

    /// Applies `update` to the driver identified by `id` and returns the result, or `None` if the
    /// driver does not exist.
    pub(crate) async fn update_driver(
        mut self,
        id: DriverId,
        update: DriverUpdate,
    ) -> ServiceResult<Option<Driver>> {
        let mut driver = match self.repo.get_by_id(id).await? {
            Some(driver) => driver,
            None => return Ok(None),
        };

        driver.validate(update)?;

        match self.repo.save(driver).await {
            Ok(driver) => Ok(Some(driver)),
            // Deleted by a concurrent request after we fetched it.
            Err(DbError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes the driver identified by `id`.  Returns false if it did not exist.
    pub(crate) async fn delete_driver(mut self, id: DriverId) -> ServiceResult<bool> {
        let deleted = self.repo.delete(id).await?;
        Ok(deleted)
    }
}
