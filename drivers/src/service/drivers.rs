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

//! Operations on the collection of drivers.

use crate::model::{Driver, DriverUpdate};
use crate::service::DriverService;
use paddock_core::service::ServiceResult;

impl DriverService {
    /// Registers a new driver and returns it with its assigned identifier.
    ///
    /// The driver is only persisted if it passes validation.
    pub(crate) async fn create_driver(
        mut self,
        name: String,
        age: i64,
        secret_name: String,
    ) -> ServiceResult<Driver> {
        let mut driver = Driver::new(name.clone(), age, secret_name.clone());
        driver.validate(DriverUpdate {
            name: Some(name),
            age: Some(age),
            secret_name: Some(secret_name),
        })?;
        let driver = self.repo.save(driver).await?;
        Ok(driver)
    }

    /// Gets all registered drivers.
    pub(crate) async fn get_all_drivers(mut self) -> ServiceResult<Vec<Driver>> {
        let drivers = self.repo.get_all().await?;
        Ok(drivers)
    }
}
