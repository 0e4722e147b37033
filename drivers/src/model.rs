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

//! High-level data types.

use derive_getters::Getters;
use derive_more::{Display, From};
use paddock_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Minimum age a driver must have to be registered.
pub(crate) const MIN_AGE: i64 = 18;

/// Identifier of a driver as assigned by the database.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, From, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct DriverId(i64);

impl DriverId {
    /// Returns the identifier as an `i64` for storage purposes.
    pub(crate) fn as_i64(self) -> i64 {
        self.0
    }
}

/// A registered driver.
///
/// A driver that has not been persisted yet lacks an `id`.  Once the database assigns one, it never
/// changes.
#[derive(Clone, Debug, Getters, PartialEq)]
pub(crate) struct Driver {
    /// Identifier of the driver, if already persisted.
    #[getter(copy)]
    id: Option<DriverId>,

    /// Public name of the driver.
    name: String,

    /// Age of the driver, in years.
    #[getter(copy)]
    age: i64,

    /// Alias of the driver that is never exposed publicly.
    secret_name: String,
}

impl Driver {
    /// Creates a new driver that has not been persisted yet.
    pub(crate) fn new<N: Into<String>, S: Into<String>>(name: N, age: i64, secret_name: S) -> Self {
        Self { id: None, name: name.into(), age, secret_name: secret_name.into() }
    }

    /// Attaches the database-assigned `id` to this driver.
    pub(crate) fn with_id(mut self, id: DriverId) -> Self {
        self.id = Some(id);
        self
    }

    /// Applies the fields present in `update` to this driver after checking them.
    ///
    /// Nothing is modified if any of the fields is invalid.  Empty strings are treated as if the
    /// field had not been supplied.
    pub(crate) fn validate(&mut self, update: DriverUpdate) -> ModelResult<()> {
        if let Some(age) = update.age {
            if age < MIN_AGE {
                return Err(ModelError(format!("Age must be at least {}", MIN_AGE)));
            }
        }

        if let Some(name) = update.name.filter(|s| !s.is_empty()) {
            self.name = name;
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(secret_name) = update.secret_name.filter(|s| !s.is_empty()) {
            self.secret_name = secret_name;
        }
        Ok(())
    }
}

/// Set of changes to apply to a driver.  Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub(crate) struct DriverUpdate {
    /// New public name.
    #[serde(default)]
    pub(crate) name: Option<String>,

    /// New age.
    #[serde(default)]
    pub(crate) age: Option<i64>,

    /// New secret alias.
    #[serde(default)]
    pub(crate) secret_name: Option<String>,
}
