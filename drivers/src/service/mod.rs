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

//! Business logic for the service.

use crate::db::DriverRepository;

mod driver;
mod drivers;
#[cfg(test)]
pub(crate) mod testutils;

/// Business logic.
///
/// A service wraps a repository bound to the connection of a single request.  The public
/// operations consume the service so that each request performs exactly one of them.
pub(crate) struct DriverService {
    /// The repository that the service uses for persistence.
    repo: DriverRepository,
}

impl DriverService {
    /// Creates a new service backed by the given repository.
    pub(crate) fn new(repo: DriverRepository) -> Self {
        Self { repo }
    }
}
