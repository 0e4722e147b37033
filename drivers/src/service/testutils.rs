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

//! Test utilities for the business layer.

use crate::db::{DriverRepository, init_schema};
use crate::service::DriverService;
use paddock_core::db::Db;
use paddock_core::db::sqlite::testutils::setup;

pub(crate) struct TestContext {
    db: Box<dyn Db + Send + Sync>,
}

impl TestContext {
    pub(crate) async fn setup() -> Self {
        let db = Box::new(setup().await);
        init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        Self { db }
    }

    /// Returns a repository to inspect or prepare the database behind the service.
    pub(crate) async fn repo(&self) -> DriverRepository {
        DriverRepository::new(self.db.ex().await.unwrap())
    }

    pub(crate) async fn service(&self) -> DriverService {
        DriverService::new(self.repo().await)
    }
}
