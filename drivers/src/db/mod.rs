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

//! Database abstraction in terms of the operations needed by the server.

use crate::model::{Driver, DriverId};
use log::{debug, warn};
use paddock_core::db::{DbError, DbResult, Executor, postgres, sqlite};
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Connection, Row};

/// Trivial query used to check that the database is reachable.
const PROBE_QUERY: &str = "SELECT 1";

#[cfg(test)]
mod tests;

/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,
    }
}

impl TryFrom<PgRow> for Driver {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
        let age: i64 = row.try_get("age").map_err(postgres::map_sqlx_error)?;
        let secret_name: String = row.try_get("secret_name").map_err(postgres::map_sqlx_error)?;

        Ok(Driver::new(name, age, secret_name).with_id(DriverId::from(id)))
    }
}

impl TryFrom<SqliteRow> for Driver {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
        let age: i64 = row.try_get("age").map_err(sqlite::map_sqlx_error)?;
        let secret_name: String = row.try_get("secret_name").map_err(sqlite::map_sqlx_error)?;

        Ok(Driver::new(name, age, secret_name).with_id(DriverId::from(id)))
    }
}

/// Persistence operations for drivers, bound to a single connection.
///
/// Every write runs in its own transaction on that connection: a write either becomes durable as
/// a whole or leaves no trace.
pub(crate) struct DriverRepository {
    /// Connection on which all queries are issued.
    ex: Executor,
}

impl DriverRepository {
    /// Creates a repository that issues queries on `ex`.
    pub(crate) fn new(ex: Executor) -> Self {
        Self { ex }
    }

    /// Persists `driver` and returns it with its identifier populated.
    ///
    /// Drivers without an identifier are inserted; the rest update the row with their identifier,
    /// which must exist.
    pub(crate) async fn save(&mut self, driver: Driver) -> DbResult<Driver> {
        match driver.id() {
            None => self.insert(driver).await,
            Some(id) => {
                self.update(id, &driver).await?;
                Ok(driver)
            }
        }
    }

    /// Inserts a new row for `driver`.
    async fn insert(&mut self, driver: Driver) -> DbResult<Driver> {
        let id = match &mut self.ex {
            Executor::Postgres(ex) => {
                let mut tx = ex.conn().begin().await.map_err(postgres::map_sqlx_error)?;
                let query_str =
                    "INSERT INTO drivers (name, age, secret_name) VALUES ($1, $2, $3) RETURNING id";
                let row = sqlx::query(query_str)
                    .bind(driver.name())
                    .bind(driver.age())
                    .bind(driver.secret_name())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
                tx.commit().await.map_err(postgres::map_sqlx_error)?;
                id
            }

            Executor::Sqlite(ex) => {
                let mut tx = ex.conn().begin().await.map_err(sqlite::map_sqlx_error)?;
                let query_str = "INSERT INTO drivers (name, age, secret_name) VALUES (?, ?, ?)";
                let done = sqlx::query(query_str)
                    .bind(driver.name())
                    .bind(driver.age())
                    .bind(driver.secret_name())
                    .execute(&mut *tx)
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
                tx.commit().await.map_err(sqlite::map_sqlx_error)?;
                done.last_insert_rowid()
            }
        };

        debug!("Inserted driver with id {}", id);
        Ok(driver.with_id(DriverId::from(id)))
    }

    /// Overwrites the row with `id` with the contents of `driver`.
    async fn update(&mut self, id: DriverId, driver: &Driver) -> DbResult<()> {
        let rows_affected = match &mut self.ex {
            Executor::Postgres(ex) => {
                let mut tx = ex.conn().begin().await.map_err(postgres::map_sqlx_error)?;
                let query_str =
                    "UPDATE drivers SET name = $1, age = $2, secret_name = $3 WHERE id = $4";
                let done = sqlx::query(query_str)
                    .bind(driver.name())
                    .bind(driver.age())
                    .bind(driver.secret_name())
                    .bind(id.as_i64())
                    .execute(&mut *tx)
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                tx.commit().await.map_err(postgres::map_sqlx_error)?;
                done.rows_affected()
            }

            Executor::Sqlite(ex) => {
                let mut tx = ex.conn().begin().await.map_err(sqlite::map_sqlx_error)?;
                let query_str =
                    "UPDATE drivers SET name = ?, age = ?, secret_name = ? WHERE id = ?";
                let done = sqlx::query(query_str)
                    .bind(driver.name())
                    .bind(driver.age())
                    .bind(driver.secret_name())
                    .bind(id.as_i64())
                    .execute(&mut *tx)
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
                tx.commit().await.map_err(sqlite::map_sqlx_error)?;
                done.rows_affected()
            }
        };

        match rows_affected {
            0 => Err(DbError::NotFound),
            1 => {
                debug!("Updated driver with id {}", id);
                Ok(())
            }
            _ => Err(DbError::BackendError("Update affected more than one row".to_owned())),
        }
    }

    /// Gets all drivers, sorted by identifier.
    pub(crate) async fn get_all(&mut self) -> DbResult<Vec<Driver>> {
        let query_str = "SELECT id, name, age, secret_name FROM drivers ORDER BY id";
        match &mut self.ex {
            Executor::Postgres(ex) => {
                let rows = sqlx::query(query_str)
                    .fetch_all(ex.conn())
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                rows.into_iter().map(Driver::try_from).collect()
            }

            Executor::Sqlite(ex) => {
                let rows = sqlx::query(query_str)
                    .fetch_all(ex.conn())
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
                rows.into_iter().map(Driver::try_from).collect()
            }
        }
    }

    /// Gets the driver identified by `id`, if it exists.
    pub(crate) async fn get_by_id(&mut self, id: DriverId) -> DbResult<Option<Driver>> {
        match &mut self.ex {
            Executor::Postgres(ex) => {
                let query_str = "SELECT id, name, age, secret_name FROM drivers WHERE id = $1";
                let maybe_row = sqlx::query(query_str)
                    .bind(id.as_i64())
                    .fetch_optional(ex.conn())
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                maybe_row.map(Driver::try_from).transpose()
            }

            Executor::Sqlite(ex) => {
                let query_str = "SELECT id, name, age, secret_name FROM drivers WHERE id = ?";
                let maybe_row = sqlx::query(query_str)
                    .bind(id.as_i64())
                    .fetch_optional(ex.conn())
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
                maybe_row.map(Driver::try_from).transpose()
            }
        }
    }

    /// Deletes the driver identified by `id`.  Returns false if it did not exist.
    pub(crate) async fn delete(&mut self, id: DriverId) -> DbResult<bool> {
        let rows_affected = match &mut self.ex {
            Executor::Postgres(ex) => {
                let mut tx = ex.conn().begin().await.map_err(postgres::map_sqlx_error)?;
                let done = sqlx::query("DELETE FROM drivers WHERE id = $1")
                    .bind(id.as_i64())
                    .execute(&mut *tx)
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                tx.commit().await.map_err(postgres::map_sqlx_error)?;
                done.rows_affected()
            }

            Executor::Sqlite(ex) => {
                let mut tx = ex.conn().begin().await.map_err(sqlite::map_sqlx_error)?;
                let done = sqlx::query("DELETE FROM drivers WHERE id = ?")
                    .bind(id.as_i64())
                    .execute(&mut *tx)
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
                tx.commit().await.map_err(sqlite::map_sqlx_error)?;
                done.rows_affected()
            }
        };

        match rows_affected {
            0 => Ok(false),
            1 => {
                debug!("Deleted driver with id {}", id);
                Ok(true)
            }
            _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
        }
    }

    /// Probes the connection with a trivial query.
    ///
    /// The probe runs in a transaction that is rolled back on every path, so the connection is
    /// left clean regardless of the outcome.  Failures are reported in the returned message and
    /// never propagated.
    pub(crate) async fn health_check(&mut self) -> (bool, String) {
        let result = match &mut self.ex {
            Executor::Postgres(ex) => {
                match ex.conn().begin().await.map_err(postgres::map_sqlx_error) {
                    Ok(mut tx) => {
                        let result = sqlx::query(PROBE_QUERY)
                            .execute(&mut *tx)
                            .await
                            .map_err(postgres::map_sqlx_error);
                        let rollback = tx.rollback().await.map_err(postgres::map_sqlx_error);
                        result.and(rollback)
                    }
                    Err(e) => Err(e),
                }
            }

            Executor::Sqlite(ex) => match ex.conn().begin().await.map_err(sqlite::map_sqlx_error) {
                Ok(mut tx) => {
                    let result = sqlx::query(PROBE_QUERY)
                        .execute(&mut *tx)
                        .await
                        .map_err(sqlite::map_sqlx_error);
                    let rollback = tx.rollback().await.map_err(sqlite::map_sqlx_error);
                    result.and(rollback)
                }
                Err(e) => Err(e),
            },
        };

        match result {
            Ok(()) => (true, "Database connection is healthy".to_owned()),
            Err(e) => {
                warn!("Database health check failed: {}", e);
                (false, format!("Database connection failed: {}", e))
            }
        }
    }
}
