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

//! Generic code to interact with a relational database.
//!
//! Services put their persistence logic in a `db` module that issues queries against an
//! `Executor`.  An `Executor` wraps a single connection taken from the pool of a `Db` and holds it
//! until dropped, which makes it suitable as a request-scoped handle: acquire one per request,
//! use it for all the queries of that request, and let it go when the request finishes.

use crate::model::ModelError;
use async_trait::async_trait;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Database errors.  Any unexpected errors that come from the database are classified as
/// `BackendError`, but errors we know about have more specific types.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DbError {
    /// Catch-all error type for unexpected database errors.
    #[error("Database error: {0}")]
    BackendError(String),

    /// Indicates a failure processing the data that already exists in the database.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// Indicates that a requested entry does not exist.
    #[error("Entity not found")]
    NotFound,

    /// Indicates that the database is not available (maybe because the pool was closed, the
    /// server cannot be reached, or there are too many active concurrent connections).
    #[error("Database unavailable: {0}")]
    Unavailable(String),
}

impl From<ModelError> for DbError {
    fn from(e: ModelError) -> Self {
        DbError::DataIntegrityError(e.to_string())
    }
}

/// Result type for this module.
pub type DbResult<T> = Result<T, DbError>;

/// A connection taken from the pool of a `Db`.  The connection goes back to the pool on drop.
///
/// Database-specific code has to match on the variants of this type to issue queries, which
/// keeps the SQL dialect differences next to each other.
pub enum Executor {
    /// A PostgreSQL connection.
    #[cfg(feature = "postgres")]
    Postgres(postgres::PostgresExecutor),

    /// A SQLite connection.
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteExecutor),
}

/// Abstraction over a database connection pool.
#[async_trait]
pub trait Db {
    /// Acquires a connection from the pool for exclusive use by the caller.
    ///
    /// This would be better called `executor` but this method is used so frequently that it makes
    /// call sites too verbose.
    async fn ex(&self) -> DbResult<Executor>;

    /// Acquires a connection from the pool like `ex` but gives up after the first failed attempt.
    ///
    /// Request handlers use this so that an unreachable database is reported right away instead
    /// of after the retries that `ex` may perform.
    async fn try_ex(&self) -> DbResult<Executor>;

    /// Closes the pool.  Any later attempt to acquire a connection fails as `Unavailable`.
    async fn close(&self);
}

#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    pub use paste::paste;

    /// Instantiates the `module::name` test for the database configured by `setup`.
    ///
    /// The `extra` metadata parameter can be used to tag the generated tests.
    #[macro_export]
    macro_rules! generate_one_test [
        ( $name:ident, $setup:expr, $module:path $(, #[$extra:meta] )? ) => {
            #[tokio::test]
            $(#[$extra])?
            async fn $name() {
                $crate::db::testutils::paste! {
                    $module :: [< $name >]($setup).await;
                }
            }
        }
    ];

    pub use generate_one_test;

    /// Instantiates a collection of tests for a specific database system.
    ///
    /// The database implementation to run the tests against is determined by the `setup`
    /// expression.  The returned database should also have been initialized with the desired
    /// schema.
    ///
    /// The `extra` metadata parameter can be used to tag the generated tests.
    #[macro_export]
    macro_rules! generate_tests [
        ( #[$extra:meta], $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module, #[$extra]);
            )+
        };

        ( $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module);
            )+
        };
    ];

    pub use generate_tests;
}

#[cfg(all(test, any(feature = "postgres", feature = "sqlite")))]
mod tests {
    use super::*;
    use sqlx::{Connection, Row};

    /// Runs a `query` on `ex` and does not care about its results.  The `query` must be valid for
    /// all possible database implementations.
    async fn exec(ex: &mut Executor, query: &str) {
        match ex {
            #[cfg(feature = "postgres")]
            Executor::Postgres(ex) => {
                sqlx::query(query).execute(ex.conn()).await.unwrap();
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(ex) => {
                sqlx::query(query).execute(ex.conn()).await.unwrap();
            }
        }
    }

    /// Runs a `query` on `ex` within a transaction that is committed only if `commit` is true.
    async fn exec_in_tx(ex: &mut Executor, query: &str, commit: bool) {
        match ex {
            #[cfg(feature = "postgres")]
            Executor::Postgres(ex) => {
                let mut tx = ex.conn().begin().await.unwrap();
                sqlx::query(query).execute(&mut *tx).await.unwrap();
                if commit {
                    tx.commit().await.unwrap();
                }
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(ex) => {
                let mut tx = ex.conn().begin().await.unwrap();
                sqlx::query(query).execute(&mut *tx).await.unwrap();
                if commit {
                    tx.commit().await.unwrap();
                }
            }
        }
    }

    /// Runs a `query` on `ex` that fetches a single row with an `i64` value on `column` and returns
    /// that value.  The `query` must be valid for all possible database implementations.
    async fn query_i64(ex: &mut Executor, column: &str, query: &str) -> i64 {
        match ex {
            #[cfg(feature = "postgres")]
            Executor::Postgres(ex) => {
                let row = sqlx::query(query).fetch_one(ex.conn()).await.unwrap();
                row.try_get(column).unwrap()
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(ex) => {
                let row = sqlx::query(query).fetch_one(ex.conn()).await.unwrap();
                row.try_get(column).unwrap()
            }
        }
    }

    pub(super) async fn test_direct_execution(db: Box<dyn Db>) {
        let mut ex = db.ex().await.unwrap();
        exec(&mut ex, "CREATE TABLE test (i INTEGER)").await;
        exec(&mut ex, "INSERT INTO test (i) VALUES (3)").await;
        assert_eq!(1, query_i64(&mut ex, "count", "SELECT COUNT(*) AS count FROM test").await);
    }

    pub(super) async fn test_tx_commit(db: Box<dyn Db>) {
        let mut ex = db.ex().await.unwrap();
        exec(&mut ex, "CREATE TABLE test (i INTEGER)").await;
        exec_in_tx(&mut ex, "INSERT INTO test (i) VALUES (3)", true).await;
        assert_eq!(1, query_i64(&mut ex, "count", "SELECT COUNT(*) AS count FROM test").await);
    }

    pub(super) async fn test_tx_rollback_on_drop(db: Box<dyn Db>) {
        let mut ex = db.ex().await.unwrap();
        exec(&mut ex, "CREATE TABLE test (i INTEGER)").await;
        exec_in_tx(&mut ex, "INSERT INTO test (i) VALUES (3)", false).await;
        assert_eq!(0, query_i64(&mut ex, "count", "SELECT COUNT(*) AS count FROM test").await);
    }

    pub(super) async fn test_connection_reuse_after_drop(db: Box<dyn Db>) {
        {
            let mut ex = db.ex().await.unwrap();
            exec(&mut ex, "CREATE TABLE test (i INTEGER)").await;
        }

        let mut ex = db.ex().await.unwrap();
        exec(&mut ex, "INSERT INTO test (i) VALUES (5)").await;
        assert_eq!(5, query_i64(&mut ex, "i", "SELECT i FROM test").await);
    }

    pub(super) async fn test_ex_after_close(db: Box<dyn Db>) {
        db.close().await;
        match db.ex().await {
            Err(DbError::Unavailable(_)) => (),
            Err(e) => panic!("Must have failed with Unavailable but got: {:?}", e),
            Ok(_) => panic!("Must have failed after close"),
        }
    }

    /// Instantiates tests that need write access to the test database.
    #[macro_export]
    macro_rules! generate_db_rw_tests [
        ( $setup:expr $(, #[$extra:meta])? ) => {
            $crate::db::testutils::generate_tests!(
                $( #[$extra], )?
                $setup,
                $crate::db::tests,
                test_direct_execution,
                test_tx_commit,
                test_tx_rollback_on_drop,
                test_connection_reuse_after_drop,
                test_ex_after_close
            );
        }
    ];

    pub(super) use generate_db_rw_tests;
}
