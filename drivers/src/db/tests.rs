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

//! Database tests shared by all implementations.

use crate::db::{DriverRepository, init_schema};
use crate::model::{Driver, DriverId};
use paddock_core::db::{Db, DbError, Executor};

/// Initializes the schema in `db` and returns a repository bound to a fresh connection.
async fn setup_repository(db: &dyn Db) -> DriverRepository {
    let mut ex = db.ex().await.unwrap();
    init_schema(&mut ex).await.unwrap();
    DriverRepository::new(ex)
}

pub(crate) async fn test_save_insert_assigns_ids(db: Box<dyn Db + Send + Sync>) {
    let mut repo = setup_repository(db.as_ref()).await;

    let driver1 = repo.save(Driver::new("John Doe", 25, "Speed King")).await.unwrap();
    let driver2 = repo.save(Driver::new("Jane Doe", 30, "Fast Queen")).await.unwrap();

    let id1 = driver1.id().unwrap();
    let id2 = driver2.id().unwrap();
    assert_ne!(id1, id2);
    assert_eq!(Driver::new("John Doe", 25, "Speed King").with_id(id1), driver1);
    assert_eq!(Driver::new("Jane Doe", 30, "Fast Queen").with_id(id2), driver2);
}

pub(crate) async fn test_save_then_get_by_id(db: Box<dyn Db + Send + Sync>) {
    let mut repo = setup_repository(db.as_ref()).await;

    let driver = repo.save(Driver::new("John Doe", 25, "Speed King")).await.unwrap();
    let id = driver.id().unwrap();

    assert_eq!(Some(driver), repo.get_by_id(id).await.unwrap());
}

pub(crate) async fn test_save_update_existing(db: Box<dyn Db + Send + Sync>) {
    let mut repo = setup_repository(db.as_ref()).await;

    let driver = repo.save(Driver::new("John Doe", 25, "Speed King")).await.unwrap();
    let id = driver.id().unwrap();

    let updated = Driver::new("John Doe", 26, "Speed King").with_id(id);
    assert_eq!(updated, repo.save(updated.clone()).await.unwrap());
    assert_eq!(Some(updated), repo.get_by_id(id).await.unwrap());
    assert_eq!(1, repo.get_all().await.unwrap().len());
}

pub(crate) async fn test_save_update_missing(db: Box<dyn Db + Send + Sync>) {
    let mut repo = setup_repository(db.as_ref()).await;

    let ghost = Driver::new("Nobody", 40, "Ghost").with_id(DriverId::from(123));
    assert_eq!(DbError::NotFound, repo.save(ghost).await.unwrap_err());
    assert!(repo.get_all().await.unwrap().is_empty());
}

pub(crate) async fn test_get_by_id_missing(db: Box<dyn Db + Send + Sync>) {
    let mut repo = setup_repository(db.as_ref()).await;

    assert_eq!(None, repo.get_by_id(DriverId::from(1)).await.unwrap());
}

pub(crate) async fn test_get_all_sorted_by_id(db: Box<dyn Db + Send + Sync>) {
    let mut repo = setup_repository(db.as_ref()).await;

    assert!(repo.get_all().await.unwrap().is_empty());

    let mut exp_drivers = vec![];
    for (name, age) in [("Charlie", 40), ("Alice", 20), ("Bob", 30)] {
        exp_drivers.push(repo.save(Driver::new(name, age, "secret")).await.unwrap());
    }

    assert_eq!(exp_drivers, repo.get_all().await.unwrap());
}

pub(crate) async fn test_delete(db: Box<dyn Db + Send + Sync>) {
    let mut repo = setup_repository(db.as_ref()).await;

    let driver1 = repo.save(Driver::new("John Doe", 25, "Speed King")).await.unwrap();
    let driver2 = repo.save(Driver::new("Jane Doe", 30, "Fast Queen")).await.unwrap();
    let id1 = driver1.id().unwrap();

    assert!(repo.delete(id1).await.unwrap());
    assert!(!repo.delete(id1).await.unwrap());
    assert_eq!(None, repo.get_by_id(id1).await.unwrap());
    assert_eq!(vec![driver2], repo.get_all().await.unwrap());
}

pub(crate) async fn test_health_check_ok(db: Box<dyn Db + Send + Sync>) {
    let mut repo = setup_repository(db.as_ref()).await;

    let (healthy, message) = repo.health_check().await;
    assert!(healthy);
    assert_eq!("Database connection is healthy", message);
}

pub(crate) async fn test_health_check_leaves_connection_clean(db: Box<dyn Db + Send + Sync>) {
    let mut repo = setup_repository(db.as_ref()).await;

    assert!(repo.health_check().await.0);
    assert!(repo.health_check().await.0);

    // Writes after the probe must commit on their own, which would not happen if the probe had
    // left a transaction open.
    let driver = repo.save(Driver::new("John Doe", 25, "Speed King")).await.unwrap();
    drop(repo);

    let mut repo = DriverRepository::new(db.ex().await.unwrap());
    assert_eq!(Some(driver.clone()), repo.get_by_id(driver.id().unwrap()).await.unwrap());
}

/// Leaves the connection held by `repo` unable to start new transactions.
async fn break_connection(repo: &mut DriverRepository) {
    match &mut repo.ex {
        Executor::Postgres(ex) => {
            let _can_fail = sqlx::query("SELECT pg_terminate_backend(pg_backend_pid())")
                .execute(ex.conn())
                .await;
        }

        Executor::Sqlite(ex) => {
            sqlx::query("BEGIN").execute(ex.conn()).await.unwrap();
        }
    }
}

pub(crate) async fn test_health_check_broken_connection(db: Box<dyn Db + Send + Sync>) {
    let mut repo = setup_repository(db.as_ref()).await;
    break_connection(&mut repo).await;

    let (healthy, message) = repo.health_check().await;
    assert!(!healthy);
    assert!(message.starts_with("Database connection failed: "), "Bad message: {}", message);

    drop(repo);
    db.close().await;
}

#[macro_export]
macro_rules! generate_db_tests [
    ( $setup:expr $(, #[$extra:meta])? ) => {
        paddock_core::db::testutils::generate_tests!(
            $( #[$extra], )?
            $setup,
            $crate::db::tests,
            test_save_insert_assigns_ids,
            test_save_then_get_by_id,
            test_save_update_existing,
            test_save_update_missing,
            test_get_by_id_missing,
            test_get_all_sorted_by_id,
            test_delete,
            test_health_check_ok,
            test_health_check_leaves_connection_clean,
            test_health_check_broken_connection
        );
    }
];

use generate_db_tests;

mod postgres {
    use super::generate_db_tests;
    use paddock_core::db::postgres::testutils::setup;

    generate_db_tests!(
        Box::new(setup().await),
        #[ignore = "Requires environment configuration and is expensive"]
    );
}

mod sqlite {
    use super::generate_db_tests;
    use paddock_core::db::sqlite::testutils::setup;

    generate_db_tests!(Box::new(setup().await));
}
