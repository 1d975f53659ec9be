// III-IV
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

use crate::db::{CarRepository, ClientRepository, DriverRepository, init_schema};
use crate::model::*;
use futures::future;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use taxi_core::clocks::testutils::SettableClock;
use taxi_core::db::{Db, DbError};
use time::macros::datetime;

/// Repositories for all tables backed by the same database and clock.
struct Repos {
    clock: Arc<SettableClock>,
    clients: ClientRepository,
    drivers: DriverRepository,
    cars: CarRepository,
}

/// Initializes the schema in `db` and creates the repositories under test.
async fn setup_repos(db: Arc<dyn Db + Send + Sync>) -> Repos {
    init_schema(&mut db.ex().await.unwrap()).await.unwrap();

    let clock = Arc::from(SettableClock::new(datetime!(2024-03-10 08:00:00 UTC)));
    Repos {
        clock: clock.clone(),
        clients: ClientRepository::new(db.clone(), clock.clone()),
        drivers: DriverRepository::new(db.clone(), clock.clone()),
        cars: CarRepository::new(db, clock),
    }
}

fn new_driver(name: &str) -> DriverCreate {
    DriverCreate::new(name.to_owned(), "555-0100".to_owned(), format!("LIC-{}", name), 4.5)
}

pub(crate) async fn test_init_schema_is_idempotent(db: Arc<dyn Db + Send + Sync>) {
    let repos = setup_repos(db.clone()).await;
    init_schema(&mut db.ex().await.unwrap()).await.unwrap();
    assert!(repos.clients.list().await.unwrap().is_empty());
}

pub(crate) async fn test_clients_lifecycle(db: Arc<dyn Db + Send + Sync>) {
    let repos = setup_repos(db).await;

    let created = repos
        .clients
        .create(ClientCreate::new(
            "Ana".to_owned(),
            "555-1234".to_owned(),
            "ana@example.com".to_owned(),
        ))
        .await
        .unwrap();
    assert_eq!("Ana", created.name());
    assert_eq!("555-1234", created.phone());
    assert_eq!("ana@example.com", created.email());
    assert_eq!(datetime!(2024-03-10 08:00:00 UTC), *created.created_at());
    assert_eq!(created.created_at(), created.updated_at());
    assert_eq!(created, repos.clients.get(*created.id()).await.unwrap());

    repos.clock.advance(Duration::from_secs(60));
    let updated = repos
        .clients
        .update(
            *created.id(),
            ClientUpdate::new(
                "Ana Maria".to_owned(),
                "555-4321".to_owned(),
                "ana.maria@example.com".to_owned(),
            ),
        )
        .await
        .unwrap();
    assert_eq!(created.id(), updated.id());
    assert_eq!("Ana Maria", updated.name());
    assert_eq!("555-4321", updated.phone());
    assert_eq!("ana.maria@example.com", updated.email());
    assert_eq!(created.created_at(), updated.created_at());
    assert_eq!(datetime!(2024-03-10 08:01:00 UTC), *updated.updated_at());
    assert_eq!(updated, repos.clients.get(*created.id()).await.unwrap());

    repos.clients.delete(*created.id()).await.unwrap();
    assert_eq!(DbError::NotFound, repos.clients.get(*created.id()).await.unwrap_err());
}

pub(crate) async fn test_clients_list_is_sorted_by_id(db: Arc<dyn Db + Send + Sync>) {
    let repos = setup_repos(db).await;

    assert!(repos.clients.list().await.unwrap().is_empty());

    let mut ids = vec![];
    for name in ["Zoe", "Bob", "Mia"] {
        let client = repos
            .clients
            .create(ClientCreate::new(
                name.to_owned(),
                "555".to_owned(),
                format!("{}@example.com", name),
            ))
            .await
            .unwrap();
        ids.push(*client.id());
    }

    let clients = repos.clients.list().await.unwrap();
    assert_eq!(ids, clients.iter().map(|c| *c.id()).collect::<Vec<EntityId>>());
    assert_eq!(
        vec!["Zoe", "Bob", "Mia"],
        clients.iter().map(|c| c.name().as_str()).collect::<Vec<&str>>()
    );
}

pub(crate) async fn test_missing_entities(db: Arc<dyn Db + Send + Sync>) {
    let repos = setup_repos(db).await;
    let id = EntityId::try_from(999999u32).unwrap();

    assert_eq!(DbError::NotFound, repos.clients.get(id).await.unwrap_err());
    assert_eq!(DbError::NotFound, repos.drivers.get(id).await.unwrap_err());
    assert_eq!(DbError::NotFound, repos.cars.get(id).await.unwrap_err());

    assert_eq!(
        DbError::NotFound,
        repos
            .clients
            .update(id, ClientUpdate::new("a".to_owned(), "b".to_owned(), "c".to_owned()))
            .await
            .unwrap_err()
    );
    assert_eq!(
        DbError::NotFound,
        repos
            .drivers
            .update(
                id,
                DriverUpdate::new("a".to_owned(), "b".to_owned(), "c".to_owned(), 1.0)
            )
            .await
            .unwrap_err()
    );

    repos.clients.delete(id).await.unwrap();
    repos.drivers.delete(id).await.unwrap();
    repos.cars.delete(id).await.unwrap();
}

pub(crate) async fn test_drivers_lifecycle(db: Arc<dyn Db + Send + Sync>) {
    let repos = setup_repos(db).await;

    let created = repos.drivers.create(new_driver("Carlos")).await.unwrap();
    assert_eq!("Carlos", created.name());
    assert_eq!("LIC-Carlos", created.license_number());
    assert_eq!(4.5, *created.rating());
    assert_eq!(created, repos.drivers.get(*created.id()).await.unwrap());

    repos.clock.advance(Duration::from_secs(1));
    let updated = repos
        .drivers
        .update(
            *created.id(),
            DriverUpdate::new(
                "Carlos".to_owned(),
                "555-0101".to_owned(),
                "LIC-2".to_owned(),
                3.25,
            ),
        )
        .await
        .unwrap();
    assert_eq!("555-0101", updated.phone());
    assert_eq!("LIC-2", updated.license_number());
    assert_eq!(3.25, *updated.rating());
    assert_eq!(created.created_at(), updated.created_at());
    assert!(updated.updated_at() > created.updated_at());

    assert_eq!(vec![updated], repos.drivers.list().await.unwrap());

    repos.drivers.delete(*created.id()).await.unwrap();
    repos.drivers.delete(*created.id()).await.unwrap();
    assert!(repos.drivers.list().await.unwrap().is_empty());
}

pub(crate) async fn test_cars_lifecycle(db: Arc<dyn Db + Send + Sync>) {
    let repos = setup_repos(db).await;

    let driver1 = repos.drivers.create(new_driver("first")).await.unwrap();
    let driver2 = repos.drivers.create(new_driver("second")).await.unwrap();

    let created = repos
        .cars
        .create(CarCreate::new(
            *driver1.id(),
            "Toyota".to_owned(),
            "Corolla".to_owned(),
            2020,
            "ABC-123".to_owned(),
            "white".to_owned(),
        ))
        .await
        .unwrap();
    assert_eq!(driver1.id(), created.driver_id());
    assert_eq!(2020, *created.year());
    assert_eq!(created, repos.cars.get(*created.id()).await.unwrap());

    repos.clock.advance(Duration::from_secs(5));
    let updated = repos
        .cars
        .update(
            *created.id(),
            CarUpdate::new(
                *driver2.id(),
                "Toyota".to_owned(),
                "Corolla".to_owned(),
                2021,
                "XYZ-987".to_owned(),
                "black".to_owned(),
            ),
        )
        .await
        .unwrap();
    assert_eq!(driver2.id(), updated.driver_id());
    assert_eq!(2021, *updated.year());
    assert_eq!("XYZ-987", updated.license_plate());
    assert_eq!("black", updated.color());
    assert_eq!(created.created_at(), updated.created_at());
    assert_eq!(datetime!(2024-03-10 08:00:05 UTC), *updated.updated_at());

    repos.cars.delete(*created.id()).await.unwrap();
    assert_eq!(DbError::NotFound, repos.cars.get(*created.id()).await.unwrap_err());
}

pub(crate) async fn test_cars_require_existing_driver(db: Arc<dyn Db + Send + Sync>) {
    let repos = setup_repos(db).await;

    let err = repos
        .cars
        .create(CarCreate::new(
            EntityId::try_from(999999u32).unwrap(),
            "Ford".to_owned(),
            "Focus".to_owned(),
            2015,
            "NOPE".to_owned(),
            "red".to_owned(),
        ))
        .await
        .unwrap_err();
    match err {
        DbError::BackendError(_) => (),
        e => panic!("Unexpected error {:?}", e),
    }
    assert!(repos.cars.list().await.unwrap().is_empty());
}

pub(crate) async fn test_drivers_with_cars_cannot_be_deleted(db: Arc<dyn Db + Send + Sync>) {
    let repos = setup_repos(db).await;

    let driver = repos.drivers.create(new_driver("busy")).await.unwrap();
    repos
        .cars
        .create(CarCreate::new(
            *driver.id(),
            "Seat".to_owned(),
            "Leon".to_owned(),
            2019,
            "SEAT-1".to_owned(),
            "blue".to_owned(),
        ))
        .await
        .unwrap();

    match repos.drivers.delete(*driver.id()).await.unwrap_err() {
        DbError::BackendError(_) => (),
        e => panic!("Unexpected error {:?}", e),
    }
    assert_eq!(driver, repos.drivers.get(*driver.id()).await.unwrap());
}

pub(crate) async fn test_concurrent_creates_get_distinct_ids(db: Arc<dyn Db + Send + Sync>) {
    let repos = setup_repos(db).await;

    let creates = (0..10).map(|i| repos.drivers.create(new_driver(&format!("driver{}", i))));
    let drivers = future::join_all(creates).await;

    let mut ids = HashSet::new();
    for driver in drivers {
        assert!(ids.insert(*driver.unwrap().id()));
    }
    assert_eq!(10, ids.len());
    assert_eq!(10, repos.drivers.list().await.unwrap().len());
}

macro_rules! generate_db_tests [
    ( $setup:expr $(, #[$extra:meta])? ) => {
        taxi_core::db::testutils::generate_tests!(
            $( #[$extra], )?
            $setup,
            $crate::db::tests,
            test_init_schema_is_idempotent,
            test_clients_lifecycle,
            test_clients_list_is_sorted_by_id,
            test_missing_entities,
            test_drivers_lifecycle,
            test_cars_lifecycle,
            test_cars_require_existing_driver,
            test_drivers_with_cars_cannot_be_deleted,
            test_concurrent_creates_get_distinct_ids
        );
    }
];

#[cfg(feature = "postgres")]
mod postgres {
    use super::*;
    use taxi_core::db::postgres::testutils::setup;

    generate_db_tests!(
        Arc::new(setup().await),
        #[ignore = "Requires environment configuration and is expensive"]
    );
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use taxi_core::db::sqlite::testutils::setup;

    generate_db_tests!(Arc::new(setup().await));
}
