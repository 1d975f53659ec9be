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

//! Test utilities for the REST API.

use crate::db::{CarRepository, ClientRepository, DriverRepository, init_schema};
use crate::model::*;
use crate::rest::app;
use crate::usecase::{CarService, ClientService, DriverService};
use axum::Router;
use std::sync::Arc;
use taxi_core::clocks::testutils::SettableClock;
use taxi_core::db::{Db, sqlite};
use time::macros::datetime;

pub(crate) struct TestContext {
    db: Arc<dyn Db + Send + Sync>,
    clock: Arc<SettableClock>,
    clients: ClientRepository,
    drivers: DriverRepository,
    cars: CarRepository,
    app: Router,
}

impl TestContext {
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> = Arc::new(sqlite::testutils::setup().await);
        init_schema(&mut db.ex().await.unwrap()).await.unwrap();

        let clock = Arc::from(SettableClock::new(datetime!(2024-06-01 09:30:00 UTC)));
        let clients = ClientRepository::new(db.clone(), clock.clone());
        let drivers = DriverRepository::new(db.clone(), clock.clone());
        let cars = CarRepository::new(db.clone(), clock.clone());
        let app = app(
            Arc::new(ClientService::new(clients.clone())),
            Arc::new(DriverService::new(drivers.clone())),
            Arc::new(CarService::new(cars.clone())),
        );
        Self { db, clock, clients, drivers, cars, app }
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Closes the database pool so that every later query fails.
    pub(crate) async fn close_db(&self) {
        self.db.close().await;
    }

    pub(crate) fn clock(&self) -> &SettableClock {
        &self.clock
    }

    pub(crate) fn clients(&self) -> &ClientRepository {
        &self.clients
    }

    pub(crate) fn drivers(&self) -> &DriverRepository {
        &self.drivers
    }

    pub(crate) fn cars(&self) -> &CarRepository {
        &self.cars
    }

    pub(crate) async fn create_client(&self, name: &str) -> Client {
        self.clients
            .create(ClientCreate::new(
                name.to_owned(),
                "+34 600 000 000".to_owned(),
                format!("{}@example.com", name),
            ))
            .await
            .unwrap()
    }

    pub(crate) async fn create_driver(&self, name: &str, rating: f64) -> Driver {
        self.drivers
            .create(DriverCreate::new(
                name.to_owned(),
                "+34 611 000 000".to_owned(),
                format!("DL-{}", name),
                rating,
            ))
            .await
            .unwrap()
    }

    pub(crate) async fn create_car(&self, driver_id: EntityId, plate: &str) -> Car {
        self.cars
            .create(CarCreate::new(
                driver_id,
                "Skoda".to_owned(),
                "Octavia".to_owned(),
                2022,
                plate.to_owned(),
                "silver".to_owned(),
            ))
            .await
            .unwrap()
    }
}
