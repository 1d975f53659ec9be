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

//! Test utilities for the business layer.

use crate::db::{CarRepository, ClientRepository, DriverRepository, init_schema};
use crate::model::*;
use crate::usecase::{CarService, ClientService, DriverService};
use std::sync::Arc;
use taxi_core::clocks::testutils::SettableClock;
use taxi_core::db::Db;
use taxi_core::db::sqlite;
use time::macros::datetime;

pub(crate) struct TestContext {
    db: Arc<dyn Db + Send + Sync>,
    clock: Arc<SettableClock>,
}

impl TestContext {
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> = Arc::new(sqlite::testutils::setup().await);
        init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let clock = Arc::from(SettableClock::new(datetime!(2024-01-15 12:00:00 UTC)));
        Self { db, clock }
    }

    pub(crate) fn clock(&self) -> &SettableClock {
        &self.clock
    }

    pub(crate) fn clients(&self) -> ClientService {
        ClientService::new(ClientRepository::new(self.db.clone(), self.clock.clone()))
    }

    pub(crate) fn drivers(&self) -> DriverService {
        DriverService::new(DriverRepository::new(self.db.clone(), self.clock.clone()))
    }

    pub(crate) fn cars(&self) -> CarService {
        CarService::new(CarRepository::new(self.db.clone(), self.clock.clone()))
    }

    /// Registers a driver directly in the database and returns its identifier.
    pub(crate) async fn insert_driver(&self, name: &str) -> EntityId {
        let driver = DriverRepository::new(self.db.clone(), self.clock.clone())
            .create(DriverCreate::new(
                name.to_owned(),
                "555-0000".to_owned(),
                format!("L-{}", name),
                5.0,
            ))
            .await
            .unwrap();
        *driver.id()
    }
}
