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

//! Operations on drivers.

use crate::db::DriverRepository;
use crate::model::{Driver, DriverCreate, DriverUpdate, EntityId};
use async_trait::async_trait;
use taxi_core::usecase::UseCaseResult;

/// Operations that the REST layer can perform on drivers.
#[async_trait]
pub(crate) trait DriverUseCase {
    /// Gets all drivers.
    async fn list(&self) -> UseCaseResult<Vec<Driver>>;

    /// Gets the driver identified by `id`.
    async fn get(&self, id: EntityId) -> UseCaseResult<Driver>;

    /// Creates a new driver.  The caller is responsible for validating `driver` first.
    async fn create(&self, driver: DriverCreate) -> UseCaseResult<Driver>;

    /// Replaces the contents of the driver identified by `id`.
    async fn update(&self, id: EntityId, driver: DriverUpdate) -> UseCaseResult<Driver>;

    /// Deletes the driver identified by `id`, if it exists.
    async fn delete(&self, id: EntityId) -> UseCaseResult<()>;
}

/// Implementation of `DriverUseCase` backed by the database.
pub(crate) struct DriverService {
    /// Persistence for drivers.
    repo: DriverRepository,
}

impl DriverService {
    /// Creates a new service that stores drivers in `repo`.
    pub(crate) fn new(repo: DriverRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl DriverUseCase for DriverService {
    async fn list(&self) -> UseCaseResult<Vec<Driver>> {
        Ok(self.repo.list().await?)
    }

    async fn get(&self, id: EntityId) -> UseCaseResult<Driver> {
        Ok(self.repo.get(id).await?)
    }

    async fn create(&self, driver: DriverCreate) -> UseCaseResult<Driver> {
        Ok(self.repo.create(driver).await?)
    }

    async fn update(&self, id: EntityId, driver: DriverUpdate) -> UseCaseResult<Driver> {
        Ok(self.repo.update(id, driver).await?)
    }

    async fn delete(&self, id: EntityId) -> UseCaseResult<()> {
        Ok(self.repo.delete(id).await?)
    }
}
