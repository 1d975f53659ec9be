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

//! Operations on cars.
//!
//! Cars reference their driver, so creating or updating a car that points to a missing driver
//! fails in the database and surfaces as a backend error.

use crate::db::CarRepository;
use crate::model::{Car, CarCreate, CarUpdate, EntityId};
use async_trait::async_trait;
use taxi_core::usecase::UseCaseResult;

/// Operations that the REST layer can perform on cars.
#[async_trait]
pub(crate) trait CarUseCase {
    /// Gets all cars.
    async fn list(&self) -> UseCaseResult<Vec<Car>>;

    /// Gets the car identified by `id`.
    async fn get(&self, id: EntityId) -> UseCaseResult<Car>;

    /// Creates a new car.  The caller is responsible for validating `car` first.
    async fn create(&self, car: CarCreate) -> UseCaseResult<Car>;

    /// Replaces the contents of the car identified by `id`.
    async fn update(&self, id: EntityId, car: CarUpdate) -> UseCaseResult<Car>;

    /// Deletes the car identified by `id`, if it exists.
    async fn delete(&self, id: EntityId) -> UseCaseResult<()>;
}

/// Implementation of `CarUseCase` backed by the database.
pub(crate) struct CarService {
    /// Persistence for cars.
    repo: CarRepository,
}

impl CarService {
    /// Creates a new service that stores cars in `repo`.
    pub(crate) fn new(repo: CarRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl CarUseCase for CarService {
    async fn list(&self) -> UseCaseResult<Vec<Car>> {
        Ok(self.repo.list().await?)
    }

    async fn get(&self, id: EntityId) -> UseCaseResult<Car> {
        Ok(self.repo.get(id).await?)
    }

    async fn create(&self, car: CarCreate) -> UseCaseResult<Car> {
        Ok(self.repo.create(car).await?)
    }

    async fn update(&self, id: EntityId, car: CarUpdate) -> UseCaseResult<Car> {
        Ok(self.repo.update(id, car).await?)
    }

    async fn delete(&self, id: EntityId) -> UseCaseResult<()> {
        Ok(self.repo.delete(id).await?)
    }
}
