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

//! Operations on clients.

use crate::db::ClientRepository;
use crate::model::{Client, ClientCreate, ClientUpdate, EntityId};
use async_trait::async_trait;
use taxi_core::usecase::UseCaseResult;

/// Operations that the REST layer can perform on clients.
#[async_trait]
pub(crate) trait ClientUseCase {
    /// Gets all clients.
    async fn list(&self) -> UseCaseResult<Vec<Client>>;

    /// Gets the client identified by `id`.
    async fn get(&self, id: EntityId) -> UseCaseResult<Client>;

    /// Creates a new client.  The caller is responsible for validating `client` first.
    async fn create(&self, client: ClientCreate) -> UseCaseResult<Client>;

    /// Replaces the contents of the client identified by `id`.
    async fn update(&self, id: EntityId, client: ClientUpdate) -> UseCaseResult<Client>;

    /// Deletes the client identified by `id`, if it exists.
    async fn delete(&self, id: EntityId) -> UseCaseResult<()>;
}

/// Implementation of `ClientUseCase` backed by the database.
pub(crate) struct ClientService {
    /// Persistence for clients.
    repo: ClientRepository,
}

impl ClientService {
    /// Creates a new service that stores clients in `repo`.
    pub(crate) fn new(repo: ClientRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ClientUseCase for ClientService {
    async fn list(&self) -> UseCaseResult<Vec<Client>> {
        Ok(self.repo.list().await?)
    }

    async fn get(&self, id: EntityId) -> UseCaseResult<Client> {
        Ok(self.repo.get(id).await?)
    }

    async fn create(&self, client: ClientCreate) -> UseCaseResult<Client> {
        Ok(self.repo.create(client).await?)
    }

    async fn update(&self, id: EntityId, client: ClientUpdate) -> UseCaseResult<Client> {
        Ok(self.repo.update(id, client).await?)
    }

    async fn delete(&self, id: EntityId) -> UseCaseResult<()> {
        Ok(self.repo.delete(id).await?)
    }
}
