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

//! The `Client` entity.

use crate::model::EntityId;
use derive_getters::Getters;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use taxi_core::model::ModelResult;
use time::OffsetDateTime;

/// A customer of the taxi service.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
pub(crate) struct Client {
    /// Identifier assigned by the database.
    id: EntityId,

    /// Full name of the client.
    name: String,

    /// Contact phone number.
    phone: String,

    /// Contact email address.  Not validated.
    email: String,

    /// When the client was registered.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,

    /// When the client was last modified.
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

/// Fields to register a new client.
#[derive(Constructor, Deserialize)]
#[cfg_attr(test, derive(Clone, Debug, PartialEq, Serialize))]
pub(crate) struct ClientCreate {
    /// Full name of the client.
    pub(crate) name: String,

    /// Contact phone number.
    pub(crate) phone: String,

    /// Contact email address.
    pub(crate) email: String,
}

impl ClientCreate {
    /// Checks that the new client can be stored.  Any client is acceptable.
    pub(crate) fn validate(&self) -> ModelResult<()> {
        Ok(())
    }
}

/// Replacement values for all mutable fields of a client.
#[derive(Constructor, Deserialize)]
#[cfg_attr(test, derive(Clone, Debug, PartialEq, Serialize))]
pub(crate) struct ClientUpdate {
    /// Full name of the client.
    pub(crate) name: String,

    /// Contact phone number.
    pub(crate) phone: String,

    /// Contact email address.
    pub(crate) email: String,
}
