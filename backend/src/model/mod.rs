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

//! High-level data types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use taxi_core::model::{ModelError, ModelResult};

mod car;
pub(crate) use car::{Car, CarCreate, CarUpdate};
mod client;
pub(crate) use client::{Client, ClientCreate, ClientUpdate};
mod driver;
pub(crate) use driver::{Driver, DriverCreate, DriverUpdate};

/// Identifier of a stored entity, assigned by the database on creation.
///
/// We store this as an `u32` but guarantee that it is usable in an `i32` context because that is
/// the type of the `SERIAL` columns that generate them.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "u32", into = "u32")]
pub(crate) struct EntityId(u32);

impl EntityId {
    /// Creates an identifier from an `i32` as stored in PostgreSQL, with range validation.
    pub(crate) fn from_i32(id: i32) -> ModelResult<Self> {
        match u32::try_from(id) {
            Ok(id) => Ok(EntityId(id)),
            Err(e) => Err(ModelError(format!("Id {} cannot be represented: {}", id, e))),
        }
    }

    /// Creates an identifier from an `i64` as stored in SQLite, with range validation.
    pub(crate) fn from_i64(id: i64) -> ModelResult<Self> {
        match i32::try_from(id) {
            Ok(id) => EntityId::from_i32(id),
            Err(e) => Err(ModelError(format!("Id {} cannot be represented: {}", id, e))),
        }
    }

    /// Returns the identifier as an `i32`.
    pub(crate) fn as_i32(&self) -> i32 {
        i32::try_from(self.0).expect("i32 compatibility validated at construction time")
    }
}

impl TryFrom<u32> for EntityId {
    type Error = ModelError;

    fn try_from(id: u32) -> ModelResult<Self> {
        match i32::try_from(id) {
            Ok(_) => Ok(EntityId(id)),
            Err(e) => Err(ModelError(format!("Id {} cannot be represented: {}", id, e))),
        }
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl FromStr for EntityId {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        let id = s.parse::<u32>().map_err(|e| ModelError(format!("Invalid id '{}': {}", s, e)))?;
        EntityId::try_from(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
