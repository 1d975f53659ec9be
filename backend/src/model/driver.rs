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

//! The `Driver` entity.

use crate::model::EntityId;
use derive_getters::Getters;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use taxi_core::model::{ModelError, ModelResult};
use time::OffsetDateTime;

/// A person who drives cars for the taxi service.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
pub(crate) struct Driver {
    /// Identifier assigned by the database.
    id: EntityId,

    /// Full name of the driver.
    name: String,

    /// Contact phone number.
    phone: String,

    /// Driving license number.
    license_number: String,

    /// Average rating given by clients, from 0.0 to 5.0.
    rating: f64,

    /// When the driver was registered.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,

    /// When the driver was last modified.
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

/// Fields to register a new driver.
#[derive(Constructor, Deserialize)]
#[cfg_attr(test, derive(Clone, Debug, PartialEq, Serialize))]
pub(crate) struct DriverCreate {
    /// Full name of the driver.
    pub(crate) name: String,

    /// Contact phone number.
    pub(crate) phone: String,

    /// Driving license number.
    pub(crate) license_number: String,

    /// Initial rating.
    pub(crate) rating: f64,
}

impl DriverCreate {
    /// Checks that the new driver can be stored.
    ///
    /// Only the lower bound of the rating is enforced.
    pub(crate) fn validate(&self) -> ModelResult<()> {
        if self.rating < 0.0 || self.rating.is_nan() {
            return Err(ModelError(format!("Rating cannot be negative: {}", self.rating)));
        }
        Ok(())
    }
}

/// Replacement values for all mutable fields of a driver.
#[derive(Constructor, Deserialize)]
#[cfg_attr(test, derive(Clone, Debug, PartialEq, Serialize))]
pub(crate) struct DriverUpdate {
    /// Full name of the driver.
    pub(crate) name: String,

    /// Contact phone number.
    pub(crate) phone: String,

    /// Driving license number.
    pub(crate) license_number: String,

    /// New rating.
    pub(crate) rating: f64,
}
