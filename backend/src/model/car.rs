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

//! The `Car` entity.

use crate::model::EntityId;
use derive_getters::Getters;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use taxi_core::model::{ModelError, ModelResult};
use time::OffsetDateTime;

/// Oldest model year that the service accepts for new cars.
pub(crate) const MIN_CAR_YEAR: i32 = 1950;

/// A vehicle operated by a driver.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
pub(crate) struct Car {
    /// Identifier assigned by the database.
    id: EntityId,

    /// Driver that owns this car.
    driver_id: EntityId,

    /// Manufacturer.
    brand: String,

    /// Model name.
    model: String,

    /// Model year.
    year: i32,

    /// Registration plate.
    license_plate: String,

    /// Body color.
    color: String,

    /// When the car was registered.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,

    /// When the car was last modified.
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

/// Fields to register a new car.
#[derive(Constructor, Deserialize)]
#[cfg_attr(test, derive(Clone, Debug, PartialEq, Serialize))]
pub(crate) struct CarCreate {
    /// Driver that owns the car.  Must exist.
    pub(crate) driver_id: EntityId,

    /// Manufacturer.
    pub(crate) brand: String,

    /// Model name.
    pub(crate) model: String,

    /// Model year.
    pub(crate) year: i32,

    /// Registration plate.
    pub(crate) license_plate: String,

    /// Body color.
    pub(crate) color: String,
}

impl CarCreate {
    /// Checks that the new car can be stored.
    pub(crate) fn validate(&self) -> ModelResult<()> {
        if self.year < MIN_CAR_YEAR {
            return Err(ModelError(format!(
                "Year {} is older than {}",
                self.year, MIN_CAR_YEAR
            )));
        }
        Ok(())
    }
}

/// Replacement values for all mutable fields of a car.
#[derive(Constructor, Deserialize)]
#[cfg_attr(test, derive(Clone, Debug, PartialEq, Serialize))]
pub(crate) struct CarUpdate {
    /// Driver that owns the car.  Must exist.
    pub(crate) driver_id: EntityId,

    /// Manufacturer.
    pub(crate) brand: String,

    /// Model name.
    pub(crate) model: String,

    /// Model year.
    pub(crate) year: i32,

    /// Registration plate.
    pub(crate) license_plate: String,

    /// Body color.
    pub(crate) color: String,
}
