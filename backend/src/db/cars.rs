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

//! Persistence of cars.
//!
//! The database rejects cars whose driver does not exist, and drivers that still own cars cannot
//! be deleted.

use crate::model::{Car, CarCreate, CarUpdate, EntityId};
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(feature = "sqlite")]
use sqlx::sqlite::SqliteRow;
use std::sync::Arc;
use taxi_core::clocks::Clock;
#[cfg(feature = "postgres")]
use taxi_core::db::postgres;
#[cfg(feature = "sqlite")]
use taxi_core::db::sqlite::{self, build_timestamp, unpack_timestamp};
use taxi_core::db::{Db, DbError, DbResult, Executor};
#[cfg(feature = "postgres")]
use time::OffsetDateTime;

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Car {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i32 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let driver_id: i32 = row.try_get("driver_id").map_err(postgres::map_sqlx_error)?;
        let brand: String = row.try_get("brand").map_err(postgres::map_sqlx_error)?;
        let model: String = row.try_get("model").map_err(postgres::map_sqlx_error)?;
        let year: i32 = row.try_get("year").map_err(postgres::map_sqlx_error)?;
        let license_plate: String = row.try_get("license_plate").map_err(postgres::map_sqlx_error)?;
        let color: String = row.try_get("color").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

        Ok(Car::new(
            EntityId::from_i32(id)?,
            EntityId::from_i32(driver_id)?,
            brand,
            model,
            year,
            license_plate,
            color,
            created_at,
            updated_at,
        ))
    }
}

#[cfg(feature = "sqlite")]
impl TryFrom<SqliteRow> for Car {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let driver_id: i64 = row.try_get("driver_id").map_err(sqlite::map_sqlx_error)?;
        let brand: String = row.try_get("brand").map_err(sqlite::map_sqlx_error)?;
        let model: String = row.try_get("model").map_err(sqlite::map_sqlx_error)?;
        let year: i32 = row.try_get("year").map_err(sqlite::map_sqlx_error)?;
        let license_plate: String = row.try_get("license_plate").map_err(sqlite::map_sqlx_error)?;
        let color: String = row.try_get("color").map_err(sqlite::map_sqlx_error)?;
        let created_at_secs: i64 =
            row.try_get("created_at_secs").map_err(sqlite::map_sqlx_error)?;
        let created_at_nsecs: i64 =
            row.try_get("created_at_nsecs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_secs: i64 =
            row.try_get("updated_at_secs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_nsecs: i64 =
            row.try_get("updated_at_nsecs").map_err(sqlite::map_sqlx_error)?;

        Ok(Car::new(
            EntityId::from_i64(id)?,
            EntityId::from_i64(driver_id)?,
            brand,
            model,
            year,
            license_plate,
            color,
            build_timestamp(created_at_secs, created_at_nsecs)?,
            build_timestamp(updated_at_secs, updated_at_nsecs)?,
        ))
    }
}

/// Repository for the `cars` table.
#[derive(Clone)]
pub(crate) struct CarRepository {
    /// Database that holds the table.
    db: Arc<dyn Db + Send + Sync>,

    /// Source of the creation and modification timestamps.
    clock: Arc<dyn Clock + Send + Sync>,
}

impl CarRepository {
    /// Creates a new repository backed by `db` that timestamps writes with `clock`.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { db, clock }
    }

    /// Gets all cars sorted by id.
    pub(crate) async fn list(&self) -> DbResult<Vec<Car>> {
        match self.db.ex().await? {
            #[cfg(feature = "postgres")]
            Executor::Postgres(mut conn) => {
                let query_str = "SELECT * FROM cars ORDER BY id";
                let rows = sqlx::query(query_str)
                    .fetch_all(&mut *conn)
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                rows.into_iter().map(Car::try_from).collect()
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(mut conn) => {
                let query_str = "SELECT * FROM cars ORDER BY id";
                let rows = sqlx::query(query_str)
                    .fetch_all(&mut *conn)
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
                rows.into_iter().map(Car::try_from).collect()
            }

            #[allow(unused)]
            _ => unreachable!(),
        }
    }

    /// Gets the car identified by `id`.
    pub(crate) async fn get(&self, id: EntityId) -> DbResult<Car> {
        match self.db.ex().await? {
            #[cfg(feature = "postgres")]
            Executor::Postgres(mut conn) => {
                let query_str = "SELECT * FROM cars WHERE id = $1";
                let row = sqlx::query(query_str)
                    .bind(id.as_i32())
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                row.ok_or(DbError::NotFound).and_then(Car::try_from)
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(mut conn) => {
                let query_str = "SELECT * FROM cars WHERE id = ?";
                let row = sqlx::query(query_str)
                    .bind(id.as_i32())
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
                row.ok_or(DbError::NotFound).and_then(Car::try_from)
            }

            #[allow(unused)]
            _ => unreachable!(),
        }
    }

    /// Stores a new car and returns it as persisted.
    pub(crate) async fn create(&self, car: CarCreate) -> DbResult<Car> {
        let now = self.clock.now_utc();
        match self.db.ex().await? {
            #[cfg(feature = "postgres")]
            Executor::Postgres(mut conn) => {
                let query_str = "
                    INSERT INTO cars (
                        driver_id, brand, model, year, license_plate, color,
                        created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
                    RETURNING *
                ";
                let row = sqlx::query(query_str)
                    .bind(car.driver_id.as_i32())
                    .bind(&car.brand)
                    .bind(&car.model)
                    .bind(car.year)
                    .bind(&car.license_plate)
                    .bind(&car.color)
                    .bind(now)
                    .fetch_one(&mut *conn)
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                Car::try_from(row)
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(mut conn) => {
                let (now_secs, now_nsecs) = unpack_timestamp(now)?;
                let query_str = "
                    INSERT INTO cars (
                        driver_id, brand, model, year, license_plate, color,
                        created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    RETURNING *
                ";
                let row = sqlx::query(query_str)
                    .bind(car.driver_id.as_i32())
                    .bind(&car.brand)
                    .bind(&car.model)
                    .bind(car.year)
                    .bind(&car.license_plate)
                    .bind(&car.color)
                    .bind(now_secs)
                    .bind(now_nsecs)
                    .bind(now_secs)
                    .bind(now_nsecs)
                    .fetch_one(&mut *conn)
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
                Car::try_from(row)
            }

            #[allow(unused)]
            _ => unreachable!(),
        }
    }

    /// Replaces the mutable fields of the car identified by `id`.
    pub(crate) async fn update(&self, id: EntityId, car: CarUpdate) -> DbResult<Car> {
        let now = self.clock.now_utc();
        match self.db.ex().await? {
            #[cfg(feature = "postgres")]
            Executor::Postgres(mut conn) => {
                let query_str = "
                    UPDATE cars
                    SET driver_id = $1, brand = $2, model = $3, year = $4, license_plate = $5,
                        color = $6, updated_at = $7
                    WHERE id = $8
                    RETURNING *
                ";
                let row = sqlx::query(query_str)
                    .bind(car.driver_id.as_i32())
                    .bind(&car.brand)
                    .bind(&car.model)
                    .bind(car.year)
                    .bind(&car.license_plate)
                    .bind(&car.color)
                    .bind(now)
                    .bind(id.as_i32())
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                row.ok_or(DbError::NotFound).and_then(Car::try_from)
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(mut conn) => {
                let (now_secs, now_nsecs) = unpack_timestamp(now)?;
                let query_str = "
                    UPDATE cars
                    SET driver_id = ?, brand = ?, model = ?, year = ?, license_plate = ?, color = ?,
                        updated_at_secs = ?, updated_at_nsecs = ?
                    WHERE id = ?
                    RETURNING *
                ";
                let row = sqlx::query(query_str)
                    .bind(car.driver_id.as_i32())
                    .bind(&car.brand)
                    .bind(&car.model)
                    .bind(car.year)
                    .bind(&car.license_plate)
                    .bind(&car.color)
                    .bind(now_secs)
                    .bind(now_nsecs)
                    .bind(id.as_i32())
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
                row.ok_or(DbError::NotFound).and_then(Car::try_from)
            }

            #[allow(unused)]
            _ => unreachable!(),
        }
    }

    /// Deletes the car identified by `id`.  Deleting a missing car is not an error.
    pub(crate) async fn delete(&self, id: EntityId) -> DbResult<()> {
        let rows_affected = match self.db.ex().await? {
            #[cfg(feature = "postgres")]
            Executor::Postgres(mut conn) => {
                let query_str = "DELETE FROM cars WHERE id = $1";
                let done = sqlx::query(query_str)
                    .bind(id.as_i32())
                    .execute(&mut *conn)
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                done.rows_affected()
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(mut conn) => {
                let query_str = "DELETE FROM cars WHERE id = ?";
                let done = sqlx::query(query_str)
                    .bind(id.as_i32())
                    .execute(&mut *conn)
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
                done.rows_affected()
            }

            #[allow(unused)]
            _ => unreachable!(),
        };

        if rows_affected > 1 {
            return Err(DbError::BackendError("Deletion affected more than one row".to_owned()));
        }
        Ok(())
    }
}
