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

//! Persistence of drivers.

use crate::model::{Driver, DriverCreate, DriverUpdate, EntityId};
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
impl TryFrom<PgRow> for Driver {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i32 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
        let phone: String = row.try_get("phone").map_err(postgres::map_sqlx_error)?;
        let license_number: String =
            row.try_get("license_number").map_err(postgres::map_sqlx_error)?;
        let rating: f64 = row.try_get("rating").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

        Ok(Driver::new(
            EntityId::from_i32(id)?,
            name,
            phone,
            license_number,
            rating,
            created_at,
            updated_at,
        ))
    }
}

#[cfg(feature = "sqlite")]
impl TryFrom<SqliteRow> for Driver {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
        let phone: String = row.try_get("phone").map_err(sqlite::map_sqlx_error)?;
        let license_number: String = row.try_get("license_number").map_err(sqlite::map_sqlx_error)?;
        let rating: f64 = row.try_get("rating").map_err(sqlite::map_sqlx_error)?;
        let created_at_secs: i64 =
            row.try_get("created_at_secs").map_err(sqlite::map_sqlx_error)?;
        let created_at_nsecs: i64 =
            row.try_get("created_at_nsecs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_secs: i64 =
            row.try_get("updated_at_secs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_nsecs: i64 =
            row.try_get("updated_at_nsecs").map_err(sqlite::map_sqlx_error)?;

        Ok(Driver::new(
            EntityId::from_i64(id)?,
            name,
            phone,
            license_number,
            rating,
            build_timestamp(created_at_secs, created_at_nsecs)?,
            build_timestamp(updated_at_secs, updated_at_nsecs)?,
        ))
    }
}

/// Repository for the `drivers` table.
#[derive(Clone)]
pub(crate) struct DriverRepository {
    /// Database that holds the table.
    db: Arc<dyn Db + Send + Sync>,

    /// Source of the creation and modification timestamps.
    clock: Arc<dyn Clock + Send + Sync>,
}

impl DriverRepository {
    /// Creates a new repository backed by `db` that timestamps writes with `clock`.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { db, clock }
    }

    /// Gets all drivers sorted by id.
    pub(crate) async fn list(&self) -> DbResult<Vec<Driver>> {
        match self.db.ex().await? {
            #[cfg(feature = "postgres")]
            Executor::Postgres(mut conn) => {
                let query_str = "SELECT * FROM drivers ORDER BY id";
                let rows = sqlx::query(query_str)
                    .fetch_all(&mut *conn)
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                rows.into_iter().map(Driver::try_from).collect()
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(mut conn) => {
                let query_str = "SELECT * FROM drivers ORDER BY id";
                let rows = sqlx::query(query_str)
                    .fetch_all(&mut *conn)
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
                rows.into_iter().map(Driver::try_from).collect()
            }

            #[allow(unused)]
            _ => unreachable!(),
        }
    }

    /// Gets the driver identified by `id`.
    pub(crate) async fn get(&self, id: EntityId) -> DbResult<Driver> {
        match self.db.ex().await? {
            #[cfg(feature = "postgres")]
            Executor::Postgres(mut conn) => {
                let query_str = "SELECT * FROM drivers WHERE id = $1";
                let row = sqlx::query(query_str)
                    .bind(id.as_i32())
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                row.ok_or(DbError::NotFound).and_then(Driver::try_from)
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(mut conn) => {
                let query_str = "SELECT * FROM drivers WHERE id = ?";
                let row = sqlx::query(query_str)
                    .bind(id.as_i32())
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
                row.ok_or(DbError::NotFound).and_then(Driver::try_from)
            }

            #[allow(unused)]
            _ => unreachable!(),
        }
    }

    /// Stores a new driver and returns it as persisted.
    pub(crate) async fn create(&self, driver: DriverCreate) -> DbResult<Driver> {
        let now = self.clock.now_utc();
        match self.db.ex().await? {
            #[cfg(feature = "postgres")]
            Executor::Postgres(mut conn) => {
                let query_str = "
                    INSERT INTO drivers (
                        name, phone, license_number, rating, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $5)
                    RETURNING *
                ";
                let row = sqlx::query(query_str)
                    .bind(&driver.name)
                    .bind(&driver.phone)
                    .bind(&driver.license_number)
                    .bind(driver.rating)
                    .bind(now)
                    .fetch_one(&mut *conn)
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                Driver::try_from(row)
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(mut conn) => {
                let (now_secs, now_nsecs) = unpack_timestamp(now)?;
                let query_str = "
                    INSERT INTO drivers (
                        name, phone, license_number, rating,
                        created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                    RETURNING *
                ";
                let row = sqlx::query(query_str)
                    .bind(&driver.name)
                    .bind(&driver.phone)
                    .bind(&driver.license_number)
                    .bind(driver.rating)
                    .bind(now_secs)
                    .bind(now_nsecs)
                    .bind(now_secs)
                    .bind(now_nsecs)
                    .fetch_one(&mut *conn)
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
                Driver::try_from(row)
            }

            #[allow(unused)]
            _ => unreachable!(),
        }
    }

    /// Replaces the mutable fields of the driver identified by `id`.
    pub(crate) async fn update(&self, id: EntityId, driver: DriverUpdate) -> DbResult<Driver> {
        let now = self.clock.now_utc();
        match self.db.ex().await? {
            #[cfg(feature = "postgres")]
            Executor::Postgres(mut conn) => {
                let query_str = "
                    UPDATE drivers
                    SET name = $1, phone = $2, license_number = $3, rating = $4, updated_at = $5
                    WHERE id = $6
                    RETURNING *
                ";
                let row = sqlx::query(query_str)
                    .bind(&driver.name)
                    .bind(&driver.phone)
                    .bind(&driver.license_number)
                    .bind(driver.rating)
                    .bind(now)
                    .bind(id.as_i32())
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                row.ok_or(DbError::NotFound).and_then(Driver::try_from)
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(mut conn) => {
                let (now_secs, now_nsecs) = unpack_timestamp(now)?;
                let query_str = "
                    UPDATE drivers
                    SET name = ?, phone = ?, license_number = ?, rating = ?,
                        updated_at_secs = ?, updated_at_nsecs = ?
                    WHERE id = ?
                    RETURNING *
                ";
                let row = sqlx::query(query_str)
                    .bind(&driver.name)
                    .bind(&driver.phone)
                    .bind(&driver.license_number)
                    .bind(driver.rating)
                    .bind(now_secs)
                    .bind(now_nsecs)
                    .bind(id.as_i32())
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
                row.ok_or(DbError::NotFound).and_then(Driver::try_from)
            }

            #[allow(unused)]
            _ => unreachable!(),
        }
    }

    /// Deletes the driver identified by `id`.  Deleting a missing driver is not an error.
    pub(crate) async fn delete(&self, id: EntityId) -> DbResult<()> {
        let rows_affected = match self.db.ex().await? {
            #[cfg(feature = "postgres")]
            Executor::Postgres(mut conn) => {
                let query_str = "DELETE FROM drivers WHERE id = $1";
                let done = sqlx::query(query_str)
                    .bind(id.as_i32())
                    .execute(&mut *conn)
                    .await
                    .map_err(postgres::map_sqlx_error)?;
                done.rows_affected()
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(mut conn) => {
                let query_str = "DELETE FROM drivers WHERE id = ?";
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
