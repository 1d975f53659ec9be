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

//! Database access shared by all repositories, independent of the backing engine.
//!
//! The facilities in this module provide an abstraction over PostgreSQL and SQLite.  PostgreSQL
//! is the production backend and SQLite is used for local runs and unit tests.  Repositories ask
//! a `Db` for an `Executor` and then destructure it to issue backend-specific SQL.

use crate::model::ModelError;
use async_trait::async_trait;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Errors raised by the persistence layer.  Failures we cannot classify, including constraint
/// violations, end up as `BackendError`.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DbError {
    /// Catch-all error type for unexpected database errors, including constraint violations.
    #[error("Database error: {0}")]
    BackendError(String),

    /// A stored row could not be turned into a valid model value.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// The row targeted by the operation does not exist.
    #[error("Entity not found")]
    NotFound,

    /// Indicates that the database is not available (maybe because of too many active concurrent
    /// connections).
    #[error("Unavailable")]
    Unavailable,
}

impl From<ModelError> for DbError {
    fn from(e: ModelError) -> Self {
        DbError::DataIntegrityError(e.to_string())
    }
}

/// Result type for persistence operations.
pub type DbResult<T> = Result<T, DbError>;

/// A connection to one of the supported engines, checked out from its pool.
///
/// Each variant holds a connection checked out from the pool, which returns to the pool once the
/// executor is dropped.  Callers pass `&mut **conn` to sqlx to run their queries.
pub enum Executor {
    /// A PostgreSQL connection.
    #[cfg(feature = "postgres")]
    Postgres(sqlx::pool::PoolConnection<sqlx::Postgres>),

    /// A SQLite connection.
    #[cfg(feature = "sqlite")]
    Sqlite(sqlx::pool::PoolConnection<sqlx::Sqlite>),
}

/// A connection pool to some database engine.
#[async_trait]
pub trait Db {
    /// Checks out a connection from the pool.  The name is short because every repository
    /// operation starts with a call to it.
    async fn ex(&self) -> DbResult<Executor>;

    /// Closes the pool, waiting for checked out connections to be returned.
    async fn close(&self);
}

/// Macros to run one test suite against every supported engine.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    pub use paste::paste;

    /// Defines a `#[tokio::test]` named `name` that passes the result of `setup` to
    /// `module::name`.
    ///
    /// The `extra` metadata parameter can be used to tag the generated tests.
    #[macro_export]
    macro_rules! generate_one_test [
        ( $name:ident, $setup:expr, $module:path $(, #[$extra:meta] )? ) => {
            #[tokio::test]
            $(#[$extra])?
            async fn $name() {
                $crate::db::testutils::paste! {
                    $module :: [< $name >]($setup).await;
                }
            }
        }
    ];

    pub use generate_one_test;

    /// Defines one `#[tokio::test]` per `name`, all of them against the same engine.
    ///
    /// The `setup` expression is evaluated once per test and must yield a fresh database, empty
    /// unless the suite expects otherwise.
    ///
    /// The `extra` metadata parameter can be used to tag the generated tests.
    #[macro_export]
    macro_rules! generate_tests [
        ( #[$extra:meta], $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module, #[$extra]);
            )+
        };

        ( $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module);
            )+
        };
    ];

    pub use generate_tests;
}
