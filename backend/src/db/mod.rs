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

//! Repositories that persist the entities of the service.
//!
//! Every repository is the only component allowed to issue SQL for its table.  Repositories get
//! an `Executor` from the shared `Db` for each operation and run a single statement on it, so
//! every operation is atomic on its own.

#[cfg(feature = "postgres")]
use taxi_core::db::postgres;
#[cfg(feature = "sqlite")]
use taxi_core::db::sqlite;
use taxi_core::db::{DbResult, Executor};

mod cars;
pub(crate) use cars::CarRepository;
mod clients;
pub(crate) use clients::ClientRepository;
mod drivers;
pub(crate) use drivers::DriverRepository;
#[cfg(test)]
mod tests;

/// Initializes the database schema.  This is idempotent.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(conn) => postgres::run_schema(conn, include_str!("postgres.sql")).await,

        #[cfg(feature = "sqlite")]
        Executor::Sqlite(conn) => sqlite::run_schema(conn, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}
