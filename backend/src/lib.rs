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

//! REST service to manage the clients, drivers and cars of a taxi company.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use axum::Router;
use log::info;
use std::future::Future;
use std::io;
use std::sync::Arc;
use taxi_core::clocks::{Clock, SystemClock};
#[cfg(feature = "postgres")]
use taxi_core::db::postgres::{PostgresDb, PostgresOptions};
#[cfg(feature = "sqlite")]
use taxi_core::db::sqlite;
use taxi_core::db::{Db, DbResult};
use taxi_core::env::get_optional_var;
use taxi_core::server::{Server, ServerOptions};

pub mod db;
use db::{CarRepository, ClientRepository, DriverRepository};
pub(crate) mod model;
mod rest;
mod usecase;
use usecase::{CarService, ClientService, DriverService};

/// Location of the database to connect to.
#[derive(Debug)]
pub enum DbConfig {
    /// A SQLite database given by its connection string.
    #[cfg(feature = "sqlite")]
    Sqlite(String),

    /// A PostgreSQL server given by its URL.
    #[cfg(feature = "postgres")]
    PostgresUrl(String),

    /// A PostgreSQL server given by its individual connection options.
    #[cfg(feature = "postgres")]
    Postgres(PostgresOptions),
}

impl DbConfig {
    /// Determines the database to use from the environment.
    ///
    /// `DATABASE_URL` takes precedence and selects SQLite when it starts with `sqlite:`.  When it
    /// is not set, the `DB_*` variables describe a PostgreSQL server.
    pub fn from_env() -> Result<Self, String> {
        match get_optional_var::<String>("DATABASE", "URL")? {
            #[cfg(feature = "sqlite")]
            Some(url) if url.starts_with("sqlite:") => Ok(DbConfig::Sqlite(url)),

            #[cfg(feature = "postgres")]
            Some(url) => Ok(DbConfig::PostgresUrl(url)),

            #[cfg(feature = "postgres")]
            None => Ok(DbConfig::Postgres(PostgresOptions::from_env("DB")?)),

            #[allow(unreachable_patterns)]
            _ => Err("The requested database is not supported by this build".to_owned()),
        }
    }

    /// Opens the connection pool described by this configuration.
    pub async fn connect(self) -> DbResult<Arc<dyn Db + Send + Sync>> {
        match self {
            #[cfg(feature = "sqlite")]
            DbConfig::Sqlite(url) => {
                info!("Using SQLite database {}", url);
                Ok(Arc::new(sqlite::connect(&url).await?))
            }

            #[cfg(feature = "postgres")]
            DbConfig::PostgresUrl(url) => {
                info!("Using PostgreSQL database from URL");
                Ok(Arc::new(PostgresDb::connect_url(&url)?))
            }

            #[cfg(feature = "postgres")]
            DbConfig::Postgres(opts) => {
                info!("Using PostgreSQL database {} on {}:{}", opts.database, opts.host, opts.port);
                Ok(Arc::new(PostgresDb::connect(opts)?))
            }
        }
    }
}

/// Wires the repositories and use-cases on top of `db` and returns the router that serves them.
fn app(db: Arc<dyn Db + Send + Sync>, clock: Arc<dyn Clock + Send + Sync>) -> Router {
    let clients = ClientService::new(ClientRepository::new(db.clone(), clock.clone()));
    let drivers = DriverService::new(DriverRepository::new(db.clone(), clock.clone()));
    let cars = CarService::new(CarRepository::new(db, clock));
    rest::app(Arc::new(clients), Arc::new(drivers), Arc::new(cars))
}

/// Instantiates all resources to serve the application until `shutdown` resolves.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve<F>(
    db: Arc<dyn Db + Send + Sync>,
    opts: ServerOptions,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock::default());
    let server = Server::new(opts, clock.clone());
    server.run(app(db, clock), shutdown).await
}
