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

//! Common utilities to interact with a PostgreSQL database.

use crate::db::{Db, DbError, DbResult, Executor};
use crate::env::get_optional_var;
use async_trait::async_trait;
use derivative::Derivative;
use futures::Future;
use log::warn;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions, PgSslMode, Postgres};
use std::str::FromStr;
use std::time::Duration;

/// Default value for the `max_retries` configuration property.
const DEFAULT_MAX_RETRIES: u16 = 60;

/// Takes a raw SQLx error `e` and converts it to our generic error type.
///
/// Constraint violations are reported as backend errors: a write that references a missing row
/// is a failure of the request, not a lookup that came back empty.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::Database(e) => match e.code().as_deref() {
            Some("23503") => DbError::BackendError(format!("Foreign key violation: {}", e)),
            Some("23505") => DbError::BackendError(format!("Unique violation: {}", e)),
            Some("53300") => DbError::Unavailable,
            Some(code) => DbError::BackendError(format!("pgsql error {}: {}", code, e)),
            None => DbError::BackendError(e.to_string()),
        },
        sqlx::Error::PoolTimedOut => DbError::Unavailable,
        sqlx::Error::RowNotFound => DbError::NotFound,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Options to establish a connection to a PostgreSQL database.
#[derive(Derivative)]
#[derivative(Debug)]
#[cfg_attr(test, derivative(PartialEq))]
pub struct PostgresOptions {
    /// Host to connect to.
    pub host: String,

    /// Port to connect to (typically 5432).
    pub port: u16,

    /// Database name to connect to.
    pub database: String,

    /// Username to establish the connection with.
    pub username: String,

    /// Password to establish the connection with.
    #[derivative(Debug = "ignore")]
    pub password: String,

    /// SSL negotiation mode, using the libpq names (`disable`, `require`, etc.).
    pub ssl_mode: String,

    /// Minimum number of connections to keep open against the database.
    pub min_connections: Option<u32>,

    /// Maximum number of connections to allow against the database.
    pub max_connections: Option<u32>,

    /// Maximum number of attempts to retry a connection operation when the database does not seem
    /// to be available.
    pub max_retries: u16,
}

impl Default for PostgresOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 5432,
            database: "taxi".to_owned(),
            username: "postgres".to_owned(),
            password: "postgres".to_owned(),
            ssl_mode: "disable".to_owned(),
            min_connections: None,
            max_connections: None,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl PostgresOptions {
    /// Initializes a set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_HOST`, `<prefix>_PORT`, `<prefix>_NAME`,
    /// `<prefix>_USER`, `<prefix>_PASSWORD`, `<prefix>_SSLMODE`, `<prefix>_MIN_CONNECTIONS`,
    /// `<prefix>_MAX_CONNECTIONS` and `<prefix>_MAX_RETRIES`.  Any variable that is not set takes
    /// the value from `PostgresOptions::default`.
    pub fn from_env(prefix: &str) -> Result<PostgresOptions, String> {
        let defaults = PostgresOptions::default();
        Ok(PostgresOptions {
            host: get_optional_var::<String>(prefix, "HOST")?.unwrap_or(defaults.host),
            port: get_optional_var::<u16>(prefix, "PORT")?.unwrap_or(defaults.port),
            database: get_optional_var::<String>(prefix, "NAME")?.unwrap_or(defaults.database),
            username: get_optional_var::<String>(prefix, "USER")?.unwrap_or(defaults.username),
            password: get_optional_var::<String>(prefix, "PASSWORD")?
                .unwrap_or(defaults.password),
            ssl_mode: get_optional_var::<String>(prefix, "SSLMODE")?.unwrap_or(defaults.ssl_mode),
            min_connections: get_optional_var::<u32>(prefix, "MIN_CONNECTIONS")?,
            max_connections: get_optional_var::<u32>(prefix, "MAX_CONNECTIONS")?,
            max_retries: get_optional_var::<u16>(prefix, "MAX_RETRIES")?
                .unwrap_or(defaults.max_retries),
        })
    }

    /// Builds the sqlx connection options described by this object.
    fn connect_options(&self) -> DbResult<PgConnectOptions> {
        let ssl_mode = PgSslMode::from_str(&self.ssl_mode)
            .map_err(|e| DbError::BackendError(format!("Invalid SSL mode: {}", e)))?;
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(&self.password)
            .ssl_mode(ssl_mode))
    }

    /// Builds the sqlx pool options described by this object.
    fn pool_options(&self) -> PgPoolOptions {
        let mut pool_options = PgPoolOptions::new();
        if let Some(min_connections) = self.min_connections {
            pool_options = pool_options.min_connections(min_connections);
        }
        if let Some(max_connections) = self.max_connections {
            pool_options = pool_options.max_connections(max_connections);
        }
        pool_options.acquire_timeout(Duration::from_secs(2))
    }
}

/// Retries a database operation up to `retries` times.
async fn retry<Op, OpFut, T>(op: Op, mut retries: u16) -> DbResult<T>
where
    Op: Fn() -> OpFut,
    OpFut: Future<Output = Result<T, sqlx::Error>>,
    T: Send + Sync,
{
    let mut delay = Duration::from_millis(100 + u64::from(rand::random::<u16>() % 900));
    loop {
        match op().await.map_err(map_sqlx_error) {
            Ok(result) => return Ok(result),
            Err(DbError::Unavailable) => {
                if retries == 0 {
                    return Err(DbError::Unavailable);
                }
                retries -= 1;

                warn!(
                    "Database is unavailable; waiting {}ms before retrying with {} attempts left",
                    delay.as_millis(),
                    retries
                );

                tokio::time::sleep(delay).await;
                if delay < Duration::from_secs(5) {
                    delay += Duration::from_millis(u64::from(rand::random::<u16>() % 1000));
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// Shareable connection pool to a PostgreSQL database.
pub struct PostgresDb {
    /// Shared PostgreSQL connection pool.
    pool: PgPool,

    /// Maximum number of attempts to retry a connection operation when the database does not seem
    /// to be available.
    max_retries: u16,
}

impl Drop for PostgresDb {
    fn drop(&mut self) {
        if !self.pool.is_closed() {
            warn!("Dropping connection without having called close() first");
        }
    }
}

impl PostgresDb {
    /// Creates a new connection pool based on a set of options.
    ///
    /// Note that this does *not* establish any connection.
    pub fn connect(opts: PostgresOptions) -> DbResult<Self> {
        let pool = opts.pool_options().connect_lazy_with(opts.connect_options()?);
        Ok(Self { pool, max_retries: opts.max_retries })
    }

    /// Creates a new connection pool from a `postgres://` connection string.
    ///
    /// Note that this does *not* establish any connection.
    pub fn connect_url(url: &str) -> DbResult<Self> {
        let defaults = PostgresOptions::default();
        let options = PgConnectOptions::from_str(url)
            .map_err(|e| DbError::BackendError(format!("Invalid database URL: {}", e)))?;
        let pool = defaults.pool_options().connect_lazy_with(options);
        Ok(Self { pool, max_retries: defaults.max_retries })
    }

    /// Returns a connection of the specific type used by this database.
    pub async fn typed_ex(&self) -> DbResult<PoolConnection<Postgres>> {
        retry(|| self.pool.acquire(), self.max_retries).await
    }
}

#[async_trait]
impl Db for PostgresDb {
    async fn ex(&self) -> DbResult<Executor> {
        let conn = self.typed_ex().await?;
        Ok(Executor::Postgres(conn))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Helper function to initialize the database with a schema.
///
/// The schema is split into statements at semicolons, so comments must not contain any.
pub async fn run_schema(conn: &mut PgConnection, schema: &str) -> DbResult<()> {
    let comments = regex::RegexBuilder::new("--.*$")
        .multi_line(true)
        .build()
        .map_err(|e| DbError::BackendError(e.to_string()))?;
    let schema = comments.replace_all(schema, "");

    for query_str in schema.split(';').filter(|q| !q.trim().is_empty()) {
        sqlx::query(query_str).execute(&mut *conn).await.map_err(map_sqlx_error)?;
    }
    Ok(())
}

/// Test utilities for the PostgreSQL connection.
#[cfg(any(feature = "testutils", test))]
pub mod testutils {
    use super::*;

    /// Creates a new connection to the test database and initializes it.
    ///
    /// This sets up the database to use the `pg_temp` schema by default so that any tables
    /// created during the test are deleted at disconnection time.  Note that for this to work,
    /// the connection pool must maintain a single connection open at all times, but not more.
    ///
    /// Given that this is for testing purposes only, any errors will panic.
    pub async fn setup() -> PostgresDb {
        let _can_fail = env_logger::builder().is_test(true).try_init();

        let mut opts = PostgresOptions::from_env("PGSQL_TEST").unwrap();
        opts.min_connections = Some(1);
        opts.max_connections = Some(1);
        let db = PostgresDb::connect(opts).unwrap();

        let mut conn = db.typed_ex().await.unwrap();
        sqlx::query("SET search_path TO pg_temp").execute(&mut *conn).await.unwrap();
        db
    }
}

#[cfg(test)]
mod tests {
    use super::testutils::*;
    use super::*;
    use crate::db::tests::generate_db_tests;

    generate_db_tests!(
        Box::new(setup().await),
        #[ignore = "Requires environment configuration and is expensive"]
    );

    #[test]
    pub fn test_postgres_options_from_env_defaults() {
        temp_env::with_vars_unset(
            [
                "TAXIDB_HOST",
                "TAXIDB_PORT",
                "TAXIDB_NAME",
                "TAXIDB_USER",
                "TAXIDB_PASSWORD",
                "TAXIDB_SSLMODE",
                "TAXIDB_MIN_CONNECTIONS",
                "TAXIDB_MAX_CONNECTIONS",
                "TAXIDB_MAX_RETRIES",
            ],
            || {
                let opts = PostgresOptions::from_env("TAXIDB").unwrap();
                assert_eq!(PostgresOptions::default(), opts);
                assert_eq!("localhost", opts.host);
                assert_eq!(5432, opts.port);
                assert_eq!("taxi", opts.database);
                assert_eq!("disable", opts.ssl_mode);
            },
        );
    }

    #[test]
    pub fn test_postgres_options_from_env_all_present() {
        temp_env::with_vars(
            [
                ("TAXIDB_HOST", Some("db.internal")),
                ("TAXIDB_PORT", Some("6543")),
                ("TAXIDB_NAME", Some("fleet")),
                ("TAXIDB_USER", Some("dispatcher")),
                ("TAXIDB_PASSWORD", Some("s3cr3t")),
                ("TAXIDB_SSLMODE", Some("require")),
                ("TAXIDB_MIN_CONNECTIONS", Some("2")),
                ("TAXIDB_MAX_CONNECTIONS", Some("25")),
                ("TAXIDB_MAX_RETRIES", Some("3")),
            ],
            || {
                let opts = PostgresOptions::from_env("TAXIDB").unwrap();
                assert_eq!(
                    PostgresOptions {
                        host: "db.internal".to_owned(),
                        port: 6543,
                        database: "fleet".to_owned(),
                        username: "dispatcher".to_owned(),
                        password: "s3cr3t".to_owned(),
                        ssl_mode: "require".to_owned(),
                        min_connections: Some(2),
                        max_connections: Some(25),
                        max_retries: 3,
                    },
                    opts
                );
            },
        );
    }

    #[test]
    pub fn test_postgres_options_bad_port_type() {
        temp_env::with_var("TAXIDB_PORT", Some("not a number"), || {
            let err = PostgresOptions::from_env("TAXIDB").unwrap_err();
            assert!(err.contains("TAXIDB_PORT"));
            assert!(err.contains("Invalid u16"));
        });
    }

    #[test]
    pub fn test_postgres_options_debug_hides_password() {
        let opts = PostgresOptions { password: "hunter2".to_owned(), ..Default::default() };
        assert!(!format!("{:?}", opts).contains("hunter2"));
    }

    #[test]
    pub fn test_postgres_options_bad_ssl_mode() {
        let opts = PostgresOptions { ssl_mode: "sometimes".to_owned(), ..Default::default() };
        match opts.connect_options() {
            Err(DbError::BackendError(e)) => assert!(e.contains("Invalid SSL mode")),
            e => panic!("Must have failed with a BackendError but got: {:?}", e.map(|_| ())),
        }
    }

    #[tokio::test]
    pub async fn test_connect_url_invalid() {
        match PostgresDb::connect_url("this is not a url") {
            Err(DbError::BackendError(e)) => assert!(e.contains("Invalid database URL")),
            Err(e) => panic!("Unexpected error: {:?}", e),
            Ok(db) => {
                db.close().await;
                panic!("Must have failed");
            }
        }
    }
}
