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

//! Entry point to the taxi service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::{error, info};
use std::process;
use taxi_backend::db::init_schema;
use taxi_backend::{DbConfig, serve};
use taxi_core::server::{ServerOptions, termination_signal};

/// Sets up the database and serves the application until a termination signal arrives.
async fn run() -> Result<(), String> {
    let server_opts = ServerOptions::from_env("SERVER")?;
    let db_config = DbConfig::from_env()?;

    let db = db_config.connect().await.map_err(|e| e.to_string())?;
    let schema = match db.ex().await {
        Ok(mut ex) => init_schema(&mut ex).await,
        Err(e) => Err(e),
    };
    if let Err(e) = schema {
        db.close().await;
        return Err(format!("Failed to initialize schema: {}", e));
    }
    info!("Database schema ready");

    let result = serve(db.clone(), server_opts, termination_signal()).await;
    db.close().await;
    result.map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        error!("{}", e);
        process::exit(1);
    }
}
