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

//! API to get a single driver.

use crate::model::EntityId;
use crate::usecase::DriverUseCase;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use std::str::FromStr;
use std::sync::Arc;
use taxi_core::rest::RestError;

/// API handler.
pub(crate) async fn handler(
    State(drivers): State<Arc<dyn DriverUseCase + Send + Sync>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, RestError> {
    let id = EntityId::from_str(&id)?;

    let driver = drivers.get(id).await?;

    Ok(Json(driver))
}
