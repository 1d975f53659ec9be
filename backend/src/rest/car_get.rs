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

//! API to get a single car.

use crate::model::EntityId;
use crate::usecase::CarUseCase;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use std::str::FromStr;
use std::sync::Arc;
use taxi_core::rest::RestError;

/// API handler.
pub(crate) async fn handler(
    State(cars): State<Arc<dyn CarUseCase + Send + Sync>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, RestError> {
    let id = EntityId::from_str(&id)?;

    let car = cars.get(id).await?;

    Ok(Json(car))
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use axum::http;
    use taxi_core::rest::testutils::*;

    fn route(id: &str) -> (http::Method, String) {
        (http::Method::GET, format!("/api/cars/{}", id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let driver = context.create_driver("owner", 4.0).await;
        let car = context.create_car(*driver.id(), "9876-ZZZ").await;

        let exp_re = format!(
            concat!(
                r#"^\{{"id":{},"driver_id":{},"brand":"Skoda","model":"Octavia","year":2022,"#,
                r#""license_plate":"9876-ZZZ","color":"silver","#,
                r#""created_at":"2024-06-01T09:30:00Z","updated_at":"2024-06-01T09:30:00Z"\}}$"#,
            ),
            car.id(),
            driver.id()
        );
        OneShotBuilder::new(context.app(), route(&car.id().to_string()))
            .send_empty()
            .await
            .expect_text(&exp_re)
            .await;
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route("999999"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("internal server error")
            .await;
    }

    #[tokio::test]
    async fn test_bad_id() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route("1a"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("bad request")
            .await;
    }
}
