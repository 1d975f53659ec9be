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

//! API to register a car.

use crate::model::CarCreate;
use crate::usecase::CarUseCase;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Json, http};
use std::sync::Arc;
use taxi_core::rest::{JsonBody, RestError};

/// API handler.
pub(crate) async fn handler(
    State(cars): State<Arc<dyn CarUseCase + Send + Sync>>,
    JsonBody(request): JsonBody<CarCreate>,
) -> Result<impl IntoResponse, RestError> {
    request.validate()?;

    let car = cars.create(request).await?;

    Ok((http::StatusCode::CREATED, Json(car)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::rest::testutils::*;
    use taxi_core::rest::testutils::*;

    fn route() -> (http::Method, String) {
        (http::Method::POST, "/api/cars".to_owned())
    }

    fn request(driver_id: EntityId, year: i32) -> CarCreate {
        CarCreate::new(
            driver_id,
            "Seat".to_owned(),
            "Ibiza".to_owned(),
            year,
            "4321-KLM".to_owned(),
            "red".to_owned(),
        )
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let driver = context.create_driver("owner", 4.0).await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_json(request(*driver.id(), 1950))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<Car>()
            .await;
        assert_eq!(driver.id(), response.driver_id());
        assert_eq!("Seat", response.brand());
        assert_eq!("Ibiza", response.model());
        assert_eq!(1950, *response.year());
        assert_eq!("4321-KLM", response.license_plate());
        assert_eq!("red", response.color());

        assert_eq!(vec![response], context.cars().list().await.unwrap());
    }

    #[tokio::test]
    async fn test_year_too_old() {
        let context = TestContext::setup().await;

        let driver = context.create_driver("owner", 4.0).await;

        OneShotBuilder::new(context.app(), route())
            .send_json(request(*driver.id(), 1899))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("bad request")
            .await;

        assert!(context.cars().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_driver() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route())
            .send_json(request(EntityId::try_from(424242u32).unwrap(), 2010))
            .await
            .expect_status(http::StatusCode::INTERNAL_SERVER_ERROR)
            .expect_error("internal server error")
            .await;

        assert!(context.cars().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_driver_id() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route())
            .send_text(concat!(
                r#"{"driver_id":-3,"brand":"Seat","model":"Ibiza","year":2010,"#,
                r#""license_plate":"X","color":"red"}"#,
            ))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("bad request")
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route());
}
