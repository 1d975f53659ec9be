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

//! API to update an existing driver.

use crate::model::{DriverUpdate, EntityId};
use crate::usecase::DriverUseCase;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use std::str::FromStr;
use std::sync::Arc;
use taxi_core::rest::{JsonBody, RestError};

/// API handler.
pub(crate) async fn handler(
    State(drivers): State<Arc<dyn DriverUseCase + Send + Sync>>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<DriverUpdate>,
) -> Result<impl IntoResponse, RestError> {
    let id = EntityId::from_str(&id)?;

    let driver = drivers.update(id, request).await?;

    Ok(Json(driver))
}

#[cfg(test)]
mod tests {
    use crate::model::*;
    use crate::rest::testutils::*;
    use axum::http;
    use std::time::Duration;
    use taxi_core::rest::testutils::*;

    fn route(id: &str) -> (http::Method, String) {
        (http::Method::PUT, format!("/api/drivers/{}", id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let driver = context.create_driver("pere", 2.0).await;
        let other = context.create_driver("other", 1.0).await;
        context.clock().advance(Duration::from_secs(10));

        let request = DriverUpdate::new(
            "Pere".to_owned(),
            "+34 699 999 999".to_owned(),
            "DL-9".to_owned(),
            4.25,
        );
        let response = OneShotBuilder::new(context.app(), route(&driver.id().to_string()))
            .send_json(request)
            .await
            .expect_json::<Driver>()
            .await;
        assert_eq!("Pere", response.name());
        assert_eq!("+34 699 999 999", response.phone());
        assert_eq!("DL-9", response.license_number());
        assert_eq!(4.25, *response.rating());
        assert_eq!(driver.created_at(), response.created_at());
        assert!(response.updated_at() > driver.updated_at());

        assert_eq!(response, context.drivers().get(*driver.id()).await.unwrap());
        assert_eq!(other, context.drivers().get(*other.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        let request = DriverUpdate::new("a".to_owned(), "b".to_owned(), "c".to_owned(), 3.0);
        OneShotBuilder::new(context.app(), route("999999"))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("internal server error")
            .await;
    }

    #[tokio::test]
    async fn test_bad_id() {
        let context = TestContext::setup().await;

        let request = DriverUpdate::new("a".to_owned(), "b".to_owned(), "c".to_owned(), 3.0);
        OneShotBuilder::new(context.app(), route("first"))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("bad request")
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route("1"));
}
