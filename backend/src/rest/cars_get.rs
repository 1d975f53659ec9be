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

//! API to get all cars.

use crate::usecase::CarUseCase;
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use std::sync::Arc;
use taxi_core::rest::RestError;

/// API handler.
pub(crate) async fn handler(
    State(cars): State<Arc<dyn CarUseCase + Send + Sync>>,
) -> Result<impl IntoResponse, RestError> {
    let cars = cars.list().await?;

    Ok(Json(cars))
}

#[cfg(test)]
mod tests {
    use crate::model::*;
    use crate::rest::testutils::*;
    use axum::http;
    use taxi_core::rest::testutils::*;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/api/cars".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let driver1 = context.create_driver("one", 4.0).await;
        let driver2 = context.create_driver("two", 4.0).await;
        let car1 = context.create_car(*driver2.id(), "1111-BBB").await;
        let car2 = context.create_car(*driver1.id(), "2222-CCC").await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_empty()
            .await
            .expect_json::<Vec<Car>>()
            .await;
        assert_eq!(vec![car1, car2], response);
    }
}
