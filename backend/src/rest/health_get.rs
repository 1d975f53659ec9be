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

//! API to check that the server is alive.

/// API handler.
pub(crate) async fn handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use axum::http;
    use taxi_core::rest::testutils::*;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/health".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route()).send_empty().await.expect_text("^OK$").await;
    }

    #[tokio::test]
    async fn test_ignores_payload() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route())
            .send_text("anything")
            .await
            .expect_text("^OK$")
            .await;
    }

    #[tokio::test]
    async fn test_ok_while_database_is_down() {
        let context = TestContext::setup().await;
        context.close_db().await;

        OneShotBuilder::new(context.app(), route()).send_empty().await.expect_text("^OK$").await;

        OneShotBuilder::new(context.app(), (http::Method::GET, "/api/clients".to_owned()))
            .send_empty()
            .await
            .expect_status(http::StatusCode::INTERNAL_SERVER_ERROR)
            .expect_error("internal server error")
            .await;
    }
}
