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

//! Entry point to the REST server.

use crate::usecase::{CarUseCase, ClientUseCase, DriverUseCase};
use axum::Router;
use std::sync::Arc;

mod car_delete;
mod car_get;
mod car_put;
mod cars_get;
mod cars_post;
mod client_delete;
mod client_get;
mod client_put;
mod clients_get;
mod clients_post;
mod driver_delete;
mod driver_get;
mod driver_put;
mod drivers_get;
mod drivers_post;
mod health_get;
#[cfg(test)]
mod testutils;

/// Creates the router for the application.
///
/// Each group of entity APIs carries its own use-case as state, and the groups are merged into a
/// single stateless router.
pub(crate) fn app(
    clients: Arc<dyn ClientUseCase + Send + Sync>,
    drivers: Arc<dyn DriverUseCase + Send + Sync>,
    cars: Arc<dyn CarUseCase + Send + Sync>,
) -> Router {
    use axum::routing::get;

    let clients_api: Router = Router::new()
        .route("/api/clients", get(clients_get::handler).post(clients_post::handler))
        .route(
            "/api/clients/:id",
            get(client_get::handler).put(client_put::handler).delete(client_delete::handler),
        )
        .with_state(clients);

    let drivers_api: Router = Router::new()
        .route("/api/drivers", get(drivers_get::handler).post(drivers_post::handler))
        .route(
            "/api/drivers/:id",
            get(driver_get::handler).put(driver_put::handler).delete(driver_delete::handler),
        )
        .with_state(drivers);

    let cars_api: Router = Router::new()
        .route("/api/cars", get(cars_get::handler).post(cars_post::handler))
        .route(
            "/api/cars/:id",
            get(car_get::handler).put(car_put::handler).delete(car_delete::handler),
        )
        .with_state(cars);

    Router::new()
        .route("/health", get(health_get::handler))
        .merge(clients_api)
        .merge(drivers_api)
        .merge(cars_api)
}
