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

//! HTTP server with signal-driven graceful shutdown.
//!
//! The server goes through two states.  While running, every request is routed to the app.  Once
//! the shutdown future resolves, the server stops accepting connections, gives in-flight requests
//! a grace period to complete and then exits.  Any request dispatched after shutdown started
//! waits for the grace period and then receives a bare 500.

use crate::clocks::Clock;
use crate::env::get_optional_var;
use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum_server::Handle;
use http::StatusCode;
use hyper_util::rt::TokioTimer;
use log::{info, warn};
use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Default port to listen on.
const DEFAULT_PORT: u16 = 8080;

/// Time given to in-flight requests to complete once shutdown starts.
const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum time a client can take to send the request headers.
const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(3);

/// Options to configure the HTTP server.
#[derive(Debug, PartialEq)]
pub struct ServerOptions {
    /// Port to listen on, on all interfaces.  Zero picks a free port.
    pub port: u16,

    /// Time given to in-flight requests to complete once shutdown starts.
    pub grace_period: Duration,

    /// Maximum time a client can take to send the request headers.
    pub header_read_timeout: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            grace_period: GRACEFUL_SHUTDOWN_TIMEOUT,
            header_read_timeout: HEADER_READ_TIMEOUT,
        }
    }
}

impl ServerOptions {
    /// Initializes a set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use the `<prefix>_PORT` variable, defaulting to 8080 when not set.
    pub fn from_env(prefix: &str) -> Result<ServerOptions, String> {
        let defaults = ServerOptions::default();
        Ok(ServerOptions {
            port: get_optional_var::<u16>(prefix, "PORT")?.unwrap_or(defaults.port),
            ..defaults
        })
    }
}

/// State for the middleware that rejects requests once shutdown has begun.
#[derive(Clone)]
struct DrainState {
    /// Becomes true when shutdown starts.
    shutting_down: watch::Receiver<bool>,

    /// Clock used to wait out the grace period.
    clock: Arc<dyn Clock + Send + Sync>,

    /// Time to wait before rejecting a request that arrives during shutdown.
    grace_period: Duration,
}

/// Middleware that routes requests while running and rejects them while shutting down.
async fn drain_guard(State(state): State<DrainState>, request: Request, next: Next) -> Response {
    if *state.shutting_down.borrow() {
        state.clock.sleep(state.grace_period).await;
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    next.run(request).await
}

/// Wraps `app` with the shutdown guard driven by `shutting_down`.
fn with_drain_guard(
    app: Router,
    shutting_down: watch::Receiver<bool>,
    clock: Arc<dyn Clock + Send + Sync>,
    grace_period: Duration,
) -> Router {
    let state = DrainState { shutting_down, clock, grace_period };
    app.layer(middleware::from_fn_with_state(state, drain_guard))
}

/// Waits until the process receives SIGINT or SIGTERM.
pub async fn termination_signal() -> io::Result<()> {
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = sigterm.recv() => Ok(()),
    }
}

/// An HTTP server for an app.
pub struct Server {
    /// Configuration of the server.
    opts: ServerOptions,

    /// Clock used by the shutdown logic.
    clock: Arc<dyn Clock + Send + Sync>,

    /// Handle to control and inspect the listening socket.
    handle: Handle,
}

impl Server {
    /// Creates a new server configured by `opts`.
    pub fn new(opts: ServerOptions, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { opts, clock, handle: Handle::new() }
    }

    /// Returns the address the server is listening on, once it is.
    pub async fn listening(&self) -> Option<SocketAddr> {
        self.handle.listening().await
    }

    /// Serves `app` until `shutdown` resolves and the shutdown sequence completes.
    ///
    /// Returns the first error from either the listener or the `shutdown` future.
    pub async fn run<F>(&self, app: Router, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = io::Result<()>>,
    {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.opts.port));
        let (shutting_down_tx, shutting_down_rx) = watch::channel(false);
        let app =
            with_drain_guard(app, shutting_down_rx, self.clock.clone(), self.opts.grace_period);

        let mut server = axum_server::bind(addr).handle(self.handle.clone());
        server
            .http_builder()
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(self.opts.header_read_timeout);

        info!("Starting server on {}", addr);
        let serve = server.serve(app.into_make_service());
        let watch_shutdown = async {
            shutdown.await?;
            warn!("Shutting down server...");
            shutting_down_tx.send_replace(true);
            // No deadline: connections must stay open until the drain guard has answered.
            self.handle.graceful_shutdown(None);
            Ok::<(), io::Error>(())
        };
        tokio::try_join!(serve, watch_shutdown)?;

        info!("Server stopped");
        Ok(())
    }
}
