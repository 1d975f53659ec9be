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

//! Generic business logic for any service.
//!
//! Every service should expose one trait per entity in its own `usecase` module, plus a concrete
//! implementation that talks to the repositories of the `db` layer.  The REST handlers receive
//! the trait as an `Arc<dyn ... + Send + Sync>` state object, which allows tests to swap in
//! alternate implementations.

use crate::db::DbError;

/// Business logic errors.  These errors encompass backend and logical errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum UseCaseError {
    /// Catch-all error type for unexpected database errors.
    #[error("{0}")]
    BackendError(String),

    /// Indicates that a requested entry does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl From<DbError> for UseCaseError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::BackendError(_) => UseCaseError::BackendError(e.to_string()),
            DbError::DataIntegrityError(_) => UseCaseError::BackendError(e.to_string()),
            DbError::NotFound => UseCaseError::NotFound(e.to_string()),
            DbError::Unavailable => UseCaseError::BackendError(e.to_string()),
        }
    }
}

/// Result type for this module.
pub type UseCaseResult<T> = Result<T, UseCaseError>;
