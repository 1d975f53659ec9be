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

//! Business logic for the service.
//!
//! The logic is intentionally thin: every operation delegates to a single repository call and
//! only translates its errors.  Input validation happens in the REST layer before any of these
//! operations run.

mod cars;
pub(crate) use cars::{CarService, CarUseCase};
mod clients;
pub(crate) use clients::{ClientService, ClientUseCase};
mod drivers;
pub(crate) use drivers::{DriverService, DriverUseCase};
#[cfg(test)]
mod testutils;
