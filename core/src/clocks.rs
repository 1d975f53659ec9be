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

//! Sources of time for the service.
//!
//! Every timestamp stored by the repositories and every wait performed by the server goes through
//! a `Clock` so that tests can control time deterministically.

use async_trait::async_trait;
use std::time::Duration;
use time::OffsetDateTime;

/// Source of time for the components that need it.
#[async_trait]
pub trait Clock {
    /// Returns the current time in UTC.
    fn now_utc(&self) -> OffsetDateTime;

    /// Suspends the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the operating system.
#[derive(Clone, Default)]
pub struct SystemClock {}

#[async_trait]
impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();

        // PostgreSQL timestamps only keep microseconds.  Truncate here so that what we return to
        // the caller after a write matches what a later read yields.
        let truncated = now.nanosecond() / 1000 * 1000;
        now.replace_nanosecond(truncated).unwrap_or(now)
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

/// Test utilities.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Converts a timestamp to microseconds since the epoch, rejecting sub-microsecond precision.
    fn to_micros(ts: OffsetDateTime) -> u64 {
        let nanos = ts.unix_timestamp_nanos();
        assert!(nanos % 1000 == 0, "Nanosecond precision not supported");
        u64::try_from(nanos / 1000).unwrap()
    }

    /// A clock controlled by tests.
    ///
    /// Sleeping on this clock returns immediately after advancing the fake time, and the total
    /// time spent sleeping is recorded for later inspection.
    pub struct SettableClock {
        /// Current time as microseconds since the epoch.
        now_us: AtomicU64,

        /// Accumulated time passed to `sleep`, in microseconds.
        slept_us: AtomicU64,
    }

    impl SettableClock {
        /// Creates a clock stopped at `now`.
        pub fn new(now: OffsetDateTime) -> Self {
            Self { now_us: AtomicU64::new(to_micros(now)), slept_us: AtomicU64::new(0) }
        }

        /// Moves the clock to `now`.
        pub fn set(&self, now: OffsetDateTime) {
            self.now_us.store(to_micros(now), Ordering::SeqCst);
        }

        /// Moves the clock forward by `delta`.
        pub fn advance(&self, delta: Duration) {
            let delta_ns = delta.as_nanos();
            assert!(delta_ns % 1000 == 0, "Nanosecond precision not supported");
            let delta_us = u64::try_from(delta_ns / 1000).unwrap();
            self.now_us.fetch_add(delta_us, Ordering::SeqCst);
        }

        /// Returns the total amount of time that callers have slept on this clock.
        pub fn slept(&self) -> Duration {
            Duration::from_micros(self.slept_us.load(Ordering::SeqCst))
        }
    }

    #[async_trait]
    impl Clock for SettableClock {
        fn now_utc(&self) -> OffsetDateTime {
            let now_us = self.now_us.load(Ordering::SeqCst);
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(now_us) * 1000).unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            self.advance(duration);
            self.slept_us.fetch_add(u64::try_from(duration.as_micros()).unwrap(), Ordering::SeqCst);
            tokio::task::yield_now().await;
        }
    }

}
