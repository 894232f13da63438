// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use futures::{future::BoxFuture, FutureExt};
use std::time::Duration;

/// Time source seam so processors can wait without binding the protocol
/// code to a particular runtime clock.
pub trait TimeService: Send + Sync {
    fn sleep(&self, t: Duration) -> BoxFuture<'static, ()>;
}

/// TimeService implementation on the tokio clock.
pub struct ClockTimeService;

impl TimeService for ClockTimeService {
    fn sleep(&self, t: Duration) -> BoxFuture<'static, ()> {
        tokio::time::sleep(t).boxed()
    }
}
