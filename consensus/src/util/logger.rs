// Copyright (c) The Libra Core Contributors
// SPDX-License-Identifier: Apache-2.0

use slog::{o, Drain};

/// Installs the process-wide logger: term output behind an async drain so
/// logging never blocks a processor. The returned guard must be held for
/// the lifetime of the process; dropping it reverts to the discard logger.
pub fn set_default_global_logger() -> slog_scope::GlobalLoggerGuard {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).chan_size(256).build().fuse();
    slog_scope::set_global_logger(slog::Logger::root(drain, o!()))
}
