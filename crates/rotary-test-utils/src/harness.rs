// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test harness helpers.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize a tracing subscriber for test output.
///
/// Safe to call from every test; only the first call installs the
/// subscriber. Honors `RUST_LOG` for filtering.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}
