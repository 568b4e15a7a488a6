/*! Integration tests for Waypost.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - context: Tests for AppContext startup and component wiring
 * - registry: Tests for the registry together with UID allocation and events
 * - resources: Tests for lazy map resources backed by real SQLite files
 * - crash: Tests for crash capture and the crash log across restarts
 * - settings: Tests for durable settings shared between components
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("waypost=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod context;
mod crash;
mod helpers;
mod registry;
mod resources;
mod settings;
