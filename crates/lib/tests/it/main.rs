/*! Integration tests for confregistry.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - lifecycle: entry creation, update, destruction, and version history
 * - merge: non-destructive import, tombstones, and reconciliation
 * - interchange: whole-registry YAML import and export
 * - registry: the cached facade, reset interval, and overrides
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("confregistry=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod helpers;
mod interchange;
mod lifecycle;
mod merge;
mod registry;
