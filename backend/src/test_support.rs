//! HTTP API test harness.
//!
//! Integration suites under `tests/` build on these pieces: an ephemeral
//! store seeded with a fixed `test-` graph, a fixture caller injected by the
//! authentication middleware, per-area router assembly, a request driver and
//! envelope assertions. Compiled only with the `test-support` feature.

pub mod assertions;
pub mod concurrency;
pub mod driver;
pub mod fixtures;
pub mod stubs;
pub mod suite;

pub use assertions::{Envelope, assert_failure, assert_list, assert_success, field};
pub use concurrency::fan_out;
pub use driver::{ADMIN_TOKEN, RecordedResponse, RequestSpec, USER_TOKEN, send};
pub use fixtures::{FixtureError, cleanup_test_data, fixture_ids, insert_test_data};
pub use suite::{Area, SuiteError, SuiteOptions, SuiteState, TestSuite};
