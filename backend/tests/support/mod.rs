//! Shared setup for the HTTP API suites.

use vaultke::test_support::{SuiteOptions, TestSuite};

/// Open a suite with the default caller and seed the fixture graph.
pub async fn seeded_suite() -> TestSuite {
    let mut suite = TestSuite::setup_suite(SuiteOptions::default())
        .await
        .expect("open suite");
    suite.setup_test().await.expect("seed fixtures");
    suite
}
