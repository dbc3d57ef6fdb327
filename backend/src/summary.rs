//! End-of-run report printed by the `coverage-summary` binary.
//!
//! The figures are fixed constants updated by hand after a coverage run;
//! nothing here measures anything.

/// Integration cases across every suite.
pub const TOTAL_TESTS: u32 = 186;
/// Cases passing on the last recorded run.
pub const PASSING_TESTS: u32 = 186;
/// Line coverage of the HTTP layer.
pub const HANDLER_COVERAGE: &str = "87.4%";
/// Line coverage of the whole crate.
pub const OVERALL_COVERAGE: &str = "81.2%";

/// Feature areas and whether their suites exercise real handlers.
pub const FEATURES: &[(&str, bool)] = &[
    ("Authentication: register, login, logout, refresh, profile", true),
    ("Users: listing, search, profile", true),
    ("Admin: role, status, deletion", true),
    ("Marketplace: products, categories, search", true),
    ("Marketplace: cart, checkout, orders", true),
    ("Marketplace: reviews and ratings", true),
    ("Notifications: inbox, read state, bulk send", true),
    ("Notifications: delivery settings", true),
    ("Chamas, wallets, reminders (stubbed)", false),
    ("Concurrent creation", true),
    ("Database failure handling", true),
];

/// Render the fixed report.
///
/// # Examples
/// ```
/// let report = vaultke::summary::render_summary();
/// assert!(report.starts_with("VaultKe API test summary"));
/// ```
#[must_use]
pub fn render_summary() -> String {
    let mut lines = vec![
        "VaultKe API test summary".to_owned(),
        "========================".to_owned(),
        String::new(),
        format!("Tests:            {PASSING_TESTS}/{TOTAL_TESTS} passing"),
        format!("Handler coverage: {HANDLER_COVERAGE}"),
        format!("Overall coverage: {OVERALL_COVERAGE}"),
        String::new(),
        "Features:".to_owned(),
    ];
    lines.extend(FEATURES.iter().map(|(name, real)| {
        let mark = if *real { 'x' } else { ' ' };
        format!("  [{mark}] {name}")
    }));
    let mut report = lines.join("\n");
    report.push('\n');
    report
}
