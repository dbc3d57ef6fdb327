//! Identifier generation for new entities.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Produces primary keys for newly created rows.
pub trait IdGenerator: Send + Sync {
    /// Return a fresh identifier.
    fn next_id(&self) -> String;
}

/// Random UUID identifiers used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Identifiers of the form `<prefix><uuid>`.
///
/// Integration suites use the `test-` prefix so rows created during a case
/// are removed by the fixture wipe.
#[derive(Debug)]
pub struct PrefixedIdGenerator {
    prefix: String,
    issued: AtomicU64,
}

impl PrefixedIdGenerator {
    /// Create a generator stamping `prefix` on every identifier.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: AtomicU64::new(0),
        }
    }

    /// Number of identifiers handed out so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }
}

impl IdGenerator for PrefixedIdGenerator {
    fn next_id(&self) -> String {
        self.issued.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, Uuid::new_v4())
    }
}
