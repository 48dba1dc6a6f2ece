//! The hardcoded known-OID set consulted by the critical-extension
//! gate: keyUsage, basicConstraints, certificatePolicies,
//! extendedKeyUsage.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// `{2.5.29.15, 2.5.29.19, 2.5.29.32, 2.5.29.37}` as dotted strings, the
/// same representation `Certificate::extensions()` returns. A `Lazy`
/// `HashSet` in place of a linear scan over a handful of strings on
/// every extension.
pub static KNOWN_CRITICAL_EXTENSIONS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["2.5.29.15", "2.5.29.19", "2.5.29.32", "2.5.29.37"]));

pub fn is_known_critical_extension(oid: &str) -> bool {
    KNOWN_CRITICAL_EXTENSIONS.contains(oid)
}
