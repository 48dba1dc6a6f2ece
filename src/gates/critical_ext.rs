//! Critical-extension gate: rejects certificates carrying a critical
//! extension this engine does not understand.

use crate::cert::Certificate;
use crate::error::{ChainError, Result};
use crate::oid;

/// Reject any certificate carrying a critical extension outside the
/// hardcoded known-OID set.
pub fn check(cert: &Certificate) -> Result<()> {
    for ext in cert.extensions() {
        if ext.critical && !oid::is_known_critical_extension(&ext.oid) {
            return Err(ChainError::UnsupportedCert);
        }
    }
    Ok(())
}
