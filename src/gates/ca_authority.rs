//! CA-authority gate: decides whether a certificate may act as an
//! issuer.

use crate::cert::{Certificate, UserDataCache};
use crate::collaborators::QualifiedList;
use crate::error::{ChainError, Result};
use crate::gates::PathLen;
use crate::keydb::KeyDatabase;
use crate::regtp;

/// Accept `cert` as an issuer iff its basicConstraints marks it a CA,
/// falling back to the RegTP rescue when basicConstraints is absent or
/// `is_ca` is false.
pub fn check(
    cert: &Certificate,
    keydb: &mut dyn KeyDatabase,
    qualified_list: &dyn QualifiedList,
    cache: &UserDataCache,
) -> Result<PathLen> {
    if let Some(bc) = cert.basic_constraints() {
        if bc.is_ca {
            return Ok(bc.path_len);
        }
    }

    match regtp::classify(cert, keydb, qualified_list, cache) {
        Some(path_len) => Ok(Some(path_len)),
        None => Err(ChainError::BadCaCert),
    }
}
