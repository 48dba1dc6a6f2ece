//! Revocation gate: asks an external responder whether an edge in the
//! chain has been revoked.

use crate::cert::Certificate;
use crate::collaborators::{RevocationCheck, RevocationResponder};
use crate::error::{ChainError, Result, SoftFlags};
use crate::keydb::{FlagSlot, KeyDatabase, VALIDITY_REVOKED};

/// Ask the external responder whether the `(subject, issuer)` edge is
/// revoked, folding recoverable outcomes into `soft` and persisting a
/// `CERT_REVOKED` verdict to the key database best-effort. Callers
/// decide whether to invoke this at all (the skip-revocation flag, the
/// global CRL-disable switch, and the trusted-root exemption all live
/// in the walker, not here).
pub fn check(
    subject: &Certificate,
    issuer: &Certificate,
    use_ocsp: bool,
    responder: &dyn RevocationResponder,
    keydb: &mut dyn KeyDatabase,
    soft: &mut SoftFlags,
) -> Result<()> {
    match responder.is_valid(subject, issuer, use_ocsp) {
        RevocationCheck::Ok => Ok(()),
        RevocationCheck::CertRevoked => {
            soft.any_revoked = true;
            keydb.set_cert_flags(subject, FlagSlot::Validity, VALIDITY_REVOKED, VALIDITY_REVOKED);
            Ok(())
        }
        RevocationCheck::NoCrlKnown => {
            soft.any_no_crl = true;
            Ok(())
        }
        RevocationCheck::CrlTooOld => {
            soft.any_crl_too_old = true;
            Ok(())
        }
        RevocationCheck::Other(msg) => Err(ChainError::Collaborator(msg)),
    }
}
