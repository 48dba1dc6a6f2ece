//! RegTP special-case classifier.
//!
//! Invoked by the CA-authority gate when a certificate fails the plain
//! CA-authority check (no basicConstraints, or `is_ca == false`). Walks
//! upward using only the issuer resolver and the root predicate, never
//! the full chain walker, so a RegTP lookup never triggers signature,
//! policy, or revocation checks for the certificates it passes through.

use crate::cert::{Certificate, UserDataCache};
use crate::collaborators::{QualifiedList, QualifiedListCheck};
use crate::find_up;
use crate::keydb::KeyDatabase;

/// The German regulator's country code. Matched case-sensitively.
const REGTP_COUNTRY: &str = "de";

/// Maximum number of slots in the walk: the certificate under test plus
/// up to three ancestors.
const MAX_SLOTS: usize = 4;

/// Attempt to rescue `cert` as a CA via the RegTP special case. Returns
/// `Some(path_len)` if rescued (`path_len` is 0 or 1), `None` otherwise.
pub fn classify(
    cert: &Certificate,
    keydb: &mut dyn KeyDatabase,
    qualified_list: &dyn QualifiedList,
    cache: &UserDataCache,
) -> Option<u32> {
    if let Some(existing) = cache.get(&cert.fingerprint()) {
        return existing.regtp_ca_chainlen.and_then(|(flag, pathlen)| {
            if flag == 1 {
                Some(pathlen as u32)
            } else {
                None
            }
        });
    }

    let mut chain = vec![cert.clone()];
    let mut current = cert.clone();

    while chain.len() < MAX_SLOTS && !current.is_root() {
        match find_up::find_up(&current, keydb, None, false) {
            Some(next) => {
                chain.push(next.clone());
                current = next;
            }
            None => {
                mark_not_regtp(&chain, cache);
                return None;
            }
        }
    }

    let root = chain.last().expect("chain always has at least cert itself");
    // Filling every slot without having confirmed a root is a failure
    // regardless of what the last slot happens to be: the walk never
    // gets to ask whether it is root, since hitting the bound stops it
    // first. A real root discovered only on the fourth slot is not
    // rescued.
    if chain.len() == MAX_SLOTS || !root.is_root() {
        mark_not_regtp(&chain, cache);
        return None;
    }

    let matches_regtp = matches!(
        (qualified_list.is_in_qualified_list(root), root.country()),
        (QualifiedListCheck::Found(_), Some(ref country)) if country == REGTP_COUNTRY
    );

    if !matches_regtp {
        mark_not_regtp(&chain, cache);
        return None;
    }

    // The rescue applies to `cert` itself whenever a qualified "de"
    // root turns up anywhere within the bound above, regardless of how
    // many hops separate `cert` from it.
    cache.set_regtp_ca_chainlen(root.fingerprint(), Some((1, 1)));
    if chain.len() > 1 {
        // The slot directly below the root is the only other one that
        // gets cached. When the walk is longer than two certs, any
        // node strictly between `cert` and that slot — including
        // `cert` itself — is left uncached here and recomputed on a
        // future call.
        let one_below_root = &chain[chain.len() - 2];
        cache.set_regtp_ca_chainlen(one_below_root.fingerprint(), Some((1, 0)));
    }

    Some(if chain.len() > 1 { 0 } else { 1 })
}

fn mark_not_regtp(chain: &[Certificate], cache: &UserDataCache) {
    for cert in chain {
        cache.set_regtp_ca_chainlen(cert.fingerprint(), None);
    }
}
