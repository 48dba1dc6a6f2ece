//! Qualified-signature classifier.
//!
//! Consulted once per chain-validation call, after the root is reached,
//! and cached on the **leaf's** user-data slot, not the root's, and not
//! whichever node happens to be "subject" when the walk exits.

use crate::cert::{Fingerprint, UserDataCache};
use crate::collaborators::{QualifiedList, QualifiedListCheck};

/// Resolve whether `leaf` transitively roots in a qualified-signature
/// root, consulting the cache first and the collaborator only on a
/// cache miss. Returns `None` ("unknown") on collaborator failure —
/// logged, never fatal to the chain.
pub fn classify(
    leaf_fp: Fingerprint,
    root: &crate::cert::Certificate,
    cache: &UserDataCache,
    qualified_list: &dyn QualifiedList,
) -> Option<bool> {
    if let Some(existing) = cache.get(&leaf_fp).and_then(|u| u.is_qualified) {
        return Some(existing);
    }

    match qualified_list.is_in_qualified_list(root) {
        QualifiedListCheck::Found(_country) => {
            cache.set_is_qualified(leaf_fp, true);
            Some(true)
        }
        QualifiedListCheck::NotFound => {
            cache.set_is_qualified(leaf_fp, false);
            Some(false)
        }
        QualifiedListCheck::Other(msg) => {
            log::warn!("qualified-list lookup failed, leaving is_qualified unknown: {}", msg);
            None
        }
    }
}
