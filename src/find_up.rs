//! Issuer resolver: locates the certificate that issued a given subject.
//!
//! Five strategies, tried in order, falling through only on
//! "not found". `find_next` (used during signature-retry when a
//! candidate's signature doesn't verify) disables every
//! ephemeral/external fallback and relies purely on the main store's
//! stateful iteration over same-subject certificates.

use crate::cert::Certificate;
use crate::collaborators::DirectoryLookup;
use crate::keydb::{with_ephemeral, KeyDatabase};

/// Strip a DN to start at its `CN=` component when that RDN is not
/// already leftmost, for use as an external-directory lookup pattern.
fn normalize_pattern(dn: &str) -> String {
    match dn.find("CN=") {
        Some(0) | None => dn.to_string(),
        Some(idx) => dn[idx..].to_string(),
    }
}

fn not_self<'a>(candidate: &'a Certificate, subject: &Certificate) -> Option<&'a Certificate> {
    if candidate.image() == subject.image() {
        None
    } else {
        Some(candidate)
    }
}

/// Resolve `subject`'s issuer. `directory` is `Some` only when the
/// embedder has enabled `auto_issuer_key_retrieve`; its presence is
/// what gates strategies 3 and 5, collapsing that config switch into a
/// single `Option`.
pub fn find_up(
    subject: &Certificate,
    keydb: &mut dyn KeyDatabase,
    directory: Option<&dyn DirectoryLookup>,
    find_next: bool,
) -> Option<Certificate> {
    let issuer_dn = subject.issuer_dn();
    let aki = subject.authority_key_id();

    // Strategy 1: AKI issuer-name + serial.
    if let Some(aki) = &aki {
        if let (Some(name), Some(serial)) = (&aki.issuer_name, &aki.issuer_serial) {
            if let Some(found) = keydb.search_issuer_serial(name, serial) {
                if let Some(cert) = not_self(&found, subject) {
                    return Some(cert.clone());
                }
            } else if !find_next {
                let found = with_ephemeral(keydb, true, |db| db.search_issuer_serial(name, serial));
                if let Some(found) = found {
                    if let Some(cert) = not_self(&found, subject) {
                        return Some(cert.clone());
                    }
                }
            }
        }
    }

    // Strategy 2: AKI key identifier, matched against candidates'
    // subjectKeyIdentifier.
    if let Some(aki) = &aki {
        if let Some(key_id) = &aki.key_identifier {
            if let Some(found) = search_by_key_id(keydb, &issuer_dn, key_id, subject) {
                return Some(found);
            }
            if !find_next {
                let found = with_ephemeral(keydb, true, |db| {
                    search_by_key_id(db, &issuer_dn, key_id, subject)
                });
                if let Some(found) = found {
                    return Some(found);
                }
            }
        }
    }

    // Strategy 3: external lookup, keyed by AKI if present.
    if !find_next {
        if let Some(directory) = directory {
            let pattern = normalize_pattern(&issuer_dn);
            let fetched = fetch_into_ephemeral(directory, &pattern, keydb);
            if fetched > 0 {
                let found = with_ephemeral(keydb, true, |db| {
                    if let Some(aki) = &aki {
                        if let Some(key_id) = &aki.key_identifier {
                            if let Some(found) = search_by_key_id(db, &issuer_dn, key_id, subject) {
                                return Some(found);
                            }
                        }
                    }
                    db.search_subject(&issuer_dn);
                    loop {
                        let candidate = db.next_subject_match()?;
                        if let Some(cert) = not_self(&candidate, subject) {
                            return Some(cert.clone());
                        }
                    }
                });
                if found.is_some() {
                    return found;
                }
            }
        }
    }

    // Strategy 4: plain subject-DN search, main store then ephemeral.
    // `find_next` continues draining the cursor left by the previous
    // call instead of restarting the search — that's what lets a
    // signature-retry actually land on a different same-subject
    // candidate instead of the one just rejected.
    if !find_next {
        keydb.search_subject(&issuer_dn);
    }
    while let Some(candidate) = keydb.next_subject_match() {
        if let Some(cert) = not_self(&candidate, subject) {
            return Some(cert.clone());
        }
    }
    if !find_next {
        let found = with_ephemeral(keydb, true, |db| {
            db.search_subject(&issuer_dn);
            loop {
                let candidate = db.next_subject_match()?;
                if let Some(cert) = not_self(&candidate, subject) {
                    return Some(cert.clone());
                }
            }
        });
        if found.is_some() {
            return found;
        }
    }

    // Strategy 5: external lookup by DN alone.
    if !find_next {
        if let Some(directory) = directory {
            let pattern = normalize_pattern(&issuer_dn);
            let fetched = fetch_into_ephemeral(directory, &pattern, keydb);
            if fetched > 0 {
                let found = with_ephemeral(keydb, true, |db| {
                    db.search_subject(&issuer_dn);
                    loop {
                        let candidate = db.next_subject_match()?;
                        if let Some(cert) = not_self(&candidate, subject) {
                            return Some(cert.clone());
                        }
                    }
                });
                if found.is_some() {
                    return found;
                }
            }
        }
    }

    None
}

fn search_by_key_id(
    keydb: &mut dyn KeyDatabase,
    issuer_dn: &str,
    key_id: &[u8],
    subject: &Certificate,
) -> Option<Certificate> {
    keydb.search_subject(issuer_dn);
    while let Some(candidate) = keydb.next_subject_match() {
        if candidate.subject_key_id().as_deref() == Some(key_id) {
            if let Some(cert) = not_self(&candidate, subject) {
                return Some(cert.clone());
            }
        }
    }
    None
}

/// Query the external directory collaborator and store every result
/// into the ephemeral store, returning how many were stored.
fn fetch_into_ephemeral(
    directory: &dyn DirectoryLookup,
    pattern: &str,
    keydb: &mut dyn KeyDatabase,
) -> usize {
    let mut count = 0usize;
    directory.lookup(pattern, &mut |cert| {
        keydb.store_cert(cert, true);
        count += 1;
    });
    count
}
