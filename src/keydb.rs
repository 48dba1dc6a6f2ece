//! The key-database collaborator: search and storage for certificates
//! an embedder holds on disk or in memory.
//!
//! This trait exposes a value-returning
//! `next_subject_match() -> Option<Certificate>` rather than a
//! get-current-after-search cursor pair, and the ephemeral toggle is
//! wrapped in a scoped helper (`with_ephemeral`) rather than requiring
//! callers to hand-manage save/restore integers.

use crate::cert::Certificate;

/// Which per-certificate flag slot `set_cert_flags` writes to. The
/// engine only ever needs `Validity`, used by the revocation gate to
/// persist `VALIDITY_REVOKED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSlot {
    Validity,
}

/// Bit written into the `Validity` slot when the revocation gate learns
/// a certificate is revoked.
pub const VALIDITY_REVOKED: u32 = 0x01;

/// A cursor over one or more certificate stores. Implementors back this
/// with local disk I/O or, for tests, an in-memory `Vec`.
pub trait KeyDatabase {
    /// Reset any stateful search cursor.
    fn reset(&mut self);

    /// Locate a certificate by issuer DN + serial number in whichever
    /// store (main or ephemeral) is currently active.
    fn search_issuer_serial(&mut self, issuer_dn: &str, serial: &[u8]) -> Option<Certificate>;

    /// Begin a subject-DN search; candidates are then drained one at a
    /// time via `next_subject_match`.
    fn search_subject(&mut self, subject_dn: &str);

    /// Next candidate from the search started by `search_subject`, or
    /// `None` once exhausted.
    fn next_subject_match(&mut self) -> Option<Certificate>;

    /// Toggle visibility of the ephemeral ("just fetched") store,
    /// returning the prior value so callers can restore it.
    fn set_ephemeral(&mut self, ephemeral: bool) -> bool;

    fn store_cert(&mut self, cert: Certificate, ephemeral: bool);

    fn set_cert_flags(&mut self, cert: &Certificate, slot: FlagSlot, mask: u32, value: u32);
}

/// Run `f` with the ephemeral store toggled to `enabled` for the
/// duration of the call, then restore the prior setting, expressed as a
/// single scoped call instead of manual bookkeeping at every call site.
pub fn with_ephemeral<D, R>(db: &mut D, enabled: bool, f: impl FnOnce(&mut D) -> R) -> R
where
    D: KeyDatabase + ?Sized,
{
    let prior = db.set_ephemeral(enabled);
    let result = f(db);
    db.set_ephemeral(prior);
    result
}

/// An in-memory `KeyDatabase`, used by tests and as a reference
/// implementation for embedders without a disk-backed store.
#[derive(Debug, Default)]
pub struct MemoryKeyDb {
    main: Vec<Certificate>,
    ephemeral_store: Vec<Certificate>,
    ephemeral_active: bool,
    subject_cursor: Vec<Certificate>,
    flags: std::collections::HashMap<[u8; 20], u32>,
}

impl MemoryKeyDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_main_certs(certs: Vec<Certificate>) -> Self {
        MemoryKeyDb {
            main: certs,
            ..Self::default()
        }
    }

    fn active_store(&self) -> impl Iterator<Item = &Certificate> {
        let ephemeral: &[Certificate] = if self.ephemeral_active {
            &self.ephemeral_store
        } else {
            &[]
        };
        self.main.iter().chain(ephemeral.iter())
    }

    pub fn flags_for(&self, cert: &Certificate) -> u32 {
        *self.flags.get(&cert.fingerprint().0).unwrap_or(&0)
    }
}

impl KeyDatabase for MemoryKeyDb {
    fn reset(&mut self) {
        self.subject_cursor.clear();
    }

    fn search_issuer_serial(&mut self, issuer_dn: &str, serial: &[u8]) -> Option<Certificate> {
        self.active_store()
            .find(|cert| cert.subject_dn() == issuer_dn && cert.serial_matches(serial))
            .cloned()
    }

    fn search_subject(&mut self, subject_dn: &str) {
        self.subject_cursor = self
            .active_store()
            .filter(|cert| cert.subject_dn() == subject_dn)
            .cloned()
            .collect();
        self.subject_cursor.reverse();
    }

    fn next_subject_match(&mut self) -> Option<Certificate> {
        self.subject_cursor.pop()
    }

    fn set_ephemeral(&mut self, ephemeral: bool) -> bool {
        let prior = self.ephemeral_active;
        self.ephemeral_active = ephemeral;
        prior
    }

    fn store_cert(&mut self, cert: Certificate, ephemeral: bool) {
        if ephemeral {
            self.ephemeral_store.push(cert);
        } else {
            self.main.push(cert);
        }
    }

    fn set_cert_flags(&mut self, cert: &Certificate, _slot: FlagSlot, mask: u32, value: u32) {
        let entry = self.flags.entry(cert.fingerprint().0).or_insert(0);
        *entry = (*entry & !mask) | (value & mask);
    }
}
