//! Session-scoped state: the "already asked" root cache and the
//! "no more questions" latch.
//!
//! Both are monotonic (grow-only / one-way), so concurrent writers only
//! ever race over idempotent updates, but they're still serialized
//! behind a mutex. Rather than process globals, both live behind an
//! explicit handle the caller owns and threads through
//! `validate_chain`/`basic_check`.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::cert::Fingerprint;

/// An explicit handle in place of file-scope statics, so multiple
/// validation sessions can run independently within one process.
#[derive(Debug, Default)]
pub struct SessionState {
    asked: Mutex<HashSet<Fingerprint>>,
    no_more_questions: Mutex<bool>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Has the user already been asked whether to trust the root with
    /// this fingerprint, this session?
    pub fn was_asked(&self, fp: &Fingerprint) -> bool {
        self.asked.lock().unwrap().contains(fp)
    }

    /// Idempotent: marking an already-marked fingerprint is a no-op.
    pub fn mark_asked(&self, fp: Fingerprint) {
        self.asked.lock().unwrap().insert(fp);
    }

    /// True once a prior prompt returned `NotSupported` or `Canceled`;
    /// disables further interactive trust prompts for the rest of the
    /// session.
    pub fn questions_disabled(&self) -> bool {
        *self.no_more_questions.lock().unwrap()
    }

    pub fn disable_further_questions(&self) {
        *self.no_more_questions.lock().unwrap() = true;
    }
}
