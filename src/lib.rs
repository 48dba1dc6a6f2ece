//! X.509 certificate chain-validation engine for an S/MIME agent.
//!
//! Given a leaf certificate, [`walker::validate_chain`] walks upward
//! through issuer certificates to a trust anchor, checking signatures,
//! validity windows, CA authority, critical-extension comprehension,
//! issuer policy, and revocation status at every hop. [`walker::basic_check`]
//! is a single-hop sibling for callers that already trust the
//! surrounding chain.
//!
//! The engine does not implement certificate storage, revocation
//! transport, or interactive trust prompting itself — those are
//! external collaborators, expressed as traits in [`collaborators`] and
//! [`keydb`] that an embedder implements.

pub mod cert;
pub mod clock;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod find_up;
pub mod gates;
pub mod keydb;
pub mod oid;
pub mod qualified;
pub mod regtp;
pub mod session;
pub mod status;
#[cfg(test)]
pub(crate) mod test_support;
pub mod walker;

pub use cert::{Certificate, Fingerprint, UserDataCache};
pub use clock::{Clock, SystemClock};
pub use collaborators::{Collaborators, DirectoryLookup, QualifiedList, RevocationResponder, TrustAgent};
pub use config::{CallFlags, EngineConfig};
pub use error::{ChainError, Result, Verdict};
pub use keydb::KeyDatabase;
pub use session::SessionState;
pub use status::{NullStatusSink, StatusSink};
pub use walker::{basic_check, validate_chain, ChainWalkOutcome};
