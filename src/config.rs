//! Engine configuration.
//!
//! A plain, embedder-constructed struct, built directly in memory
//! rather than loaded from a file or environment — this crate treats
//! configuration loading as an external collaborator concern.

use std::path::PathBuf;

/// Global switches consumed by the chain walker.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Skip chain validation entirely outside list mode.
    pub no_chain_validation: bool,
    /// Skip the policy gate for every node.
    pub no_policy_check: bool,
    /// Disable CRL-backed revocation checking globally.
    pub no_crl_check: bool,
    /// Skip the revocation gate on trusted roots specifically.
    pub no_trusted_cert_crl_check: bool,
    /// Downgrade an expired certificate from a soft flag to a warning.
    pub ignore_expiration: bool,
    /// Allow the issuer resolver to query the external directory collaborator.
    pub auto_issuer_key_retrieve: bool,
    /// Path to the issuer-policy allowlist consumed by the policy gate.
    pub policy_file: Option<PathBuf>,
    /// Diagnostic verbosity; 0 is silent beyond warnings/errors.
    pub verbose: u8,
}

/// Per-call flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallFlags {
    /// Skip the revocation gate for this call entirely.
    pub skip_revocation: bool,
    /// Whether this call should use OCSP (passed through to the revocation gate).
    pub use_ocsp: bool,
    /// Render diagnostics as bracketed lines instead of through `log`.
    pub list_mode: bool,
}
