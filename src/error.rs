//! Error and verdict types for the chain-validation engine.
//!
//! `ChainError` covers the fatal class only. Soft errors are
//! accumulated as flags on the walk state and folded into a `Verdict` at
//! the end of the walk; recoverable conditions never escape as errors at
//! all (they are handled locally by the component that encounters them).

use std::fmt;

/// A fatal validation failure. Returned immediately; the walk does not
/// continue once one of these is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The certificate itself is malformed, unparseable, or has an empty
    /// issuer DN.
    BadCert,
    /// A certificate elsewhere in the chain is malformed or the chain
    /// could not be completed (bad signature with no viable retry, depth
    /// exceeded, etc).
    BadCertChain,
    /// An issuer candidate failed the CA-authority gate.
    BadCaCert,
    /// A certificate carries a critical extension outside the known set.
    UnsupportedCert,
    /// `now < not_before` for some visited certificate.
    CertTooYoung,
    /// The issuer resolver could not locate an issuer certificate.
    MissingCert,
    /// The policy file is malformed, or a policy line has an empty OID
    /// token.
    Configuration,
    /// A policy-file line exceeds 255 characters.
    LineTooLong,
    /// The policy file's final line has no trailing newline.
    IncompleteLine,
    /// An external collaborator (trust agent, revocation responder,
    /// directory, qualified-list) returned something other than the
    /// results this engine knows how to interpret.
    Collaborator(String),
    /// A root certificate was not trusted and the interactive prompt (if
    /// attempted) did not result in it being marked trusted.
    NotTrusted,
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::BadCert => write!(f, "bad certificate"),
            ChainError::BadCertChain => write!(f, "bad certificate chain"),
            ChainError::BadCaCert => write!(f, "bad CA certificate"),
            ChainError::UnsupportedCert => write!(f, "unsupported certificate"),
            ChainError::CertTooYoung => write!(f, "certificate not yet valid"),
            ChainError::MissingCert => write!(f, "issuer certificate not found"),
            ChainError::Configuration => write!(f, "configuration error"),
            ChainError::LineTooLong => write!(f, "policy file line too long"),
            ChainError::IncompleteLine => write!(f, "policy file missing final newline"),
            ChainError::Collaborator(msg) => write!(f, "collaborator error: {}", msg),
            ChainError::NotTrusted => write!(f, "root certificate is not marked trusted"),
        }
    }
}

impl std::error::Error for ChainError {}

/// Soft errors, in descending priority. The walk keeps going when one
/// of these is hit; the highest-priority flag set at the end of a
/// successful walk becomes the terminal verdict.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SoftFlags {
    pub any_revoked: bool,
    pub any_expired: bool,
    pub any_no_crl: bool,
    pub any_crl_too_old: bool,
    pub any_no_policy_match: bool,
}

impl SoftFlags {
    /// Fold the accumulated flags into a single verdict, in priority
    /// order: revoked > expired > no-crl > crl-too-old > no-policy-match
    /// > success.
    pub fn resolve(&self) -> Verdict {
        if self.any_revoked {
            Verdict::CertRevoked
        } else if self.any_expired {
            Verdict::CertExpired
        } else if self.any_no_crl {
            Verdict::NoCrlKnown
        } else if self.any_crl_too_old {
            Verdict::CrlTooOld
        } else if self.any_no_policy_match {
            Verdict::NoPolicyMatch
        } else {
            Verdict::Good
        }
    }
}

/// The terminal outcome of a successful (non-fatally-erroring) chain
/// walk. `Good` is the only variant that does not correspond to one of
/// the soft-error flags above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Good,
    CertRevoked,
    CertExpired,
    NoCrlKnown,
    CrlTooOld,
    NoPolicyMatch,
}

impl Verdict {
    pub fn is_good(&self) -> bool {
        matches!(self, Verdict::Good)
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;
