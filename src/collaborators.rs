//! External collaborators: the trust agent, revocation responder,
//! directory lookup, and qualified-list services this engine consults
//! but does not implement. Each is a trait seam, so the engine is
//! generic over crypto, network, and storage backends rather than
//! hardcoding any one of them.

use crate::cert::Certificate;

/// Flags attached to a trusted root. At minimum exposes `relax`, which
/// suppresses the CA-authority gate and the trusted-root revocation
/// check for this particular root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RootCaFlags {
    pub relax: bool,
}

/// Outcome of `TrustAgent::is_trusted`.
#[derive(Debug, Clone)]
pub enum TrustCheck {
    Trusted(RootCaFlags),
    NotTrusted(RootCaFlags),
}

/// Outcome of `TrustAgent::mark_trusted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkTrustedResult {
    Ok,
    NotSupported,
    Canceled,
    Other(String),
}

impl Default for MarkTrustedResult {
    fn default() -> Self {
        MarkTrustedResult::Ok
    }
}

/// Queries and updates the embedder's trust list for root certificates.
pub trait TrustAgent {
    fn is_trusted(&self, root: &Certificate) -> TrustCheck;
    fn mark_trusted(&self, root: &Certificate) -> MarkTrustedResult;
}

/// Outcome of `RevocationResponder::is_valid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevocationCheck {
    Ok,
    CertRevoked,
    NoCrlKnown,
    CrlTooOld,
    Other(String),
}

/// Asks whether a (subject, issuer) edge is revoked, optionally via
/// OCSP.
pub trait RevocationResponder {
    fn is_valid(&self, subject: &Certificate, issuer: &Certificate, use_ocsp: bool)
        -> RevocationCheck;
}

/// Looks a certificate up in an external directory. Results are
/// delivered one certificate at a time to the callback rather than
/// returning a `Vec` up front.
pub trait DirectoryLookup {
    fn lookup(&self, pattern: &str, on_result: &mut dyn FnMut(Certificate));
}

/// Outcome of `QualifiedList::is_in_qualified_list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualifiedListCheck {
    /// Found; carries the 2-letter ISO country code.
    Found(String),
    NotFound,
    Other(String),
}

/// Checks whether a root certificate is listed as issuing
/// qualified signatures.
pub trait QualifiedList {
    fn is_in_qualified_list(&self, cert: &Certificate) -> QualifiedListCheck;
}

/// Bundles the four collaborators a chain walk needs, so `ChainWalker`
/// takes one argument instead of four.
pub struct Collaborators<'a> {
    pub trust_agent: &'a dyn TrustAgent,
    pub revocation: &'a dyn RevocationResponder,
    pub directory: &'a dyn DirectoryLookup,
    pub qualified_list: &'a dyn QualifiedList,
}
