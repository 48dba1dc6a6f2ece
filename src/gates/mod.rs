//! The four per-node/per-edge gates consulted by the chain walker:
//! critical-extension comprehension, CA authority, issuer policy, and
//! revocation.

pub mod ca_authority;
pub mod critical_ext;
pub mod policy;
pub mod revocation;

/// Remaining path length permitted below a CA certificate. `None`
/// means "unlimited" (no pathLenConstraint present).
pub type PathLen = Option<u32>;
