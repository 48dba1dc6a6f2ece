//! Certificate handle and the fingerprint-keyed user-data cache.
//!
//! Concrete backend: `x509-parser` over owned DER bytes. This type does
//! not leak the DER buffer for a `'static` borrow — it owns the bytes
//! and reparses on demand. `x509-parser`'s parse is cheap relative to
//! the IPC/disk calls elsewhere in this engine, so reparsing per
//! accessor call is not a hot-path concern.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use ring::digest;
use ring::signature::{self, UnparsedPublicKey};
use x509_parser::extensions::ParsedExtension;
use x509_parser::prelude::*;

use crate::error::{ChainError, Result};

/// SHA-1 over a certificate's DER image. Used purely as a stable cache
/// and set key — never as a security property of the signature itself,
/// hence `ring`'s explicitly-named `SHA1_FOR_LEGACY_USE_ONLY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub [u8; 20]);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

/// Authority Key Identifier: key identifier, issuer name, and issuer
/// serial, each independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorityKeyId {
    pub key_identifier: Option<Vec<u8>>,
    pub issuer_name: Option<String>,
    pub issuer_serial: Option<Vec<u8>>,
}

impl AuthorityKeyId {
    pub fn is_empty(&self) -> bool {
        self.key_identifier.is_none() && self.issuer_name.is_none() && self.issuer_serial.is_none()
    }
}

/// One entry of a certificatePolicies listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyEntry {
    pub oid: String,
    pub critical: bool,
}

/// One extension as exposed by the handle's extension iterator.
#[derive(Debug, Clone)]
pub struct ExtensionInfo {
    pub oid: String,
    pub critical: bool,
}

/// basicConstraints as read by the CA-authority gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicConstraints {
    pub is_ca: bool,
    /// `None` means "unlimited" (no pathLenConstraint present).
    pub path_len: Option<u32>,
}

/// Opaque certificate handle. Owns its DER image; all structured
/// accessors reparse on demand rather than retaining a borrowed
/// `X509Certificate<'_>`.
#[derive(Debug, Clone)]
pub struct Certificate {
    der: Vec<u8>,
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}
impl Eq for Certificate {}

impl Certificate {
    pub fn from_der(der: Vec<u8>) -> Result<Self> {
        X509Certificate::from_der(&der).map_err(|_| ChainError::BadCert)?;
        Ok(Certificate { der })
    }

    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self> {
        let (_, pem) = parse_x509_pem(pem_bytes).map_err(|_| ChainError::BadCert)?;
        Certificate::from_der(pem.contents)
    }

    fn parsed(&self) -> X509Certificate<'_> {
        // Already validated at construction time in `from_der`.
        X509Certificate::from_der(&self.der)
            .expect("Certificate::der was validated at construction")
            .1
    }

    /// Raw DER image, used for equality and as the fingerprint input.
    pub fn image(&self) -> &[u8] {
        &self.der
    }

    pub fn fingerprint(&self) -> Fingerprint {
        let digest = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, &self.der);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(digest.as_ref());
        Fingerprint(bytes)
    }

    pub fn subject_dn(&self) -> String {
        self.parsed().subject().to_string()
    }

    /// Raw serial number bytes, big-endian as encoded in the TBS
    /// structure.
    pub fn serial(&self) -> Vec<u8> {
        self.parsed().raw_serial().to_vec()
    }

    pub fn serial_matches(&self, serial: &[u8]) -> bool {
        self.serial() == serial
    }

    pub fn issuer_dn(&self) -> String {
        self.parsed().issuer().to_string()
    }

    /// A certificate is self-issued iff issuer DN == subject DN.
    pub fn is_root(&self) -> bool {
        let cert = self.parsed();
        cert.issuer() == cert.subject()
    }

    /// `(not_before, not_after)` as Unix timestamps.
    pub fn validity(&self) -> (i64, i64) {
        let v = self.parsed().validity().clone();
        (v.not_before.timestamp(), v.not_after.timestamp())
    }

    pub fn country(&self) -> Option<String> {
        let cert = self.parsed();
        for rdn in cert.subject().iter() {
            for attr in rdn.iter() {
                if attr.attr_type() == &oid_registry::OID_X509_COUNTRY_NAME {
                    if let Ok(s) = attr.attr_value().as_str() {
                        return Some(s.to_string());
                    }
                }
            }
        }
        None
    }

    pub fn authority_key_id(&self) -> Option<AuthorityKeyId> {
        let cert = self.parsed();
        let ext = cert
            .get_extension_unique(&oid_registry::OID_X509_EXT_AUTHORITY_KEY_IDENTIFIER)
            .ok()??;
        if let ParsedExtension::AuthorityKeyIdentifier(aki) = ext.parsed_extension() {
            let key_identifier = aki.key_identifier.as_ref().map(|k| k.0.to_vec());
            let issuer_name = aki.authority_cert_issuer.as_ref().and_then(|names| {
                names.iter().find_map(|name| match name {
                    GeneralName::DirectoryName(dn) => Some(dn.to_string()),
                    _ => None,
                })
            });
            let issuer_serial = aki
                .authority_cert_serial
                .as_ref()
                .map(|serial| serial.to_vec());
            Some(AuthorityKeyId {
                key_identifier,
                issuer_name,
                issuer_serial,
            })
        } else {
            None
        }
    }

    pub fn subject_key_id(&self) -> Option<Vec<u8>> {
        let cert = self.parsed();
        let ext = cert
            .get_extension_unique(&oid_registry::OID_X509_EXT_SUBJECT_KEY_IDENTIFIER)
            .ok()??;
        if let ParsedExtension::SubjectKeyIdentifier(ski) = ext.parsed_extension() {
            Some(ski.0.to_vec())
        } else {
            None
        }
    }

    /// Every extension present, as `(oid, critical)` pairs.
    pub fn extensions(&self) -> Vec<ExtensionInfo> {
        self.parsed()
            .extensions()
            .iter()
            .map(|ext| ExtensionInfo {
                oid: ext.oid.to_id_string(),
                critical: ext.critical,
            })
            .collect()
    }

    pub fn basic_constraints(&self) -> Option<BasicConstraints> {
        let cert = self.parsed();
        let ext = cert
            .get_extension_unique(&oid_registry::OID_X509_EXT_BASIC_CONSTRAINTS)
            .ok()??;
        if let ParsedExtension::BasicConstraints(bc) = ext.parsed_extension() {
            Some(BasicConstraints {
                is_ca: bc.ca,
                path_len: bc.path_len_constraint,
            })
        } else {
            None
        }
    }

    pub fn certificate_policies(&self) -> Vec<PolicyEntry> {
        let cert = self.parsed();
        let Ok(Some(ext)) =
            cert.get_extension_unique(&oid_registry::OID_X509_EXT_CERTIFICATE_POLICIES)
        else {
            return Vec::new();
        };
        let critical = ext.critical;
        if let ParsedExtension::CertificatePolicies(policies) = ext.parsed_extension() {
            policies
                .iter()
                .map(|p| PolicyEntry {
                    oid: p.policy_id.to_id_string(),
                    critical,
                })
                .collect()
        } else {
            Vec::new()
        }
    }

    pub fn key_usage_key_cert_sign(&self) -> bool {
        let cert = self.parsed();
        match cert.get_extension_unique(&oid_registry::OID_X509_EXT_KEY_USAGE) {
            Ok(Some(ext)) => {
                if let ParsedExtension::KeyUsage(ku) = ext.parsed_extension() {
                    ku.key_cert_sign()
                } else {
                    false
                }
            }
            // No KeyUsage extension present is conventionally permissive;
            // callers gate this behind the CA-authority check.
            Ok(None) => true,
            Err(_) => false,
        }
    }

    /// Verify this certificate's signature against a candidate issuer's
    /// public key. Tries RSA PKCS#1 v1.5 (SHA-256, then SHA-1 for legacy
    /// CAs) and ECDSA P-256/P-384, returning `Ok(true)` on the first
    /// algorithm that validates.
    pub fn verify_signed_by(&self, issuer: &Certificate) -> Result<bool> {
        let subject = self.parsed();
        let issuer_parsed = issuer.parsed();

        let spki = issuer_parsed.public_key().subject_public_key.data.clone();
        let signature = subject.signature_value.data.clone();
        let tbs = subject.tbs_certificate.as_ref();

        const ALGORITHMS: &[&dyn signature::VerificationAlgorithm] = &[
            &signature::RSA_PKCS1_2048_8192_SHA256,
            &signature::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY,
            &signature::ECDSA_P256_SHA256_ASN1,
            &signature::ECDSA_P384_SHA384_ASN1,
        ];

        for algorithm in ALGORITHMS {
            let key = UnparsedPublicKey::new(*algorithm, spki.as_ref());
            if key.verify(tbs, signature.as_ref()).is_ok() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Per-certificate user-data cache entries. Stored as a side-table
/// keyed by fingerprint rather than pointer-attached state, so the
/// cache survives certificate re-acquisition from the key database.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UserData {
    pub is_qualified: Option<bool>,
    /// `None` means "not RegTP"; `Some((1, pathlen))` flags a
    /// qualified-but-not-yet-root RegTP CA at the given chain depth.
    pub regtp_ca_chainlen: Option<(u8, u8)>,
}

/// The fingerprint-keyed side table itself.
#[derive(Debug, Default)]
pub struct UserDataCache {
    entries: Mutex<HashMap<Fingerprint, UserData>>,
}

impl UserDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fp: &Fingerprint) -> Option<UserData> {
        self.entries.lock().unwrap().get(fp).copied()
    }

    pub fn set_is_qualified(&self, fp: Fingerprint, value: bool) {
        let mut map = self.entries.lock().unwrap();
        map.entry(fp).or_default().is_qualified = Some(value);
    }

    pub fn set_regtp_ca_chainlen(&self, fp: Fingerprint, value: Option<(u8, u8)>) {
        let mut map = self.entries.lock().unwrap();
        map.entry(fp).or_default().regtp_ca_chainlen = value;
    }
}
