//! In-memory fixture certificate builder, used only by `#[cfg(test)]`
//! modules throughout the crate. Constructs fixture values inline in
//! test functions rather than checking in DER files.

use rcgen::{
    BasicConstraints, CertificateParams, CustomExtension, DistinguishedName, DnType, IsCa, KeyPair,
};

use crate::cert::Certificate;

/// A generated certificate plus the key pair and `rcgen` handle needed
/// to issue a further certificate signed by it.
pub struct TestCert {
    pub certificate: Certificate,
    pub key_pair: KeyPair,
    rcgen_cert: rcgen::Certificate,
}

fn dn(cn: &str) -> DistinguishedName {
    let mut name = DistinguishedName::new();
    name.push(DnType::CommonName, cn);
    name
}

/// A self-signed root or standalone certificate, CA-flagged.
pub fn make_root(cn: &str) -> TestCert {
    let key_pair = KeyPair::generate().expect("key generation");
    let mut params = CertificateParams::new(Vec::new()).expect("params");
    params.distinguished_name = dn(cn);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let rcgen_cert = params.self_signed(&key_pair).expect("self-sign");
    let certificate =
        Certificate::from_der(rcgen_cert.der().to_vec()).expect("valid self-signed DER");
    TestCert {
        certificate,
        key_pair,
        rcgen_cert,
    }
}

/// Convenience used where a test only needs the certificate, not the
/// signing key (e.g. trust-agent fixtures).
pub fn make_self_signed(cn: &str) -> Certificate {
    make_root(cn).certificate
}

/// A certificate issued by `issuer`. `is_ca` is `None` for an
/// end-entity leaf, `Some(path_len)` for a CA (pathLenConstraint
/// `None` meaning unconstrained).
pub fn make_issued(cn: &str, is_ca: Option<Option<u32>>, issuer: &TestCert) -> TestCert {
    let key_pair = KeyPair::generate().expect("key generation");
    let mut params = CertificateParams::new(Vec::new()).expect("params");
    params.distinguished_name = dn(cn);
    params.is_ca = match is_ca {
        None => IsCa::ExplicitNoCa,
        Some(None) => IsCa::Ca(BasicConstraints::Unconstrained),
        Some(Some(path_len)) => IsCa::Ca(BasicConstraints::Constrained(path_len as u8)),
    };

    let rcgen_cert = params
        .signed_by(&key_pair, &issuer.rcgen_cert, &issuer.key_pair)
        .expect("sign certificate");
    let certificate = Certificate::from_der(rcgen_cert.der().to_vec()).expect("valid DER");

    TestCert {
        certificate,
        key_pair,
        rcgen_cert,
    }
}

/// A leaf issued by `issuer` that additionally carries a critical
/// extension outside the engine's known-OID set (`2.5.29.30`, name
/// constraints), for exercising the critical-extension gate's rejection
/// path against a real, signed certificate rather than a bare assertion
/// that the fixture builder never sets one.
pub fn make_issued_with_unknown_critical_ext(cn: &str, issuer: &TestCert) -> TestCert {
    let key_pair = KeyPair::generate().expect("key generation");
    let mut params = CertificateParams::new(Vec::new()).expect("params");
    params.distinguished_name = dn(cn);
    params.is_ca = IsCa::ExplicitNoCa;
    let mut ext = CustomExtension::from_oid_content(&[2, 5, 29, 30], vec![0x05, 0x00]);
    ext.set_criticality(true);
    params.custom_extensions = vec![ext];

    let rcgen_cert = params
        .signed_by(&key_pair, &issuer.rcgen_cert, &issuer.key_pair)
        .expect("sign certificate");
    let certificate = Certificate::from_der(rcgen_cert.der().to_vec()).expect("valid DER");

    TestCert {
        certificate,
        key_pair,
        rcgen_cert,
    }
}
