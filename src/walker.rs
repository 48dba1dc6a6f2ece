//! The chain walker and the single-hop basic checker.
//!
//! `validate_chain` is the top-level state machine: it drives the
//! issuer resolver for each upward step, the per-node critical-
//! extension/CA-authority/policy gates and the per-edge revocation
//! gate, and consults the already-asked cache, the qualified-signature
//! classifier, and the RegTP classifier on the root.

use std::fmt::Write as _;

use crate::cert::{Certificate, UserDataCache};
use crate::clock::Clock;
use crate::collaborators::{Collaborators, MarkTrustedResult, RootCaFlags, TrustCheck};
use crate::config::{CallFlags, EngineConfig};
use crate::error::{ChainError, Result, SoftFlags, Verdict};
use crate::find_up::find_up;
use crate::gates::policy::PolicyOutcome;
use crate::gates::{ca_authority, critical_ext, policy, revocation};
use crate::keydb::KeyDatabase;
use crate::qualified;
use crate::session::SessionState;
use crate::status::StatusSink;

/// The chain walk never visits more than this many issuer hops above
/// the leaf.
const MAXDEPTH: u32 = 50;

/// Cap on the "try another issuer with the same DN" retry during
/// signature verification, so a pathological key store with many
/// same-subject certificates can't loop indefinitely.
const MAX_SIGNATURE_RETRY: u32 = 4;

/// The result of a completed chain walk: a terminal verdict (or fatal
/// error) plus the earliest `not_after` observed across every visited
/// node, if any node was visited at all.
#[derive(Debug, Clone)]
pub struct ChainWalkOutcome {
    pub result: Result<Verdict>,
    pub exptime: Option<i64>,
}

fn diag(list_sink: &mut Option<&mut dyn std::fmt::Write>, list_mode: bool, message: &str) {
    if list_mode {
        if let Some(sink) = list_sink {
            let _ = writeln!(sink, "[{}]", message);
        }
    } else {
        log::warn!("{}", message);
    }
}

/// Walk from `leaf` upward to a trust anchor.
///
/// `directory` is consulted by `find_up` only when
/// `config.auto_issuer_key_retrieve` is set; passing `None` here always
/// disables it regardless of that switch, so callers normally pass
/// `Some(collaborators.directory)`.
#[allow(clippy::too_many_arguments)]
pub fn validate_chain(
    leaf: &Certificate,
    keydb: &mut dyn KeyDatabase,
    collaborators: &Collaborators<'_>,
    session: &SessionState,
    cache: &UserDataCache,
    config: &EngineConfig,
    clock: &dyn Clock,
    call_flags: CallFlags,
    status_sink: &mut dyn StatusSink,
    mut list_sink: Option<&mut dyn std::fmt::Write>,
) -> ChainWalkOutcome {
    let leaf_fp = leaf.fingerprint();
    let list_mode = call_flags.list_mode;

    if config.no_chain_validation && !list_mode {
        log::warn!("bypassing certificate chain validation");
        return ChainWalkOutcome {
            result: Ok(Verdict::Good),
            exptime: None,
        };
    }

    let directory = if config.auto_issuer_key_retrieve {
        Some(collaborators.directory)
    } else {
        None
    };

    let now = clock.now();
    let mut subject_cert = leaf.clone();
    let mut depth: u32 = 0;
    let mut exptime: Option<i64> = None;
    let mut soft = SoftFlags::default();
    let mut is_qualified: Option<bool> = None;

    let result: Result<Verdict> = loop {
        let issuer_dn = subject_cert.issuer_dn();
        let subject_dn = subject_cert.subject_dn();
        if issuer_dn.is_empty() {
            diag(&mut list_sink, list_mode, "no issuer found in certificate");
            break Err(ChainError::BadCert);
        }

        // Self-issued iff issuer DN == subject DN.
        let is_root = issuer_dn == subject_dn;

        // Eagerly query trust for a root so the checks below can see
        // `rootca_flags.relax`.
        let root_trust: Option<TrustCheck> = if is_root {
            Some(collaborators.trust_agent.is_trusted(&subject_cert))
        } else {
            None
        };
        let rootca_flags = match &root_trust {
            Some(TrustCheck::Trusted(f)) | Some(TrustCheck::NotTrusted(f)) => *f,
            None => RootCaFlags::default(),
        };

        // Validity window.
        let (not_before, not_after) = subject_cert.validity();
        exptime = Some(match exptime {
            None => not_after,
            Some(current) => current.min(not_after),
        });
        if now < not_before {
            diag(&mut list_sink, list_mode, "certificate not yet valid");
            break Err(ChainError::CertTooYoung);
        }
        if now > not_after {
            if config.ignore_expiration {
                log::warn!("ignoring expiration");
            } else {
                diag(&mut list_sink, list_mode, "certificate has expired");
                soft.any_expired = true;
            }
        }

        // Critical-extension gate.
        if let Err(e) = critical_ext::check(&subject_cert) {
            diag(&mut list_sink, list_mode, "unsupported critical extension");
            break Err(e);
        }

        // Policy gate.
        if !config.no_policy_check {
            match policy::check(&subject_cert, config.policy_file.as_deref()) {
                Ok(PolicyOutcome::Ok) => {}
                Ok(PolicyOutcome::NoPolicyMatch) => {
                    diag(&mut list_sink, list_mode, "policy not allowed");
                    soft.any_no_policy_match = true;
                }
                Err(e) => break Err(e),
            }
        }

        if is_root {
            let trust_check = root_trust.expect("root_trust is Some when is_root");
            let already_trusted = matches!(trust_check, TrustCheck::Trusted(_));

            if !already_trusted {
                // Only checked here, not when already trusted, for
                // better diagnostics on the common untrusted-root path.
                match subject_cert.verify_signed_by(&subject_cert) {
                    Ok(true) => {}
                    _ => {
                        diag(
                            &mut list_sink,
                            list_mode,
                            "self-signed certificate has a BAD signature",
                        );
                        break Err(if depth == 0 {
                            ChainError::BadCert
                        } else {
                            ChainError::BadCertChain
                        });
                    }
                }
            }

            if !rootca_flags.relax {
                if let Err(e) =
                    ca_authority::check(&subject_cert, keydb, collaborators.qualified_list, cache)
                {
                    break Err(e);
                }
            }

            if is_qualified.is_none() {
                is_qualified = qualified::classify(
                    leaf_fp,
                    &subject_cert,
                    cache,
                    collaborators.qualified_list,
                );
            }

            let mut trusted_after_prompt = already_trusted;
            if !already_trusted {
                diag(
                    &mut list_sink,
                    list_mode,
                    "root certificate is not marked trusted",
                );
                let fp = subject_cert.fingerprint();
                // Consulted unconditionally, not only in list mode: a
                // repeat prompt for the same root should be suppressed
                // on every call path once the user has answered once
                // (see DESIGN.md).
                let should_prompt = !soft.any_expired && !session.was_asked(&fp);
                if should_prompt {
                    if session.questions_disabled() {
                        log::info!("interactive marking as trusted not enabled");
                    } else {
                        log::info!("fingerprint={}", fp);
                        // `mark_asked` is skipped for NotSupported/Canceled:
                        // the global latch already suppresses further
                        // prompts for the rest of the session, so there's
                        // no need to also remember this one fingerprint.
                        match collaborators.trust_agent.mark_trusted(&subject_cert) {
                            MarkTrustedResult::Ok => {
                                log::info!(
                                    "root certificate has now been marked as trusted"
                                );
                                trusted_after_prompt = true;
                                session.mark_asked(fp);
                            }
                            MarkTrustedResult::NotSupported => {
                                log::info!(
                                    "interactive marking as trusted not enabled in gpg-agent"
                                );
                                session.disable_further_questions();
                            }
                            MarkTrustedResult::Canceled => {
                                log::info!(
                                    "interactive marking as trusted disabled for this session"
                                );
                                session.disable_further_questions();
                            }
                            MarkTrustedResult::Other(msg) => {
                                log::error!("checking the trust list failed: {}", msg);
                                session.mark_asked(fp);
                            }
                        }
                    }
                }
            }

            if !trusted_after_prompt {
                break Err(ChainError::NotTrusted);
            }

            // Revocation on the root itself. This duplicates the
            // edge-level check done for a root reached via the
            // relax-rescue branch below; preserved verbatim rather
            // than silently deduplicated (see DESIGN.md).
            let skip_root_revocation = call_flags.skip_revocation
                || config.no_trusted_cert_crl_check
                || rootca_flags.relax;
            if !skip_root_revocation && revocation_globally_enabled(config, call_flags) {
                if let Err(e) = revocation::check(
                    &subject_cert,
                    &subject_cert,
                    call_flags.use_ocsp,
                    collaborators.revocation,
                    keydb,
                    &mut soft,
                ) {
                    break Err(e);
                }
            }

            break Ok(soft.resolve());
        }

        // Advance depth, resolve the issuer.
        depth += 1;
        if depth > MAXDEPTH {
            diag(&mut list_sink, list_mode, "certificate chain too long");
            break Err(ChainError::BadCertChain);
        }

        keydb.reset();
        let Some(mut issuer_cert) = find_up(&subject_cert, keydb, directory, false) else {
            diag(&mut list_sink, list_mode, "issuer certificate not found");
            break Err(ChainError::MissingCert);
        };

        // Signature check, with the DN-reuse retry.
        let no_aki_keyid = subject_cert
            .authority_key_id()
            .map(|aki| aki.key_identifier.is_none())
            .unwrap_or(true);

        let mut retries = 0;
        let signature_ok = loop {
            match subject_cert.verify_signed_by(&issuer_cert) {
                Ok(true) => break true,
                _ => {
                    if no_aki_keyid && retries < MAX_SIGNATURE_RETRY {
                        retries += 1;
                        match find_up(&subject_cert, keydb, None, true) {
                            Some(candidate) if candidate.image() != issuer_cert.image() => {
                                diag(
                                    &mut list_sink,
                                    list_mode,
                                    "found another possible matching CA certificate - trying again",
                                );
                                issuer_cert = candidate;
                                continue;
                            }
                            _ => break false,
                        }
                    } else {
                        break false;
                    }
                }
            }
        };
        if !signature_ok {
            diag(&mut list_sink, list_mode, "certificate has a BAD signature");
            break Err(ChainError::BadCertChain);
        }

        // CA-authority gate on the issuer, with the root/relax rescue.
        let mut issuer_is_root = false;
        let mut issuer_rootca_flags = RootCaFlags::default();
        let chainlen = match ca_authority::check(
            &issuer_cert,
            keydb,
            collaborators.qualified_list,
            cache,
        ) {
            Ok(chainlen) => chainlen,
            Err(e) => {
                if issuer_cert.is_root() {
                    issuer_is_root = true;
                    match collaborators.trust_agent.is_trusted(&issuer_cert) {
                        TrustCheck::Trusted(flags) if flags.relax => {
                            issuer_rootca_flags = flags;
                            None // unlimited
                        }
                        TrustCheck::Trusted(flags) => {
                            issuer_rootca_flags = flags;
                            break Err(e);
                        }
                        TrustCheck::NotTrusted(flags) => {
                            issuer_rootca_flags = flags;
                            break Err(e);
                        }
                    }
                } else {
                    break Err(e);
                }
            }
        };
        if let Some(limit) = chainlen {
            if (depth - 1) > limit {
                diag(
                    &mut list_sink,
                    list_mode,
                    "certificate chain longer than allowed by CA",
                );
                break Err(ChainError::BadCertChain);
            }
        }

        // Key-usage check.
        if !list_mode && !issuer_cert.key_usage_key_cert_sign() {
            status_sink.emit(
                "STATUS_ERROR",
                "certcert.issuer.keyusage",
                "BAD_CERT_CHAIN",
            );
            break Err(ChainError::BadCertChain);
        }

        // Revocation gate on the (subject, issuer) edge.
        let skip_edge_revocation = call_flags.skip_revocation
            || (issuer_is_root
                && (config.no_trusted_cert_crl_check || issuer_rootca_flags.relax));
        if !skip_edge_revocation && revocation_globally_enabled(config, call_flags) {
            if let Err(e) = revocation::check(
                &subject_cert,
                &issuer_cert,
                call_flags.use_ocsp,
                collaborators.revocation,
                keydb,
                &mut soft,
            ) {
                break Err(e);
            }
        }

        if !list_mode {
            log::debug!("certificate is good");
        }

        // Advance to the issuer for the next iteration.
        keydb.reset();
        subject_cert = issuer_cert;
    };

    // Only logged on a normal (possibly soft-flagged) completion through
    // the root branch — a fatal early exit skips this.
    if result.is_ok() && !list_mode {
        if config.no_policy_check {
            log::info!("policies not checked due to the no-policy-check option");
        }
        if config.no_crl_check && !call_flags.use_ocsp {
            log::info!("CRLs not checked due to the no-crl-check option");
        }
    }

    // Qualified-signature persistence: written on every exit path, not
    // only success.
    if let Some(value) = is_qualified {
        cache.set_is_qualified(leaf_fp, value);
    }

    ChainWalkOutcome { result, exptime }
}

fn revocation_globally_enabled(config: &EngineConfig, call_flags: CallFlags) -> bool {
    !config.no_crl_check || call_flags.use_ocsp
}

/// A single-hop sibling of `validate_chain` for callers that already
/// trust the surrounding chain. No validity, policy, CA, or revocation
/// checks are performed.
pub fn basic_check(
    cert: &Certificate,
    keydb: &mut dyn KeyDatabase,
    config: &EngineConfig,
) -> Result<()> {
    if config.no_chain_validation {
        log::warn!("bypassing basic certificate checks");
        return Ok(());
    }

    let issuer_dn = cert.issuer_dn();
    let subject_dn = cert.subject_dn();
    if issuer_dn.is_empty() {
        return Err(ChainError::BadCert);
    }

    if issuer_dn == subject_dn {
        match cert.verify_signed_by(cert) {
            Ok(true) => Ok(()),
            _ => Err(ChainError::BadCert),
        }
    } else {
        keydb.reset();
        let Some(issuer_cert) = find_up(cert, keydb, None, false) else {
            return Err(ChainError::MissingCert);
        };
        match cert.verify_signed_by(&issuer_cert) {
            Ok(true) => {
                log::debug!("certificate is good");
                Ok(())
            }
            _ => Err(ChainError::BadCert),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::collaborators::memory::{
        MemoryDirectory, MemoryQualifiedList, MemoryRevocationResponder, MemoryTrustAgent,
    };
    use crate::collaborators::RevocationCheck;
    use crate::keydb::MemoryKeyDb;
    use crate::status::NullStatusSink;
    use crate::test_support::{make_issued, make_root};

    struct Fixture {
        trust_agent: MemoryTrustAgent,
        revocation: MemoryRevocationResponder,
        directory: MemoryDirectory,
        qualified_list: MemoryQualifiedList,
        session: SessionState,
        cache: UserDataCache,
        config: EngineConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                trust_agent: MemoryTrustAgent::new(),
                revocation: MemoryRevocationResponder::new(),
                directory: MemoryDirectory::default(),
                qualified_list: MemoryQualifiedList::new(),
                session: SessionState::new(),
                cache: UserDataCache::new(),
                config: EngineConfig::default(),
            }
        }

        fn collaborators(&self) -> Collaborators<'_> {
            Collaborators {
                trust_agent: &self.trust_agent,
                revocation: &self.revocation,
                directory: &self.directory,
                qualified_list: &self.qualified_list,
            }
        }
    }

    fn now_covering(not_before: i64, not_after: i64) -> i64 {
        not_before + (not_after - not_before) / 2
    }

    #[test]
    fn happy_path_chain_succeeds_and_exptime_is_the_minimum() {
        let root = make_root("CN=Walker Happy Root");
        let ca = make_issued("CN=Walker Happy CA", Some(None), &root);
        let leaf = make_issued("CN=Walker Happy Leaf", None, &ca);

        let fixture = Fixture::new();
        fixture.trust_agent.trust(&root.certificate, RootCaFlags::default());

        let mut db = MemoryKeyDb::with_main_certs(vec![
            root.certificate.clone(),
            ca.certificate.clone(),
        ]);

        let (_, not_after) = leaf.certificate.validity();
        let clock = FixedClock(now_covering(
            leaf.certificate.validity().0,
            not_after,
        ));

        let outcome = validate_chain(
            &leaf.certificate,
            &mut db,
            &fixture.collaborators(),
            &fixture.session,
            &fixture.cache,
            &fixture.config,
            &clock,
            CallFlags::default(),
            &mut NullStatusSink,
            None,
        );

        assert_eq!(outcome.result, Ok(Verdict::Good));
        let min_not_after = [
            leaf.certificate.validity().1,
            ca.certificate.validity().1,
            root.certificate.validity().1,
        ]
        .into_iter()
        .min()
        .unwrap();
        assert_eq!(outcome.exptime, Some(min_not_after));
    }

    #[test]
    fn expired_leaf_yields_cert_expired_verdict() {
        let root = make_root("CN=Walker Expired Root");
        let leaf = make_issued("CN=Walker Expired Leaf", None, &root);
        let fixture = Fixture::new();
        fixture.trust_agent.trust(&root.certificate, RootCaFlags::default());
        let mut db = MemoryKeyDb::with_main_certs(vec![root.certificate.clone()]);

        let (_, not_after) = leaf.certificate.validity();
        let clock = FixedClock(not_after + 10_000);

        let outcome = validate_chain(
            &leaf.certificate,
            &mut db,
            &fixture.collaborators(),
            &fixture.session,
            &fixture.cache,
            &fixture.config,
            &clock,
            CallFlags::default(),
            &mut NullStatusSink,
            None,
        );

        assert_eq!(outcome.result, Ok(Verdict::CertExpired));
    }

    #[test]
    fn revoked_intermediate_yields_cert_revoked_and_persists_flag() {
        let root = make_root("CN=Walker Revoked Root");
        let ca = make_issued("CN=Walker Revoked CA", Some(None), &root);
        let leaf = make_issued("CN=Walker Revoked Leaf", None, &ca);

        let fixture = Fixture::new();
        fixture.trust_agent.trust(&root.certificate, RootCaFlags::default());
        fixture
            .revocation
            .set(&ca.certificate, &root.certificate, RevocationCheck::CertRevoked);

        let mut db = MemoryKeyDb::with_main_certs(vec![
            root.certificate.clone(),
            ca.certificate.clone(),
        ]);
        let clock = FixedClock(now_covering(leaf.certificate.validity().0, leaf.certificate.validity().1));

        let outcome = validate_chain(
            &leaf.certificate,
            &mut db,
            &fixture.collaborators(),
            &fixture.session,
            &fixture.cache,
            &fixture.config,
            &clock,
            CallFlags::default(),
            &mut NullStatusSink,
            None,
        );

        assert_eq!(outcome.result, Ok(Verdict::CertRevoked));
        assert_eq!(
            db.flags_for(&ca.certificate) & crate::keydb::VALIDITY_REVOKED,
            crate::keydb::VALIDITY_REVOKED
        );
    }

    #[test]
    fn untrusted_root_accepted_via_prompt_then_skips_prompt_next_time() {
        let root = make_root("CN=Walker Prompt Root");
        let leaf = make_issued("CN=Walker Prompt Leaf", None, &root);

        let fixture = Fixture::new();
        // trust_agent starts with `root` untrusted; mark_trusted succeeds
        // by default (MarkTrustedResult::Ok).
        let mut db = MemoryKeyDb::with_main_certs(vec![root.certificate.clone()]);
        let clock = FixedClock(now_covering(leaf.certificate.validity().0, leaf.certificate.validity().1));

        let outcome = validate_chain(
            &leaf.certificate,
            &mut db,
            &fixture.collaborators(),
            &fixture.session,
            &fixture.cache,
            &fixture.config,
            &clock,
            CallFlags::default(),
            &mut NullStatusSink,
            None,
        );
        assert_eq!(outcome.result, Ok(Verdict::Good));
        assert!(fixture.session.was_asked(&root.certificate.fingerprint()));
    }

    #[test]
    fn untrusted_root_with_prompting_disabled_stays_not_trusted() {
        let root = make_root("CN=Walker Declined Root");
        let fixture = Fixture::new();
        fixture.trust_agent.mark_trusted_result.replace(MarkTrustedResult::Canceled);
        let mut db = MemoryKeyDb::new();
        let clock = FixedClock(now_covering(
            root.certificate.validity().0,
            root.certificate.validity().1,
        ));

        let outcome = validate_chain(
            &root.certificate,
            &mut db,
            &fixture.collaborators(),
            &fixture.session,
            &fixture.cache,
            &fixture.config,
            &clock,
            CallFlags::default(),
            &mut NullStatusSink,
            None,
        );
        assert_eq!(outcome.result, Err(ChainError::NotTrusted));
        // the latch now disables any further interactive prompt this session
        assert!(fixture.session.questions_disabled());
    }

    #[test]
    fn unknown_critical_extension_fails_the_walk() {
        let root = make_root("CN=Walker Critical Root");
        let leaf = crate::test_support::make_issued_with_unknown_critical_ext(
            "CN=Walker Critical Leaf",
            &root,
        );

        let fixture = Fixture::new();
        fixture.trust_agent.trust(&root.certificate, RootCaFlags::default());
        let mut db = MemoryKeyDb::with_main_certs(vec![root.certificate.clone()]);
        let clock = FixedClock(now_covering(
            leaf.certificate.validity().0,
            leaf.certificate.validity().1,
        ));

        let outcome = validate_chain(
            &leaf.certificate,
            &mut db,
            &fixture.collaborators(),
            &fixture.session,
            &fixture.cache,
            &fixture.config,
            &clock,
            CallFlags::default(),
            &mut NullStatusSink,
            None,
        );
        assert_eq!(outcome.result, Err(ChainError::UnsupportedCert));
    }

    #[test]
    fn basic_check_self_signed_root_succeeds() {
        let root = make_root("CN=Basic Check Root");
        let config = EngineConfig::default();
        let mut db = MemoryKeyDb::new();
        assert!(basic_check(&root.certificate, &mut db, &config).is_ok());
    }

    #[test]
    fn basic_check_resolves_issuer_and_verifies_signature() {
        let root = make_root("CN=Basic Check Issuer Root");
        let leaf = make_issued("CN=Basic Check Leaf", None, &root);
        let config = EngineConfig::default();
        let mut db = MemoryKeyDb::with_main_certs(vec![root.certificate.clone()]);
        assert!(basic_check(&leaf.certificate, &mut db, &config).is_ok());
    }

    #[test]
    fn basic_check_missing_issuer_fails() {
        let root = make_root("CN=Basic Check Missing Root");
        let leaf = make_issued("CN=Basic Check Missing Leaf", None, &root);
        let config = EngineConfig::default();
        let mut db = MemoryKeyDb::new();
        assert_eq!(
            basic_check(&leaf.certificate, &mut db, &config),
            Err(ChainError::MissingCert)
        );
    }

    /// Build a chain of `count` intermediate CAs above `issuer`, each
    /// signed by the previous, returning every certificate (root-to-leaf
    /// order is not preserved; order is issuance order, root excluded).
    fn build_ca_chain(
        root: &crate::test_support::TestCert,
        count: u32,
    ) -> Vec<crate::test_support::TestCert> {
        let mut cas: Vec<crate::test_support::TestCert> = Vec::new();
        for i in 0..count {
            let cn = format!("CN=Walker Deep CA {}", i);
            let issuer_ref = cas.last().unwrap_or(root);
            cas.push(make_issued(&cn, Some(None), issuer_ref));
        }
        cas
    }

    /// Records every `(subject, issuer)` fingerprint pair it's asked
    /// about, delegating the actual verdict to an inner responder. Used
    /// to confirm the root gets a revocation check both as the far end
    /// of the last edge and again as its own subject (see DESIGN.md,
    /// "Root revocation duplicate check").
    struct CountingRevocationResponder {
        inner: MemoryRevocationResponder,
        calls: std::cell::RefCell<Vec<(crate::cert::Fingerprint, crate::cert::Fingerprint)>>,
    }

    impl CountingRevocationResponder {
        fn new() -> Self {
            CountingRevocationResponder {
                inner: MemoryRevocationResponder::new(),
                calls: std::cell::RefCell::new(Vec::new()),
            }
        }
    }

    impl crate::collaborators::RevocationResponder for CountingRevocationResponder {
        fn is_valid(
            &self,
            subject: &Certificate,
            issuer: &Certificate,
            use_ocsp: bool,
        ) -> crate::collaborators::RevocationCheck {
            self.calls
                .borrow_mut()
                .push((subject.fingerprint(), issuer.fingerprint()));
            self.inner.is_valid(subject, issuer, use_ocsp)
        }
    }

    #[test]
    fn duplicate_root_revocation_check_is_preserved() {
        let root = make_root("CN=Walker Duplicate Revocation Root");
        let leaf = make_issued("CN=Walker Duplicate Revocation Leaf", None, &root);

        let trust_agent = MemoryTrustAgent::new();
        trust_agent.trust(&root.certificate, RootCaFlags::default());
        let responder = CountingRevocationResponder::new();
        let directory = MemoryDirectory::default();
        let qualified_list = MemoryQualifiedList::new();
        let session = SessionState::new();
        let cache = UserDataCache::new();
        let config = EngineConfig::default();

        let collaborators = Collaborators {
            trust_agent: &trust_agent,
            revocation: &responder,
            directory: &directory,
            qualified_list: &qualified_list,
        };

        let mut db = MemoryKeyDb::with_main_certs(vec![root.certificate.clone()]);
        let clock = FixedClock(now_covering(
            leaf.certificate.validity().0,
            leaf.certificate.validity().1,
        ));

        let outcome = validate_chain(
            &leaf.certificate,
            &mut db,
            &collaborators,
            &session,
            &cache,
            &config,
            &clock,
            CallFlags::default(),
            &mut NullStatusSink,
            None,
        );
        assert_eq!(outcome.result, Ok(Verdict::Good));

        // Checked once as the (leaf, root) edge and once more as the
        // root's own (root, root) self-revocation check — the spec's
        // documented, not-yet-deduplicated double check.
        let leaf_fp = leaf.certificate.fingerprint();
        let root_fp = root.certificate.fingerprint();
        let calls = responder.calls.borrow();
        assert!(calls.contains(&(leaf_fp, root_fp)));
        assert!(calls.contains(&(root_fp, root_fp)));
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn chain_of_maxdepth_exactly_succeeds_then_one_more_fails() {
        let root = make_root("CN=Walker Deep Root");
        // depth counts hops above the leaf; leaf -> CA* -> root means
        // MAXDEPTH intermediate CAs puts the root exactly at MAXDEPTH.
        let cas = build_ca_chain(&root, MAXDEPTH - 1);
        let leaf = make_issued("CN=Walker Deep Leaf", None, cas.last().unwrap());

        let fixture = Fixture::new();
        fixture.trust_agent.trust(&root.certificate, RootCaFlags::default());
        let mut all_certs: Vec<Certificate> = vec![root.certificate.clone()];
        all_certs.extend(cas.iter().map(|c| c.certificate.clone()));
        let mut db = MemoryKeyDb::with_main_certs(all_certs.clone());
        let clock = FixedClock(now_covering(
            leaf.certificate.validity().0,
            leaf.certificate.validity().1,
        ));

        let outcome = validate_chain(
            &leaf.certificate,
            &mut db,
            &fixture.collaborators(),
            &fixture.session,
            &fixture.cache,
            &fixture.config,
            &clock,
            CallFlags::default(),
            &mut NullStatusSink,
            None,
        );
        assert_eq!(outcome.result, Ok(Verdict::Good));

        // One more hop (MAXDEPTH CAs instead of MAXDEPTH - 1) pushes
        // depth past the limit and fails.
        let cas_too_deep = build_ca_chain(&root, MAXDEPTH);
        let leaf_too_deep =
            make_issued("CN=Walker Too Deep Leaf", None, cas_too_deep.last().unwrap());
        let mut all_certs_too_deep: Vec<Certificate> = vec![root.certificate.clone()];
        all_certs_too_deep.extend(cas_too_deep.iter().map(|c| c.certificate.clone()));
        let mut db_too_deep = MemoryKeyDb::with_main_certs(all_certs_too_deep);
        let clock_too_deep = FixedClock(now_covering(
            leaf_too_deep.certificate.validity().0,
            leaf_too_deep.certificate.validity().1,
        ));
        let outcome_too_deep = validate_chain(
            &leaf_too_deep.certificate,
            &mut db_too_deep,
            &fixture.collaborators(),
            &fixture.session,
            &fixture.cache,
            &fixture.config,
            &clock_too_deep,
            CallFlags::default(),
            &mut NullStatusSink,
            None,
        );
        assert_eq!(outcome_too_deep.result, Err(ChainError::BadCertChain));
    }
}
