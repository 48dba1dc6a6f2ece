//! Policy gate: enforces an issuer-policy allowlist.
//!
//! A line-oriented format, re-opened and scanned fresh on every call
//! (no cross-call file-handle state), 255-byte line cap, `#`-comment
//! and blank-line skipping.

use std::path::Path;

use crate::cert::Certificate;
use crate::error::{ChainError, Result};

const MAX_LINE_LEN: usize = 255;

/// Outcome of a successful (non-fatal) policy check. `NoPolicyMatch` is
/// the soft-error signal the caller folds into `SoftFlags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyOutcome {
    Ok,
    NoPolicyMatch,
}

/// Enforce the configured issuer-policy allowlist against `cert`'s
/// certificatePolicies extension.
pub fn check(cert: &Certificate, policy_file: Option<&Path>) -> Result<PolicyOutcome> {
    let policies = cert.certificate_policies();
    if policies.is_empty() {
        return Ok(PolicyOutcome::Ok);
    }

    let any_critical = policies.iter().any(|p| p.critical);

    let contents = match policy_file.and_then(|path| std::fs::read_to_string(path).ok()) {
        Some(contents) => contents,
        None => return unmatched(any_critical),
    };

    let lines = split_lines(&contents)?;

    for line in lines {
        if line.len() > MAX_LINE_LEN {
            return Err(ChainError::LineTooLong);
        }
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let token_end = trimmed
            .find(|c: char| c.is_whitespace() || c == ':')
            .unwrap_or(trimmed.len());
        let oid_token = &trimmed[..token_end];
        if oid_token.is_empty() {
            return Err(ChainError::Configuration);
        }
        if policies.iter().any(|p| p.oid == oid_token) {
            return Ok(PolicyOutcome::Ok);
        }
    }

    unmatched(any_critical)
}

fn unmatched(any_critical: bool) -> Result<PolicyOutcome> {
    if any_critical {
        Ok(PolicyOutcome::NoPolicyMatch)
    } else {
        log::warn!("no policy file configured or no match found for a non-critical policy, allowing");
        Ok(PolicyOutcome::Ok)
    }
}

/// Split file contents into logical lines, detecting a missing final
/// newline on a non-empty final line (fails with `IncompleteLine`).
fn split_lines(contents: &str) -> Result<Vec<&str>> {
    if contents.is_empty() {
        return Ok(Vec::new());
    }
    let ends_with_newline = contents.ends_with('\n');
    let mut lines: Vec<&str> = contents.split('\n').collect();
    if ends_with_newline {
        lines.pop(); // drop the trailing empty segment produced by split
    } else if lines.last().map(|l| !l.is_empty()).unwrap_or(false) {
        return Err(ChainError::IncompleteLine);
    }
    Ok(lines)
}
