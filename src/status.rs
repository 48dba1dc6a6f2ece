//! Status reporting channel: structured progress lines emitted to an
//! embedding caller, separate from the `log` facade used for
//! human-readable diagnostics.

/// A single structured status emission: `(status, key, value)`. The
/// walker only ever emits `status == "STATUS_ERROR"`, `key ==
/// "certcert.issuer.keyusage"`, with `value` carrying the collaborator's
/// error code as text.
pub trait StatusSink {
    fn emit(&mut self, status: &str, key: &str, value: &str);
}

/// A `StatusSink` that discards everything, for callers uninterested in
/// structured status lines.
#[derive(Debug, Default)]
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    fn emit(&mut self, _status: &str, _key: &str, _value: &str) {}
}
