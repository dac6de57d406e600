//! Scanner for the `key value` header block that commits and tags share.
//!
//! The block ends at a blank line; everything after it is the free-form
//! message. Indented continuation lines belong to the preceding field and
//! are folded away, since the resolver reads none of the multi-line
//! headers (signatures, mergetags).

use bstr::{BStr, ByteSlice};
use rev_hash::ObjectId;
use rev_utils::date::Signature;

use crate::ObjectError;

pub(crate) struct FieldScanner<'a> {
    rest: &'a [u8],
}

impl<'a> FieldScanner<'a> {
    pub(crate) fn new(content: &'a [u8]) -> Self {
        Self { rest: content }
    }

    /// The next `(key, first line of value)` pair, or None once the blank
    /// separator (or the end of input) is reached.
    pub(crate) fn next_field(&mut self) -> Option<(&'a [u8], &'a [u8])> {
        match self.rest.first() {
            None => return None,
            Some(&b'\n') => {
                self.rest = &self.rest[1..];
                return None;
            }
            Some(_) => {}
        }

        let line_len = self.rest.find_byte(b'\n').unwrap_or(self.rest.len());
        let line = &self.rest[..line_len];
        self.rest = self.rest.get(line_len + 1..).unwrap_or(b"");

        // Fold away indented continuation lines.
        while let Some(&b' ') = self.rest.first() {
            let skip = self.rest.find_byte(b'\n').map_or(self.rest.len(), |p| p + 1);
            self.rest = &self.rest[skip..];
        }

        match line.find_byte(b' ') {
            Some(cut) => Some((&line[..cut], &line[cut + 1..])),
            None => Some((line, b"")),
        }
    }

    /// Everything after the header block: the message.
    pub(crate) fn message(&self) -> &'a [u8] {
        self.rest
    }
}

/// Decode a field value that must be a hex object id.
pub(crate) fn id_field(value: &[u8], field: &str) -> Result<ObjectId, ObjectError> {
    std::str::from_utf8(value)
        .ok()
        .and_then(|hex| ObjectId::from_hex(hex).ok())
        .ok_or_else(|| {
            ObjectError::InvalidHeader(format!("'{}' does not carry an object id", field))
        })
}

/// Decode a field value that must be an identity line.
pub(crate) fn identity_field(value: &[u8]) -> Result<Signature, ObjectError> {
    Signature::parse(BStr::new(value)).map_err(|e| ObjectError::InvalidSignature(e.to_string()))
}

/// Append one `key value\n` line.
pub(crate) fn push_field(out: &mut Vec<u8>, key: &[u8], value: &[u8]) {
    out.extend_from_slice(key);
    out.push(b' ');
    out.extend_from_slice(value);
    out.push(b'\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_until_blank_line() {
        let mut scanner = FieldScanner::new(b"alpha one\nbeta two\n\nthe message\n");
        assert_eq!(scanner.next_field(), Some((&b"alpha"[..], &b"one"[..])));
        assert_eq!(scanner.next_field(), Some((&b"beta"[..], &b"two"[..])));
        assert_eq!(scanner.next_field(), None);
        assert_eq!(scanner.message(), b"the message\n");
    }

    #[test]
    fn no_message_block() {
        let mut scanner = FieldScanner::new(b"alpha one\n");
        assert!(scanner.next_field().is_some());
        assert_eq!(scanner.next_field(), None);
        assert_eq!(scanner.message(), b"");
    }

    #[test]
    fn continuations_fold_into_the_previous_field() {
        let mut scanner = FieldScanner::new(b"sig begin\n middle\n end\nnext x\n\nm");
        assert_eq!(scanner.next_field(), Some((&b"sig"[..], &b"begin"[..])));
        assert_eq!(scanner.next_field(), Some((&b"next"[..], &b"x"[..])));
        assert_eq!(scanner.next_field(), None);
        assert_eq!(scanner.message(), b"m");
    }

    #[test]
    fn keyless_line_has_empty_value() {
        let mut scanner = FieldScanner::new(b"lonely\n\n");
        assert_eq!(scanner.next_field(), Some((&b"lonely"[..], &b""[..])));
    }

    #[test]
    fn id_field_rejects_garbage() {
        assert!(id_field(b"not-hex", "tree").is_err());
        assert!(id_field(b"da39a3ee5e6b4b0d3255bfef95601890afd80709", "tree").is_ok());
    }
}
