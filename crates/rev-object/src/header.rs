//! The `"<type> <size>\0"` framing that prefixes every stored object.

use bstr::ByteSlice;

use crate::{ObjectError, ObjectType};

/// A decoded object header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub kind: ObjectType,
    /// Declared content size in bytes.
    pub size: usize,
    /// Bytes the header occupies, including the NUL terminator.
    pub len: usize,
}

/// Decode the header at the front of `data`.
pub fn parse(data: &[u8]) -> Result<Header, ObjectError> {
    let nul = data
        .find_byte(0)
        .ok_or_else(|| ObjectError::InvalidHeader("unterminated header".into()))?;

    let mut words = data[..nul].splitn(2, |&b| b == b' ');
    let kind_word = words.next().unwrap_or_default();
    let size_word = words
        .next()
        .ok_or_else(|| ObjectError::InvalidHeader("header has no size field".into()))?;

    let kind = ObjectType::from_bytes(kind_word)?;
    let size = std::str::from_utf8(size_word)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            ObjectError::InvalidHeader(format!(
                "size field is not a decimal length: {:?}",
                size_word.as_bstr()
            ))
        })?;

    Ok(Header {
        kind,
        size,
        len: nul + 1,
    })
}

/// Encode the header for an object about to be stored.
pub fn encode(kind: ObjectType, size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(16);
    out.extend_from_slice(kind.as_bytes());
    out.push(b' ');
    out.extend_from_slice(size.to_string().as_bytes());
    out.push(0);
    out
}
