//! OID prefix resolution (short hex -> full OID with ambiguity detection).

use rev_hash::{hex::is_hex_digits, ObjectId, HEX_LEN};

use crate::{ObjectDatabase, OdbError};

/// Minimum prefix length (matches C git's MINIMUM_ABBREV).
const MINIMUM_ABBREV: usize = 4;

/// Resolve a hex prefix to a full OID.
///
/// Returns `Ambiguous` if the prefix matches multiple distinct objects or
/// is shorter than the minimum abbreviation length, `NotFound` if no
/// object matches. A full-length prefix is an exact existence check.
pub fn resolve_prefix(odb: &ObjectDatabase, prefix: &str) -> Result<ObjectId, OdbError> {
    if !is_hex_digits(prefix) || prefix.len() > HEX_LEN {
        return Err(OdbError::NotFound(ObjectId::NULL));
    }

    if prefix.len() < MINIMUM_ABBREV {
        return Err(OdbError::Ambiguous {
            prefix: prefix.to_string(),
            count: 0,
        });
    }

    if prefix.len() == HEX_LEN {
        // Infallible: length and charset were checked above.
        let oid = ObjectId::from_hex(prefix)?;
        if odb.contains(&oid) {
            return Ok(oid);
        }
        return Err(OdbError::NotFound(oid));
    }

    let mut matches: Vec<ObjectId> = Vec::new();
    for result in odb.iter()? {
        let oid = result?;
        if oid.starts_with_hex(prefix) {
            matches.push(oid);
        }
    }

    matches.sort();
    matches.dedup();

    match matches.len() {
        0 => Err(OdbError::NotFound(ObjectId::NULL)),
        1 => Ok(matches[0]),
        n => Err(OdbError::Ambiguous {
            prefix: prefix.to_string(),
            count: n,
        }),
    }
}
