//! Reflog reading: the per-ref journal of value changes.
//!
//! Each line is `<old-id> <new-id> <identity>\t<message>`, appended as the
//! ref moves; the file therefore grows oldest-to-newest.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use bstr::{BStr, BString, ByteSlice};
use rev_hash::ObjectId;
use rev_utils::date::Signature;

use crate::error::RefError;
use crate::name::RefName;

/// One recorded ref movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflogEntry {
    pub old_oid: ObjectId,
    pub new_oid: ObjectId,
    /// Who moved the ref, and when (the timestamp `@{<date>}` matches on).
    pub identity: Signature,
    pub message: BString,
}

impl ReflogEntry {
    /// Decode a single journal line.
    pub fn parse(line: &BStr) -> Result<Self, RefError> {
        // The first two space-delimited words are ids; the remainder is
        // the identity, with the message split off at the tab.
        let mut words = line.as_bytes().splitn(3, |&b| b == b' ');
        let old_oid = id_word(words.next(), "old id")?;
        let new_oid = id_word(words.next(), "new id")?;
        let rest = words
            .next()
            .ok_or_else(|| RefError::Parse("reflog line ends before the identity".into()))?;

        let (who, message) = match rest.find_byte(b'\t') {
            Some(tab) => (&rest[..tab], &rest[tab + 1..]),
            None => (rest, &b""[..]),
        };

        let identity = Signature::parse(who.as_bstr())
            .map_err(|e| RefError::Parse(format!("bad identity in reflog: {}", e)))?;

        let message = message.strip_suffix(b"\n").unwrap_or(message);

        Ok(Self {
            old_oid,
            new_oid,
            identity,
            message: BString::from(message),
        })
    }

    /// Encode as a journal line (no trailing newline).
    pub fn to_bytes(&self) -> BString {
        let mut line = Vec::with_capacity(128 + self.message.len());
        line.extend_from_slice(self.old_oid.to_hex().as_bytes());
        line.push(b' ');
        line.extend_from_slice(self.new_oid.to_hex().as_bytes());
        line.push(b' ');
        line.extend_from_slice(&self.identity.to_bytes());
        line.push(b'\t');
        line.extend_from_slice(&self.message);
        BString::from(line)
    }
}

fn id_word(word: Option<&[u8]>, what: &str) -> Result<ObjectId, RefError> {
    let word =
        word.ok_or_else(|| RefError::Parse(format!("reflog line is missing the {}", what)))?;
    std::str::from_utf8(word)
        .ok()
        .and_then(|hex| ObjectId::from_hex(hex).ok())
        .ok_or_else(|| RefError::Parse(format!("reflog line has a malformed {}", what)))
}

/// Where the journal for `name` lives.
pub fn reflog_path(git_dir: &Path, name: &RefName) -> PathBuf {
    git_dir.join("logs").join(name.as_str())
}

/// All entries for a ref, latest first. A ref without a journal reads as
/// an empty log.
pub fn read_reflog(git_dir: &Path, name: &RefName) -> Result<Vec<ReflogEntry>, RefError> {
    let path = reflog_path(git_dir, name);
    let data = match fs::read(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(RefError::IoPath { path, source: e }),
    };

    let mut entries = data
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| ReflogEntry::parse(line.as_bstr()))
        .collect::<Result<Vec<_>, _>>()?;

    // On disk the journal grows downward; callers want the latest first.
    entries.reverse();
    Ok(entries)
}

/// Record a ref movement at the end of the journal.
pub fn append_reflog_entry(
    git_dir: &Path,
    name: &RefName,
    entry: &ReflogEntry,
) -> Result<(), RefError> {
    let path = reflog_path(git_dir, name);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| RefError::IoPath {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }

    let mut line: Vec<u8> = entry.to_bytes().into();
    line.push(b'\n');

    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut file| file.write_all(&line))
        .map_err(|e| RefError::IoPath { path, source: e })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rev_utils::date::GitDate;

    const A: &str = "00f00f00f00f00f00f00f00f00f00f00f00f00f0";
    const B: &str = "1221122112211221122112211221122112211221";

    fn movement(old: &str, new: &str, when: i64, msg: &str) -> ReflogEntry {
        ReflogEntry {
            old_oid: ObjectId::from_hex(old).unwrap(),
            new_oid: ObjectId::from_hex(new).unwrap(),
            identity: Signature {
                name: BString::from("Rae Resolver"),
                email: BString::from("rae@example.org"),
                date: GitDate::new(when, -180),
            },
            message: BString::from(msg),
        }
    }

    #[test]
    fn encode_decode_fixed_point() {
        let entry = movement(A, B, 1500000000, "commit: landing");
        let decoded = ReflogEntry::parse(entry.to_bytes().as_bstr()).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn decode_a_journal_line() {
        let line = format!(
            "{} {} Rae Resolver <rae@example.org> 1500000000 -0300\tcheckout: moving from a to b",
            A, B
        );
        let entry = ReflogEntry::parse(BStr::new(line.as_bytes())).unwrap();
        assert_eq!(entry.old_oid.to_hex(), A);
        assert_eq!(entry.new_oid.to_hex(), B);
        assert_eq!(entry.identity.date.timestamp, 1500000000);
        assert_eq!(entry.identity.date.tz_offset, -180);
        assert_eq!(
            entry.message,
            BString::from("checkout: moving from a to b")
        );
    }

    #[test]
    fn message_may_be_empty() {
        let line = format!("{} {} R <r@e> 1 +0000\t", A, B);
        let entry = ReflogEntry::parse(BStr::new(line.as_bytes())).unwrap();
        assert!(entry.message.is_empty());

        // Even the tab may be absent.
        let line = format!("{} {} R <r@e> 1 +0000", A, B);
        assert!(ReflogEntry::parse(BStr::new(line.as_bytes())).is_ok());
    }

    #[test]
    fn malformed_lines_rejected() {
        assert!(ReflogEntry::parse(BStr::new(b"nonsense")).is_err());
        assert!(ReflogEntry::parse(BStr::new(b"abc def")).is_err());
        let bad_id = format!("{} shortid R <r@e> 1 +0000\tm", A);
        assert!(ReflogEntry::parse(BStr::new(bad_id.as_bytes())).is_err());
    }

    #[test]
    fn journal_reads_latest_first() {
        let dir = tempfile::tempdir().unwrap();
        let name = RefName::new("refs/heads/topic").unwrap();

        append_reflog_entry(dir.path(), &name, &movement(A, B, 100, "first")).unwrap();
        append_reflog_entry(dir.path(), &name, &movement(B, A, 200, "second")).unwrap();

        let entries = read_reflog(dir.path(), &name).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, BString::from("second"));
        assert_eq!(entries[0].identity.date.timestamp, 200);
        assert_eq!(entries[1].message, BString::from("first"));
    }

    #[test]
    fn absent_journal_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let name = RefName::new("refs/heads/none").unwrap();
        assert!(read_reflog(dir.path(), &name).unwrap().is_empty());
    }
}
