use std::cmp::Ordering;

use bstr::{BString, ByteSlice};
use rev_hash::ObjectId;

use crate::ObjectError;

/// A tree entry's mode bits, kept in the raw numeric form they travel in
/// (octal ASCII on the wire, e.g. `100644`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(u32);

impl FileMode {
    pub const REGULAR: FileMode = FileMode(0o100644);
    pub const EXECUTABLE: FileMode = FileMode(0o100755);
    pub const SYMLINK: FileMode = FileMode(0o120000);
    pub const GITLINK: FileMode = FileMode(0o160000);
    pub const DIR: FileMode = FileMode(0o040000);

    /// Decode from octal ASCII. Unrecognized (but well-formed) modes are
    /// kept as-is so odd trees still round-trip.
    pub fn from_octal(s: &[u8]) -> Result<Self, ObjectError> {
        let reject = || ObjectError::InvalidFileMode(String::from_utf8_lossy(s).into_owned());
        if !s.iter().all(u8::is_ascii_digit) {
            return Err(reject());
        }
        let text = std::str::from_utf8(s).map_err(|_| reject())?;
        u32::from_str_radix(text, 8).map(Self).map_err(|_| reject())
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Encode as octal ASCII. Trees are written without a leading zero
    /// (`40000`, not `040000`).
    pub fn to_octal(&self) -> String {
        format!("{:o}", self.0)
    }

    /// Is this a subtree (directory) entry?
    pub fn is_dir(&self) -> bool {
        *self == Self::DIR
    }

    /// Is this a gitlink (submodule) entry?
    pub fn is_gitlink(&self) -> bool {
        *self == Self::GITLINK
    }
}

/// A single entry in a tree object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: FileMode,
    pub name: BString,
    pub oid: ObjectId,
}

impl TreeEntry {
    /// The byte sequence this entry sorts by: its name, with a `/`
    /// appended for subtrees. That one rule gives the canonical order
    /// ("foo.c" before the directory "foo", "foo-bar" before both).
    fn order_key(&self) -> impl Iterator<Item = &u8> + '_ {
        let suffix: &[u8] = if self.mode.is_dir() { b"/" } else { b"" };
        self.name.iter().chain(suffix.iter())
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(other.order_key())
    }
}

/// A tree object: one directory level of names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode tree content. Entries are back-to-back records of
    /// `<octal-mode> <name>\0<20 raw id bytes>`.
    pub fn parse(content: &[u8]) -> Result<Self, ObjectError> {
        let mut entries = Vec::new();
        let mut rest = content;
        while !rest.is_empty() {
            let offset = content.len() - rest.len();
            let (entry, remainder) = take_entry(rest, offset)?;
            entries.push(entry);
            rest = remainder;
        }
        Ok(Self { entries })
    }

    /// Encode tree content, in canonical entry order.
    pub fn serialize_content(&self) -> Vec<u8> {
        let mut ordered: Vec<&TreeEntry> = self.entries.iter().collect();
        ordered.sort();

        let mut out = Vec::new();
        for entry in ordered {
            out.extend_from_slice(entry.mode.to_octal().as_bytes());
            out.push(b' ');
            out.extend_from_slice(&entry.name);
            out.push(0);
            out.extend_from_slice(entry.oid.as_bytes());
        }
        out
    }

    /// Look up an entry by exact byte-equal name.
    pub fn entry_named(&self, name: &[u8]) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name.as_slice() == name)
    }
}

/// Split one entry off the front of `input`.
fn take_entry(input: &[u8], offset: usize) -> Result<(TreeEntry, &[u8]), ObjectError> {
    let malformed = |reason: &str| ObjectError::InvalidTreeEntry {
        offset,
        reason: reason.to_string(),
    };

    let space = input
        .find_byte(b' ')
        .ok_or_else(|| malformed("mode is not space-terminated"))?;
    let mode =
        FileMode::from_octal(&input[..space]).map_err(|_| malformed("mode is not octal"))?;

    let rest = &input[space + 1..];
    let nul = rest
        .find_byte(0)
        .ok_or_else(|| malformed("name is not NUL-terminated"))?;
    let name = BString::from(&rest[..nul]);

    let id_bytes = rest
        .get(nul + 1..nul + 21)
        .ok_or_else(|| malformed("entry id is truncated"))?;
    let oid = ObjectId::from_bytes(id_bytes)?;

    Ok((TreeEntry { mode, name, oid }, &rest[nul + 21..]))
}
