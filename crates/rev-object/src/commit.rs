use bstr::BString;
use rev_hash::ObjectId;
use rev_utils::date::Signature;

use crate::fields::{id_field, identity_field, push_field, FieldScanner};
use crate::ObjectError;

/// A commit object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Id of the root tree.
    pub tree: ObjectId,
    /// Parent ids, empty for a root commit. `~n` walks the first one.
    pub parents: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    /// The free-form message after the header block.
    pub message: BString,
}

impl Commit {
    /// Decode commit content (no object framing).
    ///
    /// Only the fields the resolver consults are kept; encoding, gpgsig,
    /// mergetag and friends scan past without being materialized.
    pub fn parse(content: &[u8]) -> Result<Self, ObjectError> {
        let mut tree = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;

        let mut scanner = FieldScanner::new(content);
        while let Some((key, value)) = scanner.next_field() {
            match key {
                b"tree" => tree = Some(id_field(value, "tree")?),
                b"parent" => parents.push(id_field(value, "parent")?),
                b"author" => author = Some(identity_field(value)?),
                b"committer" => committer = Some(identity_field(value)?),
                _ => {}
            }
        }

        Ok(Self {
            tree: tree.ok_or(ObjectError::MissingCommitField { field: "tree" })?,
            parents,
            author: author.ok_or(ObjectError::MissingCommitField { field: "author" })?,
            committer: committer
                .ok_or(ObjectError::MissingCommitField { field: "committer" })?,
            message: BString::from(scanner.message()),
        })
    }

    /// Encode commit content (no object framing).
    pub fn serialize_content(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256 + self.message.len());
        push_field(&mut out, b"tree", self.tree.to_hex().as_bytes());
        for parent in &self.parents {
            push_field(&mut out, b"parent", parent.to_hex().as_bytes());
        }
        push_field(&mut out, b"author", &self.author.to_bytes());
        push_field(&mut out, b"committer", &self.committer.to_bytes());
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }

    /// The first parent, if any.
    pub fn first_parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    /// Does this commit start a history?
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}
