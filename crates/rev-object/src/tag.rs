use bstr::BString;
use rev_hash::ObjectId;
use rev_utils::date::Signature;

use crate::fields::{id_field, identity_field, push_field, FieldScanner};
use crate::{ObjectError, ObjectType};

/// An annotated tag object: a named, signed-off pointer at another object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub target: ObjectId,
    /// The kind the target claims to be (tags may wrap tags).
    pub target_type: ObjectType,
    pub tag_name: BString,
    /// Absent on some ancient tags.
    pub tagger: Option<Signature>,
    pub message: BString,
}

impl Tag {
    /// Decode tag content (no object framing).
    pub fn parse(content: &[u8]) -> Result<Self, ObjectError> {
        let mut target = None;
        let mut target_type = None;
        let mut tag_name = None;
        let mut tagger = None;

        let mut scanner = FieldScanner::new(content);
        while let Some((key, value)) = scanner.next_field() {
            match key {
                b"object" => target = Some(id_field(value, "object")?),
                b"type" => target_type = Some(ObjectType::from_bytes(value)?),
                b"tag" => tag_name = Some(BString::from(value)),
                b"tagger" => tagger = Some(identity_field(value)?),
                _ => {}
            }
        }

        Ok(Self {
            target: target.ok_or(ObjectError::MissingTagField { field: "object" })?,
            target_type: target_type.ok_or(ObjectError::MissingTagField { field: "type" })?,
            tag_name: tag_name.ok_or(ObjectError::MissingTagField { field: "tag" })?,
            tagger,
            message: BString::from(scanner.message()),
        })
    }

    /// Encode tag content (no object framing).
    pub fn serialize_content(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128 + self.message.len());
        push_field(&mut out, b"object", self.target.to_hex().as_bytes());
        push_field(&mut out, b"type", self.target_type.as_bytes());
        push_field(&mut out, b"tag", &self.tag_name);
        if let Some(tagger) = &self.tagger {
            push_field(&mut out, b"tagger", &tagger.to_bytes());
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }
}
