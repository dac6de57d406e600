use std::fs;
use std::path::PathBuf;

use rev_hash::ObjectId;

use crate::{ObjectDatabase, OdbError};

/// Iterator over all loose object OIDs in the database.
///
/// Walks the two-hex-digit fan-out directories and yields one `ObjectId`
/// per well-formed object file. Files that do not look like object names
/// are skipped.
pub struct LooseObjectIter {
    /// Fan-out directories not yet visited.
    dirs: Vec<(String, PathBuf)>,
    /// Entries of the directory currently being read.
    current: Vec<ObjectId>,
}

impl ObjectDatabase {
    /// Iterate over all object OIDs in the database.
    pub fn iter(&self) -> Result<LooseObjectIter, OdbError> {
        let mut dirs = Vec::new();

        if self.objects_dir().is_dir() {
            for entry in fs::read_dir(self.objects_dir())? {
                let entry = entry?;
                let name = entry.file_name();
                let name = match name.to_str() {
                    Some(n) => n,
                    None => continue,
                };
                if name.len() == 2
                    && name.bytes().all(|b| b.is_ascii_hexdigit())
                    && entry.path().is_dir()
                {
                    dirs.push((name.to_string(), entry.path()));
                }
            }
        }

        // Deterministic order regardless of readdir order.
        dirs.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(LooseObjectIter {
            dirs,
            current: Vec::new(),
        })
    }
}

impl LooseObjectIter {
    fn fill_from_next_dir(&mut self) -> Result<bool, OdbError> {
        let (prefix, dir) = match self.dirs.pop() {
            Some(d) => d,
            None => return Ok(false),
        };

        let mut oids = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = match name.to_str() {
                Some(n) => n,
                None => continue,
            };
            if name.len() == 38 && name.bytes().all(|b| b.is_ascii_hexdigit()) {
                let hex = format!("{}{}", prefix, name);
                if let Ok(oid) = ObjectId::from_hex(&hex) {
                    oids.push(oid);
                }
            }
        }

        oids.sort_by(|a, b| b.cmp(a));
        self.current = oids;
        Ok(true)
    }
}

impl Iterator for LooseObjectIter {
    type Item = Result<ObjectId, OdbError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(oid) = self.current.pop() {
                return Some(Ok(oid));
            }
            match self.fill_from_next_dir() {
                Ok(true) => continue,
                Ok(false) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rev_object::{Blob, Object};

    #[test]
    fn iterates_written_objects_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let odb = ObjectDatabase::open(dir.path());

        let a = odb.write(&Object::Blob(Blob::new(b"one".to_vec()))).unwrap();
        let b = odb.write(&Object::Blob(Blob::new(b"two".to_vec()))).unwrap();
        let c = odb
            .write(&Object::Blob(Blob::new(b"three".to_vec())))
            .unwrap();

        let mut all: Vec<ObjectId> = odb.iter().unwrap().map(|r| r.unwrap()).collect();
        let mut expected = vec![a, b, c];
        expected.sort();
        assert_eq!(all.len(), 3);
        // Iterator yields sorted order already.
        let sorted = {
            let mut s = all.clone();
            s.sort();
            s
        };
        assert_eq!(all, sorted);
        all.sort();
        assert_eq!(all, expected);
    }

    #[test]
    fn empty_database_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let odb = ObjectDatabase::open(dir.path());
        assert_eq!(odb.iter().unwrap().count(), 0);
    }

    #[test]
    fn non_object_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pack")).unwrap();
        std::fs::write(dir.path().join("pack/keep.txt"), b"x").unwrap();
        let odb = ObjectDatabase::open(dir.path());
        assert_eq!(odb.iter().unwrap().count(), 0);
    }
}
