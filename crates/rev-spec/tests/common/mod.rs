//! On-disk fixture repositories with chosen object ids.
//!
//! Objects are written as zlib loose files at the path derived from a
//! chosen id; the read path never re-hashes, so test graphs can use
//! stable, human-memorable ids throughout.

use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use rev_hash::ObjectId;
use rev_object::{FileMode, Tree, TreeEntry};
use rev_repository::Repository;
use rev_utils::date::Clock;

pub struct TestRepo {
    dir: tempfile::TempDir,
}

impl TestRepo {
    /// An empty bare-layout git directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("objects")).unwrap();
        fs::create_dir_all(dir.path().join("refs/heads")).unwrap();
        fs::create_dir_all(dir.path().join("refs/tags")).unwrap();
        fs::write(dir.path().join("HEAD"), "ref: refs/heads/master\n").unwrap();
        Self { dir }
    }

    pub fn git_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Open the repository with a pinned clock (UTC).
    pub fn open(&self, now: i64) -> Repository {
        let mut repo = Repository::open(self.git_dir()).unwrap();
        repo.set_clock(Clock::Fixed { now, tz_offset: 0 });
        repo
    }

    /// Store `"<type> <len>\0<content>"` zlib-compressed at the path for
    /// `hex`, regardless of what the content actually hashes to.
    pub fn put_object(&self, hex: &str, obj_type: &str, content: &[u8]) {
        let oid = ObjectId::from_hex(hex).unwrap();
        let path = self.git_dir().join("objects").join(oid.loose_path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        let mut raw = format!("{} {}\0", obj_type, content.len()).into_bytes();
        raw.extend_from_slice(content);

        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&raw).unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();
    }

    pub fn blob(&self, hex: &str, content: &[u8]) {
        self.put_object(hex, "blob", content);
    }

    /// A tree from `(mode, name, target-hex)` triples.
    pub fn tree(&self, hex: &str, entries: &[(&str, &str, &str)]) {
        let tree = Tree {
            entries: entries
                .iter()
                .map(|(mode, name, target)| TreeEntry {
                    mode: FileMode::from_octal(mode.as_bytes()).unwrap(),
                    name: (*name).into(),
                    oid: ObjectId::from_hex(target).unwrap(),
                })
                .collect(),
        };
        self.put_object(hex, "tree", &tree.serialize_content());
    }

    /// A commit with the given tree, parents, committer time, and message.
    pub fn commit(&self, hex: &str, tree: &str, parents: &[&str], time: i64, message: &str) {
        let mut content = format!("tree {}\n", tree);
        for parent in parents {
            content.push_str(&format!("parent {}\n", parent));
        }
        content.push_str(&format!(
            "author A U Thor <author@example.com> {} +0000\n",
            time
        ));
        content.push_str(&format!(
            "committer A U Thor <author@example.com> {} +0000\n",
            time
        ));
        content.push('\n');
        content.push_str(message);
        self.put_object(hex, "commit", content.as_bytes());
    }

    /// An annotated tag object.
    pub fn tag(&self, hex: &str, target: &str, target_type: &str, name: &str, message: &str) {
        let content = format!(
            "object {}\ntype {}\ntag {}\ntagger A U Thor <author@example.com> 1281217220 +0000\n\n{}",
            target, target_type, name, message
        );
        self.put_object(hex, "tag", content.as_bytes());
    }

    pub fn write_ref(&self, name: &str, hex: &str) {
        let path = self.git_dir().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!("{}\n", hex)).unwrap();
    }

    pub fn write_symref(&self, name: &str, target: &str) {
        let path = self.git_dir().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!("ref: {}\n", target)).unwrap();
    }

    /// Replace packed-refs with the given `(name, hex)` entries.
    pub fn packed_refs(&self, entries: &[(&str, &str)]) {
        let mut sorted: Vec<_> = entries.to_vec();
        sorted.sort();
        let mut out = String::from("# pack-refs with: peeled fully-peeled sorted \n");
        for (name, hex) in sorted {
            out.push_str(&format!("{} {}\n", hex, name));
        }
        fs::write(self.git_dir().join("packed-refs"), out).unwrap();
    }

    /// Append one reflog line (the file is oldest first, as on disk).
    pub fn log(&self, name: &str, old: &str, new: &str, time: i64, tz: &str, message: &str) {
        let path = self.git_dir().join("logs").join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let line = format!(
            "{} {} A U Thor <author@example.com> {} {}\t{}\n",
            old, new, time, tz, message
        );
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        file.write_all(line.as_bytes()).unwrap();
    }

    pub fn config(&self, text: &str) {
        fs::write(self.git_dir().join("config"), text).unwrap();
    }
}

pub const ZERO: &str = "0000000000000000000000000000000000000000";

// Blobs.
pub const BLOB_README: &str = "a8233120f6ad708f843d861ce2b7228ec4e3dec6";
pub const BLOB_BRANCH_FILE: &str = "3697d64be941a53d4ae8f6a271e4e3fa56b022cc";
pub const BLOB_NEW: &str = "a71586c1dfe8a71c6cbf6c129f404c5642ff31bd";
pub const BLOB_READNE2: &str = "0266163a49e280c4f5ed1e08facd36a2bd716bcf";
pub const BLOB_POINTED: &str = "1385f264afb75a56a5bec74243be9b367ba4ca08";
pub const BLOB_4TXT: &str = "d6c93164c249c8000205dd4ec5cbca1b516d487f";
pub const BLOB_1TXT: &str = "1f67fc4386b2d171e0d21be1c447e12660561f9b";
/// Shares the prefix `e90` (but not `e908`) with [`COMMIT_E90`].
pub const BLOB_E90_TWIN: &str = "e901234599cf0ae3bcd0ba1ffe0f061e8346d9ca";

// Trees.
pub const TREE_MASTER: &str = "944c0f6e4dfa41595e6eb3ceecdb14f50fe18162";
pub const TREE_E90: &str = "c3d1f0a8efea09bd4d9a4aa14a8fcbc9b9bd0e4f";
pub const TREE_SUBTREES: &str = "ae90f12eea699729ed24555e40b9fd669da12a12";
pub const TREE_AB: &str = "f1425cef211cc08caa31e7b545ffb232acb098c3";
pub const TREE_DE: &str = "7bd51a9c1f22695acf9f3a5f6ee3135f32d2af4d";
pub const TREE_FGH: &str = "cd8b3d3fd6e4e9a4ca64f395ca3c0a55fd53a6a4";

// Commits, oldest to newest.
pub const COMMIT_ROOT: &str = "8496071c1b46c854b31185ea97743be6a8774479";
pub const COMMIT_ANOTHER: &str = "5b5b025afb0b4c913b4c338a42934a3863bf3644";
pub const COMMIT_THIRD: &str = "4a202b346bb0fb0db7eff3cffeb3c70babbd2045";
pub const COMMIT_BRANCH: &str = "c47800c7266a2be04c571c04d5a6614691ea99bd";
pub const COMMIT_FOURTH: &str = "9fd738e8f7967c078dceed8190330fc8648ee56a";
pub const COMMIT_MERGE: &str = "be3563ae3f795b2b4353bcce3a527ad0a4f7f644";
pub const COMMIT_MASTER: &str = "a65fedf39aefe402d3bb6e24df4d4f5fe4547750";
pub const COMMIT_BR2: &str = "a4a7dce85cf63874e984719f4fdd239f5145052f";
pub const COMMIT_E90: &str = "e90810b8df3e80c413d903f631643c716887138d";
pub const COMMIT_SUBTREES: &str = "42e4e7c5e507e113ebbb7801b16b52cf867b7ce9";

// Tags.
pub const TAG_E90810B: &str = "7b4384978d2493e851f9cca7858815fac9b10980";
pub const TAG_TEST: &str = "b25fa35b38051e4ae45d4222e795f9df2e43f1d1";
pub const TAG_INNER: &str = "1d7e7f3f6b4a2d9aee5f4c4f7cf9a2d3f4b8a766";
pub const TAG_WRAPPED: &str = "53fc32d17276939fc79ed05badaef2db09990016";

/// "Now" for the pinned clock: a few days after the newest reflog entry.
pub const NOW: i64 = 1336406700;

/// The shared fixture: a master/br2 merge topology with wrapped tags, a
/// subtree hierarchy, an ambiguous short id, a packed-only ref, a
/// remote-tracking branch with reflog, and upstream configuration.
pub fn fixture() -> TestRepo {
    let r = TestRepo::new();

    // Blobs.
    r.blob(BLOB_README, b"hey there\n");
    r.blob(BLOB_BRANCH_FILE, b"hi\nbye!\n");
    r.blob(BLOB_NEW, b"my new file\n");
    r.blob(BLOB_READNE2, b"Testing a readme.txt\nNow we add a single line here\n");
    r.blob(BLOB_POINTED, b"hi\n");
    r.blob(BLOB_4TXT, b"four\n");
    r.blob(BLOB_1TXT, b"one\n");
    r.blob(BLOB_E90_TWIN, b"ambiguity fodder\n");

    // Trees.
    r.tree(
        TREE_MASTER,
        &[
            ("100644", "README", BLOB_README),
            ("100644", "branch_file.txt", BLOB_BRANCH_FILE),
            ("100644", "new.txt", BLOB_NEW),
        ],
    );
    r.tree(TREE_E90, &[("100644", "readme.txt", BLOB_READNE2)]);
    r.tree(
        TREE_SUBTREES,
        &[("100644", "README", BLOB_README), ("40000", "ab", TREE_AB)],
    );
    r.tree(
        TREE_AB,
        &[("100644", "4.txt", BLOB_4TXT), ("40000", "de", TREE_DE)],
    );
    r.tree(
        TREE_DE,
        &[("100644", "2.txt", BLOB_4TXT), ("40000", "fgh", TREE_FGH)],
    );
    r.tree(TREE_FGH, &[("100644", "1.txt", BLOB_1TXT)]);

    // History. master merges the fourth commit and the branch commit;
    // br2 merges them the other way around.
    r.commit(COMMIT_ROOT, TREE_MASTER, &[], 1273360386, "testing\n");
    r.commit(
        COMMIT_ANOTHER,
        TREE_MASTER,
        &[COMMIT_ROOT],
        1273360778,
        "another test file\n",
    );
    r.commit(
        COMMIT_BRANCH,
        TREE_MASTER,
        &[COMMIT_ANOTHER],
        1273360952,
        "branch commit one\n",
    );
    r.commit(
        COMMIT_THIRD,
        TREE_MASTER,
        &[COMMIT_ANOTHER],
        1273361461,
        "a third test file\n",
    );
    r.commit(
        COMMIT_FOURTH,
        TREE_MASTER,
        &[COMMIT_THIRD],
        1273361576,
        "a fourth commit\n",
    );
    r.commit(
        COMMIT_MERGE,
        TREE_MASTER,
        &[COMMIT_FOURTH, COMMIT_BRANCH],
        1274813907,
        "Merge branch br2\n",
    );
    r.commit(
        COMMIT_MASTER,
        TREE_MASTER,
        &[COMMIT_MERGE],
        1335806603,
        "checking in\n",
    );
    r.commit(
        COMMIT_BR2,
        TREE_MASTER,
        &[COMMIT_BRANCH, COMMIT_FOURTH],
        1335806617,
        "Merge branch master into br2\n",
    );
    r.commit(COMMIT_E90, TREE_E90, &[], 1281217220, "Test commit 2\n");
    r.commit(
        COMMIT_SUBTREES,
        TREE_SUBTREES,
        &[COMMIT_ROOT],
        1280598869,
        "subtrees\n",
    );

    // Tags: one named like a short id, one wrapping a tag wrapping a
    // commit, one pointing straight at a blob.
    r.tag(TAG_E90810B, COMMIT_E90, "commit", "e90810b", "This is a very simple tag.\n");
    r.tag(TAG_TEST, COMMIT_E90, "commit", "test", "This is also a simple tag.\n");
    r.tag(TAG_INNER, COMMIT_MASTER, "commit", "inner", "inner wrapper\n");
    r.tag(TAG_WRAPPED, TAG_INNER, "tag", "wrapped_tag", "double wrapped\n");

    // Refs.
    r.write_symref("HEAD", "refs/heads/master");
    r.write_ref("refs/heads/master", COMMIT_MASTER);
    r.write_ref("refs/heads/br2", COMMIT_BR2);
    r.write_ref("refs/heads/test", COMMIT_E90);
    r.write_ref("refs/heads/subtrees", COMMIT_SUBTREES);
    r.write_ref("refs/heads/track-local", COMMIT_ANOTHER);
    r.write_ref("refs/tags/test", TAG_TEST);
    r.write_ref("refs/tags/e90810b", TAG_E90810B);
    r.write_ref("refs/tags/point_to_blob", BLOB_POINTED);
    r.write_ref("refs/tags/wrapped_tag", TAG_WRAPPED);
    r.write_ref("refs/remotes/test/master", COMMIT_MERGE);
    r.packed_refs(&[("refs/heads/packed-test", COMMIT_THIRD)]);

    // Reflogs (file order is oldest first).
    r.log("HEAD", ZERO, COMMIT_MERGE, 1335806563, "-0700", "clone: from somewhere");
    r.log("HEAD", COMMIT_MERGE, COMMIT_MASTER, 1335806603, "-0800", "commit: checking in");
    r.log(
        "HEAD",
        COMMIT_MASTER,
        COMMIT_BRANCH,
        1335806608,
        "-0900",
        "checkout: moving from master to br2",
    );
    r.log("HEAD", COMMIT_BRANCH, COMMIT_BR2, 1335806617, "-0900", "commit: checking in");
    r.log(
        "HEAD",
        COMMIT_BR2,
        COMMIT_MASTER,
        1335806621,
        "-0900",
        "checkout: moving from br2 to master",
    );

    r.log("refs/heads/master", ZERO, COMMIT_MERGE, 1335806563, "-0800", "clone: from somewhere");
    r.log(
        "refs/heads/master",
        COMMIT_MERGE,
        COMMIT_MASTER,
        1335806603,
        "-0800",
        "commit: checking in",
    );

    r.log(
        "refs/heads/br2",
        ZERO,
        COMMIT_BRANCH,
        1335806608,
        "-0900",
        "branch: Created from master",
    );
    r.log(
        "refs/heads/br2",
        COMMIT_BRANCH,
        COMMIT_BR2,
        1335806617,
        "-0900",
        "commit: checking in",
    );

    r.log(
        "refs/remotes/test/master",
        ZERO,
        COMMIT_FOURTH,
        1335806563,
        "-0800",
        "fetch",
    );
    r.log(
        "refs/remotes/test/master",
        COMMIT_FOURTH,
        COMMIT_MERGE,
        1335806602,
        "-0800",
        "fetch",
    );

    // Upstream bindings: master tracks the remote, track-local tracks
    // master in-repo, br2 tracks nothing.
    r.config(
        "[branch \"master\"]\n\
         \tremote = test\n\
         \tmerge = refs/heads/master\n\
         [branch \"track-local\"]\n\
         \tremote = .\n\
         \tmerge = refs/heads/master\n",
    );

    r
}
