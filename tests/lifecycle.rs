#![cfg(unix)]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the link lifecycle.
//!
//! These tests drive the public engine API against real temporary
//! directories and check the properties that must hold across operations:
//! add/remove round trips, switch involution, directory explosion and
//! collapse, batch ordering and exclusion idempotence.

mod common;

use common::{TestEnv, inode};
use lnkr::engine::{self, AddOutcome, RemoveOutcome, SwitchOutcome};
use lnkr::manifest::{LinkEntry, LinkType};
use lnkr::resources::LinkState;

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

/// Adding then removing a symbolic file leaves the tree as it was.
#[test]
fn symbolic_file_round_trip() {
    let env = TestEnv::new();
    env.write("notes.txt", "hello");

    engine::add(&env.ctx(), "notes.txt", false, Some(LinkType::Symbolic)).unwrap();
    assert!(TestEnv::is_symlink(&env.local.join("notes.txt")));
    assert_eq!(env.read("notes.txt"), "hello");

    engine::remove(&env.ctx(), "notes.txt").unwrap();
    assert!(!TestEnv::is_symlink(&env.local.join("notes.txt")));
    assert_eq!(env.read("notes.txt"), "hello");
    assert!(TestEnv::files_under(&env.remote).is_empty());
    assert!(env.manifest().entries.is_empty());
}

/// A recursive hard add followed by a remove of the directory restores
/// every file and leaves nothing behind in the remote root.
#[test]
fn hard_directory_round_trip() {
    let env = TestEnv::new();
    env.write("proj/a.txt", "a");
    env.write("proj/sub/b.txt", "b");
    env.write("proj/sub/deeper/c.txt", "c");

    let outcome = engine::add(&env.ctx(), "proj", true, Some(LinkType::Hard)).unwrap();
    assert!(matches!(outcome, AddOutcome::Added(ref v) if v.len() == 3));
    assert_eq!(
        TestEnv::files_under(&env.remote),
        vec!["proj/a.txt", "proj/sub/b.txt", "proj/sub/deeper/c.txt"]
    );

    let outcome = engine::remove(&env.ctx(), "proj").unwrap();
    assert!(matches!(outcome, RemoveOutcome::Removed(ref v) if v.len() == 3));
    assert_eq!(env.read("proj/sub/deeper/c.txt"), "c");
    assert!(TestEnv::files_under(&env.remote).is_empty());
    assert!(!env.remote.join("proj").exists());
}

/// Unlinking and relinking does not change the manifest at all.
#[test]
fn unlink_then_link_keeps_manifest_bytes() {
    let env = TestEnv::new();
    env.write("a.txt", "a");
    env.write("cfg/x", "x");
    engine::add(&env.ctx(), "a.txt", false, Some(LinkType::Hard)).unwrap();
    engine::add(&env.ctx(), "cfg", false, Some(LinkType::Symbolic)).unwrap();
    let before = env.manifest_text();

    engine::unlink(&env.ctx()).unwrap();
    assert!(!env.local.join("a.txt").exists());
    assert!(!env.local.join("cfg").exists());

    let report = engine::create_links(&env.ctx()).unwrap();
    assert_eq!(report.succeeded, 2);
    assert_eq!(env.manifest_text(), before);
    assert_eq!(env.read("cfg/x"), "x");
}

// ---------------------------------------------------------------------------
// Hard link identity
// ---------------------------------------------------------------------------

/// Hard entries share an inode with their remote object, before and after a
/// relink.
#[test]
fn hard_links_share_inode() {
    let env = TestEnv::new();
    env.write("data.bin", "0101");
    engine::add(&env.ctx(), "data.bin", false, Some(LinkType::Hard)).unwrap();

    let local = env.local.join("data.bin");
    let remote = env.remote.join("data.bin");
    assert_eq!(inode(&local), inode(&remote));

    engine::unlink(&env.ctx()).unwrap();
    engine::create_links(&env.ctx()).unwrap();
    assert_eq!(inode(&local), inode(&remote));

    let rows = engine::status(&env.ctx()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].state, LinkState::Linked);
}

/// Replacing a hard link by a copy is reported, not repaired.
#[test]
fn copied_file_is_reported_as_different_inode() {
    let env = TestEnv::new();
    env.write("data.bin", "0101");
    engine::add(&env.ctx(), "data.bin", false, Some(LinkType::Hard)).unwrap();
    std::fs::remove_file(env.local.join("data.bin")).unwrap();
    env.write("data.bin", "0101");

    let rows = engine::status(&env.ctx()).unwrap();
    assert_eq!(rows[0].state, LinkState::DifferentInodes);
    assert_ne!(
        inode(&env.local.join("data.bin")),
        inode(&env.remote.join("data.bin"))
    );
}

// ---------------------------------------------------------------------------
// Switch
// ---------------------------------------------------------------------------

/// Toggling a file twice returns it to its original type and content.
#[test]
fn switch_twice_is_identity() {
    let env = TestEnv::new();
    env.write("a.txt", "content");
    engine::add(&env.ctx(), "a.txt", false, Some(LinkType::Symbolic)).unwrap();
    let before = env.manifest_text();

    let first = engine::switch(&env.ctx(), "a.txt", None).unwrap();
    assert_eq!(
        first,
        SwitchOutcome::Switched {
            from: LinkType::Symbolic,
            to: LinkType::Hard
        }
    );
    assert!(!TestEnv::is_symlink(&env.local.join("a.txt")));

    engine::switch(&env.ctx(), "a.txt", None).unwrap();
    assert!(TestEnv::is_symlink(&env.local.join("a.txt")));
    assert_eq!(env.read("a.txt"), "content");
    assert_eq!(env.manifest_text(), before);
}

/// Exploding a symbolic directory and collapsing it again restores the
/// single symbolic entry and the remote tree.
#[test]
fn explode_then_collapse_is_inverse() {
    let env = TestEnv::new();
    env.write("cfg/a", "a");
    env.write("cfg/nested/b", "b");
    engine::add(&env.ctx(), "cfg", false, Some(LinkType::Symbolic)).unwrap();
    let remote_files = TestEnv::files_under(&env.remote);

    engine::switch(&env.ctx(), "cfg", Some("hard")).unwrap();
    assert_eq!(
        env.manifest().entries,
        vec![
            LinkEntry::new("cfg/a", LinkType::Hard),
            LinkEntry::new("cfg/nested/b", LinkType::Hard),
        ]
    );
    assert_eq!(inode(&env.local.join("cfg/nested/b")), inode(&env.remote.join("cfg/nested/b")));

    engine::switch(&env.ctx(), "cfg", Some("sym")).unwrap();
    assert_eq!(
        env.manifest().entries,
        vec![LinkEntry::new("cfg", LinkType::Symbolic)]
    );
    assert!(TestEnv::is_symlink(&env.local.join("cfg")));
    assert_eq!(TestEnv::files_under(&env.remote), remote_files);
}

/// The pure helpers agree with each other.
#[test]
fn collapse_undoes_explode() {
    let dir = LinkEntry::new("proj", LinkType::Symbolic);
    let files = vec![
        "proj/z".to_string(),
        "proj/a/b".to_string(),
        "project/other".to_string(),
    ];
    let mut entries = engine::explode(&dir, &files);
    assert_eq!(entries.len(), 2);
    entries.push(LinkEntry::new("project/other", LinkType::Hard));

    let (folded, remaining) = engine::collapse("proj", &entries);
    assert_eq!(folded, dir);
    assert_eq!(remaining, vec![LinkEntry::new("project/other", LinkType::Hard)]);
}

// ---------------------------------------------------------------------------
// Ordering and exclusions
// ---------------------------------------------------------------------------

/// The manifest stays sorted regardless of insertion order.
#[test]
fn manifest_entries_stay_sorted() {
    let env = TestEnv::new();
    for name in ["zeta", "alpha", "mid/one"] {
        env.write(name, name);
        engine::add(&env.ctx(), name, false, None).unwrap();
    }
    assert_eq!(env.manifest().entry_paths(), vec!["alpha", "mid/one", "zeta"]);
}

/// Rebuilding links repeatedly writes the exclude file once and then
/// leaves it byte-identical, preserving user lines.
#[test]
fn exclusion_block_is_idempotent() {
    let env = TestEnv::new();
    env.write(".git/info/exclude", "# local ignores\n*.swp\n");
    env.write("a.txt", "a");
    engine::add(&env.ctx(), "a.txt", false, None).unwrap();

    let first = env.exclude();
    engine::create_links(&env.ctx()).unwrap();
    engine::create_links(&env.ctx()).unwrap();
    assert_eq!(env.exclude(), first);
    insta::assert_snapshot!(first.trim_end(), @r"
    # local ignores
    *.swp
    ### LNKR STA
    /.lnkr.toml
    /a.txt
    ### LNKR END
    ");
}

/// Removing the last entry leaves only the manifest in the block.
#[test]
fn exclusion_block_tracks_entry_set() {
    let env = TestEnv::new();
    env.write("a.txt", "a");
    env.write("b.txt", "b");
    engine::add(&env.ctx(), "a.txt", false, None).unwrap();
    engine::add(&env.ctx(), "b.txt", false, None).unwrap();
    assert!(env.exclude().contains("/b.txt"));

    engine::remove(&env.ctx(), "b.txt").unwrap();
    let exclude = env.exclude();
    assert!(exclude.contains("/a.txt"));
    assert!(!exclude.contains("/b.txt"));

    engine::unlink(&env.ctx()).unwrap();
    assert!(!env.exclude().contains("LNKR"));
}
