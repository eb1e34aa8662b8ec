// End-to-end explorer scenarios against the in-memory backend

mod common;

use common::harness::ExplorerTestHarness;
use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};
use folio::config::Config;
use folio::input::KeyOutcome;
use folio::view::file_tree::SortOrder;
use std::path::PathBuf;

fn p(relative: &str) -> String {
    ExplorerTestHarness::tree_path(relative)
}

/// Open folder, expand, edit and save with Ctrl+S
#[tokio::test]
async fn test_open_edit_save_scenario() {
    let mut harness = ExplorerTestHarness::new(&[("a.txt", "first"), ("sub/b.txt", "second")]);
    harness.session.open_folder().await.unwrap();

    assert_eq!(harness.visible(), vec!["a.txt", "sub"]);
    let sub = harness
        .session
        .rows()
        .into_iter()
        .find(|row| row.name == "sub")
        .unwrap();
    assert!(sub.is_dir && !sub.expanded);

    assert!(harness.session.toggle_expansion(&p("sub")).await.unwrap());
    assert_eq!(harness.visible(), vec!["a.txt", "sub", "  b.txt"]);

    harness.session.open_file(&p("a.txt")).await.unwrap();
    assert!(!harness.session.is_dirty(&p("a.txt")));
    harness.session.on_content_changed("first, edited".to_string());
    assert!(harness.session.is_dirty(&p("a.txt")));

    harness.backend.reset_metrics().await;
    let outcome = harness
        .send_key(KeyCode::Char('s'), KeyModifiers::CONTROL)
        .await;
    assert_eq!(outcome, KeyOutcome::Consumed);

    assert_eq!(harness.backend.metrics().await.write_file_calls, 1);
    assert!(!harness.session.is_dirty(&p("a.txt")));
    assert_eq!(harness.disk("a.txt").as_deref(), Some("first, edited"));
}

/// Cmd+S on macOS is bound by default as well
#[tokio::test]
async fn test_super_s_saves() {
    let mut harness = ExplorerTestHarness::new(&[("a.txt", "x")]);
    harness.session.open_folder().await.unwrap();
    harness.session.open_file(&p("a.txt")).await.unwrap();
    harness.session.on_content_changed("y".to_string());

    let outcome = harness
        .send_key(KeyCode::Char('s'), KeyModifiers::SUPER)
        .await;
    assert_eq!(outcome, KeyOutcome::Consumed);
    assert_eq!(harness.disk("a.txt").as_deref(), Some("y"));
}

/// Holding the chord auto-repeats; only the press saves
#[tokio::test]
async fn test_save_once_per_press() {
    let mut harness = ExplorerTestHarness::new(&[("a.txt", "x")]);
    harness.session.open_folder().await.unwrap();
    harness.session.open_file(&p("a.txt")).await.unwrap();
    harness.backend.reset_metrics().await;

    harness
        .send_key(KeyCode::Char('s'), KeyModifiers::CONTROL)
        .await;
    for kind in [KeyEventKind::Repeat, KeyEventKind::Repeat, KeyEventKind::Release] {
        let outcome = harness
            .send_key_kind(KeyCode::Char('s'), KeyModifiers::CONTROL, kind)
            .await;
        assert_eq!(outcome, KeyOutcome::Consumed);
    }

    assert_eq!(harness.backend.metrics().await.write_file_calls, 1);
}

#[tokio::test]
async fn test_unbound_keys_pass_through() {
    let mut harness = ExplorerTestHarness::new(&[("a.txt", "x")]);
    harness.session.open_folder().await.unwrap();

    let outcome = harness
        .send_key(KeyCode::Char('s'), KeyModifiers::NONE)
        .await;
    assert_eq!(outcome, KeyOutcome::Ignored);
}

#[tokio::test]
async fn test_failed_write_keeps_dirty_flag() {
    let mut harness = ExplorerTestHarness::new(&[("a.txt", "original")]);
    harness.session.open_folder().await.unwrap();
    harness.session.open_file(&p("a.txt")).await.unwrap();
    harness.session.on_content_changed("changed".to_string());

    harness.memory.set_fail_writes(true);
    let outcome = harness
        .send_key(KeyCode::Char('s'), KeyModifiers::CONTROL)
        .await;
    assert_eq!(outcome, KeyOutcome::Consumed);

    assert!(harness.session.is_dirty(&p("a.txt")));
    assert_eq!(harness.disk("a.txt").as_deref(), Some("original"));
    assert!(harness.session.status_message().unwrap().contains("IO error"));
}

#[tokio::test]
async fn test_save_with_nothing_selected_is_silent() {
    let mut harness = ExplorerTestHarness::new(&[("a.txt", "x")]);
    harness.session.open_folder().await.unwrap();
    harness.backend.reset_metrics().await;

    harness.session.save_file().await.unwrap();
    assert_eq!(harness.backend.metrics().await.total_calls(), 0);
    assert_eq!(harness.session.status_message(), Some("Opened project"));
}

#[tokio::test]
async fn test_hidden_entries_are_excluded() {
    let harness_files = [
        (".git/config", "[core]"),
        ("src/main.rs", "fn main() {}"),
        ("README.md", "# readme"),
        (".env", "SECRET=1"),
    ];
    let mut harness = ExplorerTestHarness::new(&harness_files);
    harness.session.open_folder().await.unwrap();

    assert_eq!(harness.visible(), vec!["README.md", "src"]);
    let tree = harness.session.tree().unwrap();
    assert!(tree.all_nodes().all(|node| !node.name().starts_with('.')));
}

#[tokio::test]
async fn test_expanding_twice_enumerates_once() {
    let mut harness = ExplorerTestHarness::new(&[("sub/b.txt", "")]);
    harness.session.open_folder().await.unwrap();
    harness.backend.reset_metrics().await;

    harness.session.toggle_expansion(&p("sub")).await.unwrap();
    harness.session.toggle_expansion(&p("sub")).await.unwrap();
    harness.session.toggle_expansion(&p("sub")).await.unwrap();

    assert_eq!(harness.backend.metrics().await.read_dir_calls, 1);
    assert_eq!(harness.visible(), vec!["sub", "  b.txt"]);
}

/// Opening a second folder leaves nothing of the first behind
#[tokio::test]
async fn test_rebuild_isolation() {
    let mut harness = ExplorerTestHarness::new(&[("a.txt", "a"), ("sub/b.txt", "b")]);
    harness.memory.add_file("/other/c.txt", "c");

    harness.session.open_folder().await.unwrap();
    harness.session.toggle_expansion(&p("sub")).await.unwrap();
    harness.session.open_file(&p("sub/b.txt")).await.unwrap();
    harness.session.on_content_changed("unsaved".to_string());
    let old_paths: Vec<String> = harness
        .session
        .tree()
        .unwrap()
        .all_nodes()
        .map(|node| node.path.to_string())
        .collect();

    harness.picker.set_root(Some(PathBuf::from("/other")));
    harness.session.open_folder().await.unwrap();

    let tree = harness.session.tree().unwrap();
    for path in &old_paths {
        assert!(tree.get_node_by_path(path).is_none(), "{path} survived");
        assert!(!harness.session.is_dirty(path));
        assert!(!harness.session.tracker().is_expanded(path));
    }
    assert!(harness.session.selected().is_none());
    assert_eq!(harness.visible(), vec!["c.txt"]);
}

#[tokio::test]
async fn test_cancelled_picker_changes_nothing() {
    let mut harness = ExplorerTestHarness::new(&[("a.txt", "a")]);
    harness.session.open_folder().await.unwrap();
    harness.session.open_file(&p("a.txt")).await.unwrap();

    harness.picker.set_root(None);
    let outcome = harness
        .send_key(KeyCode::Char('o'), KeyModifiers::CONTROL)
        .await;
    assert_eq!(outcome, KeyOutcome::Consumed);

    assert_eq!(harness.visible(), vec!["a.txt"]);
    assert_eq!(
        harness.session.selected().unwrap().path.as_str(),
        p("a.txt")
    );
    assert_eq!(harness.session.status_message(), Some("Opened project"));
}

#[tokio::test]
async fn test_revoked_directory_can_be_retried() {
    let mut harness = ExplorerTestHarness::new(&[("locked/secret.txt", "s")]);
    harness.session.open_folder().await.unwrap();

    harness.memory.revoke("/project/locked");
    assert!(harness.session.toggle_expansion(&p("locked")).await.is_err());
    assert!(!harness
        .session
        .tree()
        .unwrap()
        .get_node_by_path(&p("locked"))
        .unwrap()
        .is_loaded());
    assert_eq!(harness.visible(), vec!["locked"]);

    harness.memory.restore("/project/locked");
    assert!(harness.session.toggle_expansion(&p("locked")).await.unwrap());
    assert_eq!(harness.visible(), vec!["locked", "  secret.txt"]);
}

#[tokio::test]
async fn test_switching_files_keeps_unsaved_edits() {
    let mut harness = ExplorerTestHarness::new(&[("a.txt", "a"), ("b.txt", "b")]);
    harness.session.open_folder().await.unwrap();

    harness.session.open_file(&p("a.txt")).await.unwrap();
    harness.session.on_content_changed("a, edited".to_string());
    harness.session.open_file(&p("b.txt")).await.unwrap();
    harness.session.open_file(&p("a.txt")).await.unwrap();

    let shown: Vec<String> = harness
        .surface
        .lock()
        .unwrap()
        .shown
        .iter()
        .map(|(text, _)| text.clone())
        .collect();
    assert_eq!(shown, vec!["a", "b", "a, edited"]);
    assert!(harness.session.is_dirty(&p("a.txt")));
    assert!(!harness.session.is_dirty(&p("b.txt")));
}

#[tokio::test]
async fn test_custom_bindings_from_config() {
    let config = Config::from_json(
        r#"{
            "explorer": { "sort_order": "directories_first", "format_on_save": false },
            "keybindings": [ { "key": "w", "modifiers": ["alt"], "action": "save" } ]
        }"#,
    )
    .unwrap();
    assert_eq!(config.explorer.sort_order, SortOrder::DirectoriesFirst);

    let mut harness =
        ExplorerTestHarness::with_config(&[("z.txt", "z"), ("dir/inner.txt", "")], config);
    harness.session.open_folder().await.unwrap();
    assert_eq!(harness.visible(), vec!["dir", "z.txt"]);

    harness.session.open_file(&p("z.txt")).await.unwrap();
    harness.session.on_content_changed("zz".to_string());

    let outcome = harness
        .send_key(KeyCode::Char('s'), KeyModifiers::CONTROL)
        .await;
    assert_eq!(outcome, KeyOutcome::Ignored);
    assert!(harness.session.is_dirty(&p("z.txt")));

    harness
        .send_key(KeyCode::Char('w'), KeyModifiers::ALT)
        .await;
    assert!(!harness.session.is_dirty(&p("z.txt")));
    assert_eq!(harness.surface.lock().unwrap().format_requests, 0);
}
