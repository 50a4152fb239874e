use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use quickglyph_core::config::{Config, UsageBackend};
use quickglyph_core::emitter::RecordingSink;
use quickglyph_core::runtime::{build_controller, load_items, open_usage_persistence};
use quickglyph_core::scheduler::DeferredQueue;
use quickglyph_core::usage_store::UsagePersistence;

fn unique_dir(label: &str) -> std::path::PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "quickglyph-{label}-{}-{unique}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn default_config_uses_builtin_library() {
    let items = load_items(&Config::default()).unwrap();
    assert!(items.iter().any(|item| item.id == "smile"));
}

#[test]
fn controller_usage_survives_rebuild_with_json_backend() {
    let dir = unique_dir("runtime-json");
    let cfg = Config {
        usage_backend: UsageBackend::Json,
        usage_path: dir.join("usage.json"),
        config_path: dir.join("config.toml"),
        ..Config::default()
    };

    {
        let queue = DeferredQueue::new();
        let sink = RecordingSink::default();
        let mut controller =
            build_controller(&cfg, Arc::new(sink.clone()), Box::new(queue.clone())).unwrap();
        controller.set_query("rocket");
        let committed = controller.commit().unwrap();
        assert_eq!(committed.id, "rocket");
        queue.run_all();
        assert_eq!(sink.emitted(), vec!["🚀".to_string()]);
    }

    let queue = DeferredQueue::new();
    let mut controller =
        build_controller(&cfg, Arc::new(RecordingSink::default()), Box::new(queue)).unwrap();
    controller.set_query("");
    assert_eq!(controller.highlighted_item().unwrap().id, "rocket");
    assert_eq!(controller.usages().get("rocket").unwrap().count, 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn sqlite_backend_opens_at_configured_path() {
    let dir = unique_dir("runtime-sqlite");
    let cfg = Config {
        usage_path: dir.join("usage.sqlite3"),
        ..Config::default()
    };

    let persistence = open_usage_persistence(&cfg).unwrap();
    assert!(persistence.load().unwrap().is_empty());
    assert!(cfg.usage_path.exists());

    drop(persistence);
    std::fs::remove_dir_all(&dir).unwrap();
}
