//! 缓存系统集成测试
//!
//! 覆盖 redb 持久化、损坏记录降级与会话间共享

mod common;

use std::sync::Arc;

use autotranslate::translation::{
    AutoTranslator, KeyValueStore, RedbStore, TranslationCache, TranslatorConfig,
};
use common::{HtmlTestHelper, RecordingBackend, TestEnvironment};

fn open_store(dir: &tempfile::TempDir) -> Arc<dyn KeyValueStore> {
    Arc::new(RedbStore::open(&dir.path().join("nested").join("cache.redb")).unwrap())
}

#[test]
fn test_save_then_load_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();

    {
        let cache = TranslationCache::open(open_store(&dir), "translation_cache");
        cache.set("Episode 1", "Episódio 1");
        cache.set("Currently Airing", "Em exibição");
        cache.save();
    }

    let reopened = TranslationCache::open(open_store(&dir), "translation_cache");
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.get("Episode 1").as_deref(), Some("Episódio 1"));
    assert_eq!(reopened.get("Currently Airing").as_deref(), Some("Em exibição"));
}

#[test]
fn test_record_is_a_single_json_object() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let cache = TranslationCache::new(Arc::clone(&store), "translation_cache");
    cache.set("Season", "Temporada");
    cache.save();

    let raw = store.get("translation_cache").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value, serde_json::json!({ "Season": "Temporada" }));
}

#[test]
fn test_malformed_record_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.set("translation_cache", "[not, an object").unwrap();

    let cache = TranslationCache::open(Arc::clone(&store), "translation_cache");
    assert!(cache.is_empty());

    // 下一次保存覆盖损坏的记录
    cache.set("Season", "Temporada");
    cache.save();
    let reopened = TranslationCache::open(store, "translation_cache");
    assert_eq!(reopened.get("Season").as_deref(), Some("Temporada"));
}

#[test]
fn test_clear_removes_the_persisted_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let cache = TranslationCache::open(Arc::clone(&store), "translation_cache");
    cache.set("Season", "Temporada");
    cache.save();
    cache.clear();

    assert!(store.get("translation_cache").unwrap().is_none());
    assert!(TranslationCache::open(store, "translation_cache").is_empty());
}

#[tokio::test]
async fn test_text_and_attribute_paths_share_one_cache() {
    let backend = RecordingBackend::new();
    let env = TestEnvironment::new(backend.clone(), 50);
    let dom = HtmlTestHelper::parse(
        "<body><p>Cover of the season</p><img alt=\"Cover of the season\"></body>",
    );

    env.translator.translate_tree(&dom.document).await;

    // 正文路径写入的缓存被属性路径直接命中
    assert_eq!(backend.call_count(), 1);
    let html = HtmlTestHelper::render(&dom);
    assert!(html.contains("<p>pt:Cover of the season</p>"));
    assert!(html.contains("alt=\"pt:Cover of the season\""));
    assert_eq!(env.control.cache_stats().total_entries, 1);
}

#[test]
fn test_from_config_opens_the_configured_cache_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.redb");

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(RedbStore::open(&path).unwrap());
        let cache = TranslationCache::new(store, "translation_cache");
        cache.set("Season", "Temporada");
        cache.save();
    }

    let config = TranslatorConfig {
        cache_path: Some(path.to_string_lossy().into_owned()),
        ..TranslatorConfig::default()
    };
    let translator = AutoTranslator::from_config(&config).unwrap();
    assert_eq!(translator.control().cache_size(), 1);
}
