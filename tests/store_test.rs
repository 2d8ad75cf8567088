//! バンドルストアの公開 API に関するテスト

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]
#![allow(clippy::indexing_slicing)]
#![allow(missing_docs)]

use std::fs;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::thread;

use i18n_bundle_store::config::StoreSettings;
use i18n_bundle_store::{
    BundleStore,
    CatalogCodec,
    JsonCatalogCodec,
    LanguageCode,
    TranslationSet,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn language(code: &str) -> LanguageCode {
    LanguageCode::new(code).unwrap()
}

fn translations(json: &str) -> TranslationSet {
    serde_json::from_str(json).unwrap()
}

/// `<lang>.lproj/Localizable.json` のレイアウトでデフォルトリソースを書き込む
fn write_defaults(dir: &Path, set: &TranslationSet) {
    for (language, catalog) in set {
        let language_dir = dir.join(format!("{language}.lproj"));
        fs::create_dir_all(&language_dir).unwrap();
        fs::write(language_dir.join("Localizable.json"), JsonCatalogCodec.encode(catalog).unwrap())
            .unwrap();
    }
}

fn create_test_store() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("store");
    let defaults = temp_dir.path().join("Resources");
    write_defaults(
        &defaults,
        &translations(
            r#"{
                "en": {"hello": "HELLO", "goodbye": "GOODBYE"},
                "fr": {"hello": "BONJOUR", "goodbye": "AU REVOIR"}
            }"#,
        ),
    );
    (temp_dir, root, defaults)
}

#[test]
fn test_update_is_visible_per_language_and_keeps_untouched_keys() {
    let (_temp_dir, root, defaults) = create_test_store();
    let store = BundleStore::open(&root, &defaults).unwrap();

    store
        .apply_update(&translations(r#"{"en": {"hello": "Hi"}, "fr": {"hello": "Salut"}}"#))
        .unwrap();

    let en = store.bundle_for_language(&language("en"));
    let fr = store.bundle_for_language(&language("fr"));
    assert_eq!(en.lookup("hello").unwrap().as_deref(), Some("Hi"));
    assert_eq!(fr.lookup("hello").unwrap().as_deref(), Some("Salut"));
    assert_eq!(en.lookup("goodbye").unwrap().as_deref(), Some("GOODBYE"));
    assert_eq!(fr.lookup("goodbye").unwrap().as_deref(), Some("AU REVOIR"));
}

#[test]
fn test_applying_same_update_twice_is_idempotent() {
    let (_temp_dir, root, defaults) = create_test_store();
    let store = BundleStore::open(&root, &defaults).unwrap();
    let update = translations(r#"{"en": {"hello": "Hi", "new": "New"}, "de": {"hello": "Hallo"}}"#);

    store.apply_update(&update).unwrap();
    let once = store.read_translations().unwrap();
    store.apply_update(&update).unwrap();
    let twice = store.read_translations().unwrap();

    assert_eq!(once, twice);
    assert_eq!(twice.len(), 3);
}

#[test]
fn test_bootstrap_matches_defaults() {
    let (_temp_dir, root, defaults) = create_test_store();

    let store = BundleStore::open(&root, &defaults).unwrap();

    let bundle = store.bundle();
    for language in ["en", "fr"] {
        let relative = PathBuf::from(format!("{language}.lproj")).join("Localizable.json");
        assert_eq!(
            fs::read(bundle.path().join(&relative)).unwrap(),
            fs::read(defaults.join(&relative)).unwrap()
        );
    }
    assert_eq!(store.layout().languages(bundle.path()).unwrap().len(), 2);
}

#[test]
fn test_open_removes_stale_and_abandoned_bundles() {
    let (_temp_dir, root, defaults) = create_test_store();
    let first = BundleStore::open(&root, &defaults).unwrap();
    let current = first.apply_update(&translations(r#"{"en": {"hello": "Hi"}}"#)).unwrap();
    drop(first);
    // 途中で終了したプロセスが残したディレクトリ
    fs::create_dir_all(root.join("00000000000000000001.bundle").join("en.lproj")).unwrap();
    fs::create_dir_all(root.join("99999999999999999999.bundle").join("en.lproj")).unwrap();
    fs::create_dir_all(root.join("99999999999999999998.bundle.partial").join("en.lproj")).unwrap();

    let store = BundleStore::open(&root, &defaults).unwrap();

    assert_eq!(store.current_version(), Some(current.clone()));
    let mut entries: Vec<String> = fs::read_dir(&root)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert_eq!(entries, vec![format!("{current}.bundle")]);
}

#[test]
fn test_readers_never_observe_missing_language() {
    let (_temp_dir, root, defaults) = create_test_store();
    let store = Arc::new(BundleStore::open(&root, &defaults).unwrap());
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut reads = 0_usize;
                while !done.load(Ordering::SeqCst) || reads == 0 {
                    for code in ["en", "fr"] {
                        let lease = store.bundle_for_language(&language(code));
                        assert_eq!(lease.language().map(LanguageCode::as_str), Some(code));
                        assert!(lease.lookup("hello").unwrap().is_some());
                    }
                    reads += 1;
                }
                reads
            })
        })
        .collect();

    for round in 0..20 {
        let update = translations(&format!(
            r#"{{"en": {{"hello": "Hi {round}"}}, "fr": {{"hello": "Salut {round}"}}}}"#
        ));
        store.apply_update(&update).unwrap();
    }
    done.store(true, Ordering::SeqCst);

    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }
    assert_eq!(store.pending_deletions(), 0);
    assert_eq!(store.layout().discover().unwrap().len(), 1);
    assert_eq!(
        store.read_catalog(&language("fr")).unwrap().get("hello").map(String::as_str),
        Some("Salut 19")
    );
}

#[test]
fn test_settings_file_changes_layout() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("store");
    let defaults = temp_dir.path().join("Resources");
    fs::create_dir_all(&root).unwrap();
    fs::write(
        root.join(i18n_bundle_store::config::CONFIG_FILE_NAME),
        r#"{"bundleExtension": "strings", "catalogFilename": "Messages.json"}"#,
    )
    .unwrap();
    let language_dir = defaults.join("en.lproj");
    fs::create_dir_all(&language_dir).unwrap();
    fs::write(language_dir.join("Messages.json"), r#"{"hello": "Hello"}"#).unwrap();

    let store = BundleStore::open(&root, &defaults).unwrap();

    let version = store.current_version().unwrap();
    assert!(root.join(format!("{version}.strings")).join("en.lproj").join("Messages.json").is_file());
    assert_eq!(
        store.bundle_for_language(&language("en")).lookup("hello").unwrap().as_deref(),
        Some("Hello")
    );
}

#[test]
fn test_immediate_deletion_when_deferral_disabled() {
    let (_temp_dir, root, defaults) = create_test_store();
    let settings = StoreSettings { defer_deletion: false, ..StoreSettings::default() };
    let store = BundleStore::open_with(&root, &defaults, &settings, Arc::new(JsonCatalogCodec))
        .unwrap();
    let lease = store.bundle();

    store.apply_update(&translations(r#"{"en": {"hello": "Hi"}}"#)).unwrap();

    assert_eq!(store.pending_deletions(), 0);
    assert!(!lease.path().exists());
}

#[test]
fn test_concurrent_updates_keep_both_changes() {
    let (_temp_dir, root, defaults) = create_test_store();
    let store = Arc::new(BundleStore::open(&root, &defaults).unwrap());

    let writers: Vec<_> = [r#"{"en": {"a": "A"}}"#, r#"{"fr": {"b": "B"}}"#]
        .into_iter()
        .map(|json| {
            let store = Arc::clone(&store);
            let update = translations(json);
            thread::spawn(move || store.apply_update(&update).unwrap())
        })
        .collect();
    let mut versions: Vec<_> = writers.into_iter().map(|writer| writer.join().unwrap()).collect();
    versions.sort();
    versions.dedup();

    assert_eq!(versions.len(), 2);
    assert_eq!(store.current_version().as_ref(), versions.last());
    let en = store.read_catalog(&language("en")).unwrap();
    let fr = store.read_catalog(&language("fr")).unwrap();
    assert_eq!(en.get("a").map(String::as_str), Some("A"));
    assert_eq!(fr.get("b").map(String::as_str), Some("B"));
    assert_eq!(en.get("hello").map(String::as_str), Some("HELLO"));
    assert_eq!(fr.get("hello").map(String::as_str), Some("BONJOUR"));
    assert_eq!(store.layout().discover().unwrap().len(), 1);
}
