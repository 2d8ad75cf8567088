//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use crate::codec::{
    CatalogCodec,
    JsonCatalogCodec,
};
use crate::types::{
    LanguageCatalog,
    LanguageCode,
    TranslationSet,
};

/// キーと値のペアからカタログを作成する
pub(crate) fn catalog(entries: &[(&str, &str)]) -> LanguageCatalog {
    entries.iter().map(|(key, text)| ((*key).to_string(), (*text).to_string())).collect()
}

/// 言語コードとカタログのペアから `TranslationSet` を作成する
///
/// # Arguments
/// * `languages` - 言語コード（例: "en", "ja"）とキー・値のペア
pub(crate) fn translation_set(languages: &[(&str, &[(&str, &str)])]) -> TranslationSet {
    languages
        .iter()
        .map(|(code, entries)| (LanguageCode::new(*code).unwrap(), catalog(entries)))
        .collect()
}

/// デフォルトのレイアウト（`<lang>.lproj/Localizable.json`）でバンドルを書き込む
pub(crate) fn write_source_bundle(dir: &Path, translations: &TranslationSet) {
    for (language, entries) in translations {
        let language_dir = dir.join(format!("{language}.lproj"));
        fs::create_dir_all(&language_dir).unwrap();
        fs::write(
            language_dir.join("Localizable.json"),
            JsonCatalogCodec.encode(entries).unwrap(),
        )
        .unwrap();
    }
}

/// カタログファイルを読み込む
pub(crate) fn read_catalog_file(path: &Path) -> LanguageCatalog {
    JsonCatalogCodec.decode(&fs::read(path).unwrap()).unwrap()
}
