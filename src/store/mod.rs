//! バージョン付きバンドルストア
//!
//! 更新は次の順序で行う：
//! 1. 現在のバンドルから全言語のカタログを読み込む
//! 2. 更新内容をマージする
//! 3. 新しいバージョンのバンドルを作成する
//! 4. 現在のバンドルを差し替える
//! 5. 以前のバンドルを削除する（読み取り中のリースがあれば最後の解放時まで遅延）
//!
//! 1 または 3 が失敗した場合、現在のバンドルは変更されない。

mod lease;
mod reader;
mod table;

use std::fs;
use std::path::PathBuf;
use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
    PoisonError,
};

pub use lease::BundleLease;
use table::{
    Current,
    VersionTable,
};

use crate::codec::{
    CatalogCodec,
    JsonCatalogCodec,
};
use crate::config::{
    self,
    ConfigError,
    StoreSettings,
};
use crate::error::StoreError;
use crate::layout::BundleLayout;
use crate::materializer::Materializer;
use crate::resolver;
use crate::types::{
    LanguageCatalog,
    LanguageCode,
    TranslationSet,
    merge,
};
use crate::version::{
    BundleVersion,
    VersionClock,
};

/// ストアとリースで共有する状態
#[derive(Debug)]
struct Shared {
    /// ディスク上のレイアウト
    layout: BundleLayout,
    /// カタログのコーデック
    codec: Arc<dyn CatalogCodec>,
    /// 現在のバンドルと参照カウント
    table: Mutex<VersionTable>,
}

impl Shared {
    /// 参照カウント表のロックを取得する
    fn lock_table(&self) -> MutexGuard<'_, VersionTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// ローカライズ済みリソースのバージョン付きストア
///
/// 読み取りは複数スレッドから同時に行えるが、[`BundleStore::apply_update`] は
/// 内部で直列化される。
#[derive(Debug)]
pub struct BundleStore {
    /// リースと共有する状態
    shared: Arc<Shared>,
    /// バージョン名の発行
    clock: VersionClock,
    /// 更新処理の直列化
    update_gate: Mutex<()>,
    /// 初期化時のブートストラップ失敗（読み取り専用で動作中）
    bootstrap_error: Option<StoreError>,
}

impl BundleStore {
    /// `destination_root` の `.bundle-store.json` の設定と JSON コーデックでストアを開く
    ///
    /// # Errors
    /// - 設定ファイルの読み込み・バリデーションエラー
    /// - ルートディレクトリの作成・走査エラー
    pub fn open(
        destination_root: impl Into<PathBuf>,
        default_source: impl Into<PathBuf>,
    ) -> Result<Self, StoreError> {
        let destination_root = destination_root.into();
        let settings = config::load_settings(&destination_root)?;
        Self::open_with(destination_root, default_source, &settings, Arc::new(JsonCatalogCodec))
    }

    /// 設定とコーデックを指定してストアを開く
    ///
    /// 有効なバンドルがなければ `default_source` からブートストラップする。
    /// ブートストラップにも失敗した場合は `default_source` を読み取り専用で参照し、
    /// 以降の更新は [`StoreError::NoWritableStore`] で失敗する。
    ///
    /// # Errors
    /// - 設定のバリデーションエラー
    /// - ルートディレクトリの作成・走査エラー
    pub fn open_with(
        destination_root: impl Into<PathBuf>,
        default_source: impl Into<PathBuf>,
        settings: &StoreSettings,
        codec: Arc<dyn CatalogCodec>,
    ) -> Result<Self, StoreError> {
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        let destination_root = destination_root.into();
        let default_source = default_source.into();
        fs::create_dir_all(&destination_root).map_err(StoreError::io(&destination_root))?;

        let layout = BundleLayout::new(&destination_root, settings);
        let clock = VersionClock::new();
        let candidates = layout.discover().map_err(StoreError::io(&destination_root))?;
        for candidate in &candidates {
            clock.observe(&candidate.version);
        }
        resolver::sweep_staging(&layout);

        let mut bootstrap_error = None;
        let table = if let Some(current) = resolver::resolve_current(&layout, candidates) {
            VersionTable::versioned(current, settings.defer_deletion)
        } else {
            let materializer = Materializer::new(&layout, codec.as_ref());
            match resolver::bootstrap(&materializer, &clock, &default_source) {
                Ok(current) => VersionTable::versioned(current, settings.defer_deletion),
                Err(err) => {
                    tracing::warn!(
                        %err,
                        source = %default_source.display(),
                        "Serving read-only defaults"
                    );
                    bootstrap_error = Some(err);
                    VersionTable::read_only(default_source)
                }
            }
        };

        let store = Self {
            shared: Arc::new(Shared { layout, codec, table: Mutex::new(table) }),
            clock,
            update_gate: Mutex::new(()),
            bootstrap_error,
        };
        tracing::info!(
            root = %destination_root.display(),
            version = ?store.current_version(),
            "Opened bundle store"
        );
        Ok(store)
    }

    /// 現在のバンドルを参照する
    #[must_use]
    pub fn bundle(&self) -> BundleLease {
        let acquired = self.shared.lock_table().acquire();
        BundleLease::new(Arc::clone(&self.shared), acquired.version, None, acquired.path)
    }

    /// 現在のバンドルから指定言語のディレクトリを参照する
    ///
    /// 言語ディレクトリがない場合はバンドルのルートを参照するリースを返す。
    /// 呼び出し側はそのままデフォルト言語へフォールバックできる。
    #[must_use]
    pub fn bundle_for_language(&self, language: &LanguageCode) -> BundleLease {
        let acquired = self.shared.lock_table().acquire();
        let language_dir = self.shared.layout.language_path(&acquired.path, language);

        if language_dir.is_dir() {
            BundleLease::new(
                Arc::clone(&self.shared),
                acquired.version,
                Some(language.clone()),
                language_dir,
            )
        } else {
            tracing::debug!(%language, "Language not found in bundle, using bundle root");
            BundleLease::new(Arc::clone(&self.shared), acquired.version, None, acquired.path)
        }
    }

    /// 翻訳の更新を適用する
    ///
    /// 既存のカタログに `updates` をマージした新しいバンドルを作成し、現在のバンドルと
    /// 差し替える。成功時は新しいバージョンを返す。
    ///
    /// # Errors
    /// - [`StoreError::NoWritableStore`]: 読み取り専用のデフォルトを参照している
    /// - [`StoreError::Io`]: 現在のバンドルの走査やカタログの読み込みに失敗
    /// - [`StoreError::CreationFailure`]: 新しいバンドルの作成に失敗
    pub fn apply_update(&self, updates: &TranslationSet) -> Result<BundleVersion, StoreError> {
        let _gate = self.update_gate.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.bundle();
        let Some(previous) = current.version().cloned() else {
            return Err(StoreError::NoWritableStore);
        };
        let existing = reader::read_translations(
            &self.shared.layout,
            self.shared.codec.as_ref(),
            current.path(),
        )?;
        drop(current);

        let merged = merge(existing, updates);
        let version = self.clock.next_version();
        let directory = Materializer::new(&self.shared.layout, self.shared.codec.as_ref())
            .materialize_from_catalogs(&version, &merged)?;

        let retired = self.shared.lock_table().install(directory);
        tracing::info!(%version, %previous, languages = updates.len(), "Applied translation update");

        if let Some(retired) = retired {
            resolver::remove_bundle(&retired.path);
        }
        Ok(version)
    }

    /// 現在のバンドルの全言語のカタログを読み込む
    ///
    /// # Errors
    /// バンドルディレクトリを走査できない場合
    pub fn read_translations(&self) -> Result<TranslationSet, StoreError> {
        let current = self.bundle();
        reader::read_translations(&self.shared.layout, self.shared.codec.as_ref(), current.path())
    }

    /// 現在のバンドルから 1 言語のカタログを読み込む
    ///
    /// 言語がなければ空のカタログを返す。
    ///
    /// # Errors
    /// カタログファイルが壊れている場合は [`StoreError::DecodeFailure`]、
    /// 読み込みに失敗した場合は [`StoreError::Io`]
    pub fn read_catalog(&self, language: &LanguageCode) -> Result<LanguageCatalog, StoreError> {
        self.bundle_for_language(language).catalog()
    }

    #[must_use]
    pub fn current_version(&self) -> Option<BundleVersion> {
        match self.shared.lock_table().current() {
            Current::Versioned(version) => Some(version.clone()),
            Current::ReadOnly(_) => None,
        }
    }

    /// 更新可能なバンドルを参照しているか
    #[must_use]
    pub fn is_writable(&self) -> bool {
        matches!(self.shared.lock_table().current(), Current::Versioned(_))
    }

    /// 読み取り専用で動作している場合、その原因となったブートストラップエラー
    #[must_use]
    pub const fn bootstrap_error(&self) -> Option<&StoreError> {
        self.bootstrap_error.as_ref()
    }

    /// 読み取り中のリースがあるため削除を待っているバンドルの数
    #[must_use]
    pub fn pending_deletions(&self) -> usize {
        self.shared.lock_table().pending_deletions()
    }

    #[must_use]
    pub fn layout(&self) -> &BundleLayout {
        &self.shared.layout
    }
}
