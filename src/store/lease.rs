//! 読み取り用のバンドル参照

use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use super::Shared;
use super::reader;
use crate::error::StoreError;
use crate::resolver::remove_bundle;
use crate::types::{
    LanguageCatalog,
    LanguageCode,
};
use crate::version::BundleVersion;

/// バンドル（または言語ディレクトリ）への読み取り参照
///
/// リースが生きている間、参照先のバンドルは差し替え後も削除されない。
/// ドロップ時に参照カウントを減らし、削除待ちのバンドルの最後のリースであれば
/// ディレクトリを削除する。
#[derive(Debug)]
pub struct BundleLease {
    /// ストアの共有状態
    shared: Arc<Shared>,
    /// 参照しているバージョン（読み取り専用のデフォルトでは `None`）
    version: Option<BundleVersion>,
    /// 参照先の言語（言語ディレクトリが見つからなかった場合は `None`）
    language: Option<LanguageCode>,
    /// 参照先のパス
    path: PathBuf,
}

impl BundleLease {
    pub(super) const fn new(
        shared: Arc<Shared>,
        version: Option<BundleVersion>,
        language: Option<LanguageCode>,
        path: PathBuf,
    ) -> Self {
        Self { shared, version, language, path }
    }

    /// バンドルのルート、または言語ディレクトリのパス
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn version(&self) -> Option<&BundleVersion> {
        self.version.as_ref()
    }

    /// 言語ディレクトリを参照している場合はその言語
    #[must_use]
    pub const fn language(&self) -> Option<&LanguageCode> {
        self.language.as_ref()
    }

    /// 参照している言語のカタログを読み込む
    ///
    /// バンドルのルートを参照している場合は空のカタログを返す。
    ///
    /// # Errors
    /// カタログファイルが壊れている場合は [`StoreError::DecodeFailure`]、
    /// 読み込みに失敗した場合は [`StoreError::Io`]
    pub fn catalog(&self) -> Result<LanguageCatalog, StoreError> {
        match &self.language {
            Some(language) => reader::read_catalog(
                &self.shared.layout,
                self.shared.codec.as_ref(),
                language,
                &self.path,
            ),
            None => Ok(LanguageCatalog::new()),
        }
    }

    /// キーに対応する翻訳を探す
    ///
    /// # Errors
    /// カタログファイルが壊れている場合は [`StoreError::DecodeFailure`]、
    /// 読み込みに失敗した場合は [`StoreError::Io`]
    pub fn lookup(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.catalog()?.remove(key))
    }
}

impl Drop for BundleLease {
    fn drop(&mut self) {
        let Some(version) = &self.version else {
            return;
        };
        let expired = self.shared.lock_table().release(version);
        if let Some(directory) = expired {
            tracing::debug!(version = %directory.version, "Last reader released superseded bundle");
            remove_bundle(&directory.path);
        }
    }
}
