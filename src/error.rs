//! ストア全体で使用するエラー型

use std::path::PathBuf;

use thiserror::Error;

use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::types::LanguageCode;

/// カタログファイルの作成で発生するエラー
#[derive(Error, Debug)]
pub enum CatalogIoError {
    /// ファイルシステムのエラー
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// エンコード・デコードのエラー
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// バンドルストアのエラー
#[derive(Error, Debug)]
pub enum StoreError {
    /// ソースバンドルからのコピーに失敗
    #[error("Failed to copy bundle into '{}': {source}", .path.display())]
    CopyFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// カタログのエンコードまたは書き込みに失敗
    #[error("Failed to create catalog '{}': {source}", .path.display())]
    CreationFailure {
        path: PathBuf,
        #[source]
        source: CatalogIoError,
    },

    /// 既存のカタログファイルが壊れている
    #[error("Failed to decode catalog for '{language}' at '{}': {source}", .path.display())]
    DecodeFailure {
        language: LanguageCode,
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// 有効なバンドルがなく、デフォルトリソースのコピーにも失敗
    #[error("Failed to bootstrap bundle store from defaults: {source}")]
    BootstrapFailure {
        #[source]
        source: Box<StoreError>,
    },

    /// 読み取り専用のデフォルトリソースを参照しているため更新できない
    #[error("Bundle store is serving read-only defaults and cannot be updated")]
    NoWritableStore,

    /// バンドルディレクトリの走査やカタログ読み込みなどのファイルシステムエラー
    #[error("I/O error at '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl StoreError {
    /// パス付きの I/O エラーを作成するクロージャを返す
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
