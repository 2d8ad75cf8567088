//! 新しいバージョンのバンドルディレクトリを作成する
//!
//! バンドルはステージングディレクトリ（`<version>.<ext>.partial`）に書き込まれ、
//! すべての言語が揃ってから最終パスへリネームされる。途中で失敗した場合は
//! ステージングディレクトリを削除し、最終パスには何も残さない。

use std::fs;
use std::io;
use std::path::Path;

use crate::codec::CatalogCodec;
use crate::error::{
    CatalogIoError,
    StoreError,
};
use crate::layout::{
    BundleDirectory,
    BundleLayout,
};
use crate::types::TranslationSet;
use crate::version::BundleVersion;

/// バンドルディレクトリの作成を担当する
#[derive(Debug, Clone, Copy)]
pub struct Materializer<'a> {
    /// パスの組み立てに使うレイアウト
    layout: &'a BundleLayout,
    /// カタログのエンコードに使うコーデック
    codec: &'a dyn CatalogCodec,
}

impl<'a> Materializer<'a> {
    #[must_use]
    pub const fn new(layout: &'a BundleLayout, codec: &'a dyn CatalogCodec) -> Self {
        Self { layout, codec }
    }

    /// ソースディレクトリの各言語のカタログファイルをコピーして新しいバンドルを作成する
    ///
    /// カタログファイルが存在しない、または読み込めない言語はスキップする。
    ///
    /// # Errors
    /// ソースの走査、コピー先の作成・書き込み、既存の途中ディレクトリの削除に
    /// 失敗した場合は [`StoreError::CopyFailure`]
    pub fn materialize_from_source(
        &self,
        version: &BundleVersion,
        source: &Path,
    ) -> Result<BundleDirectory, StoreError> {
        let copy_failure = |path: &Path| {
            let path = path.to_path_buf();
            move |source: io::Error| StoreError::CopyFailure { path, source }
        };

        if !source.is_dir() {
            return Err(StoreError::CopyFailure {
                path: source.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "source bundle does not exist"),
            });
        }
        let languages = self.layout.languages(source).map_err(copy_failure(source))?;

        self.build(version, copy_failure, |staging| {
            for language in &languages {
                let source_catalog = self.layout.catalog_path(&language.path);
                let bytes = match fs::read(&source_catalog) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        tracing::debug!(
                            language = %language.language,
                            path = %source_catalog.display(),
                            %err,
                            "Skipping language without readable catalog"
                        );
                        continue;
                    }
                };

                let destination = self.layout.language_path(staging, &language.language);
                fs::create_dir(&destination).map_err(copy_failure(&destination))?;
                let destination_catalog = self.layout.catalog_path(&destination);
                fs::write(&destination_catalog, bytes)
                    .map_err(copy_failure(&destination_catalog))?;
            }
            Ok(())
        })
    }

    /// メモリ上のカタログをエンコードして新しいバンドルを作成する
    ///
    /// # Errors
    /// エンコードまたは書き込みに失敗した場合は [`StoreError::CreationFailure`]
    pub fn materialize_from_catalogs(
        &self,
        version: &BundleVersion,
        translations: &TranslationSet,
    ) -> Result<BundleDirectory, StoreError> {
        let creation_failure = |path: &Path| {
            let path = path.to_path_buf();
            move |source: io::Error| StoreError::CreationFailure {
                path,
                source: CatalogIoError::Io(source),
            }
        };

        self.build(version, creation_failure, |staging| {
            for (language, catalog) in translations {
                let destination = self.layout.language_path(staging, language);
                let destination_catalog = self.layout.catalog_path(&destination);
                let bytes =
                    self.codec.encode(catalog).map_err(|source| StoreError::CreationFailure {
                        path: destination_catalog.clone(),
                        source: CatalogIoError::Codec(source),
                    })?;

                fs::create_dir(&destination).map_err(creation_failure(&destination))?;
                fs::write(&destination_catalog, bytes)
                    .map_err(creation_failure(&destination_catalog))?;
            }
            Ok(())
        })
    }

    /// ステージングディレクトリで `populate` を実行し、成功したら最終パスへリネームする
    fn build<E, F, P>(
        &self,
        version: &BundleVersion,
        failure: F,
        populate: P,
    ) -> Result<BundleDirectory, StoreError>
    where
        F: Fn(&Path) -> E,
        E: FnOnce(io::Error) -> StoreError,
        P: FnOnce(&Path) -> Result<(), StoreError>,
    {
        let staging = self.layout.staging_path(version);
        let target = self.layout.bundle_path(version);

        // 前回のプロセスが残した途中のディレクトリを先に片付ける
        clear(&staging).map_err(failure(&staging))?;
        clear(&target).map_err(failure(&target))?;

        fs::create_dir_all(&staging).map_err(failure(&staging))?;

        let populated = populate(&staging)
            .and_then(|()| fs::rename(&staging, &target).map_err(failure(&target)));
        if let Err(err) = populated {
            discard(&staging);
            return Err(err);
        }

        tracing::debug!(%version, path = %target.display(), "Materialized bundle");
        Ok(BundleDirectory { version: version.clone(), path: target })
    }
}

/// ディレクトリが存在すれば削除する
fn clear(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// 失敗したステージングディレクトリを削除する（失敗してもログのみ）
fn discard(path: &Path) {
    if let Err(err) = clear(path) {
        tracing::warn!(path = %path.display(), %err, "Failed to remove partial bundle");
    }
}
