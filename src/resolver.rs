//! 起動時に現在のバンドルを決定する
//!
//! 最新の有効なバンドルを選び、それ以外の候補はすべて削除する。前回のプロセスが
//! 更新の途中で終了した場合に残ったディレクトリはここで回収される。

use std::fs;
use std::path::Path;

use crate::error::StoreError;
use crate::layout::{
    BundleDirectory,
    BundleLayout,
};
use crate::materializer::Materializer;
use crate::version::VersionClock;

/// 候補の中から現在のバンドルを選ぶ
///
/// `candidates` は新しい順に並んでいる必要がある（[`BundleLayout::discover`] の順序）。
/// 言語ディレクトリを 1 つ以上持つ最新の候補を返し、それ以外の候補はディスクから削除する。
/// 有効な候補がなければ `None` を返す。
pub fn resolve_current(
    layout: &BundleLayout,
    candidates: Vec<BundleDirectory>,
) -> Option<BundleDirectory> {
    let mut current = None;

    for candidate in candidates {
        if current.is_none() && layout.is_valid_bundle(&candidate.path) {
            tracing::debug!(version = %candidate.version, "Resolved current bundle");
            current = Some(candidate);
            continue;
        }

        tracing::info!(
            version = %candidate.version,
            path = %candidate.path.display(),
            "Removing stale bundle"
        );
        remove_bundle(&candidate.path);
    }

    current
}

/// 前回のプロセスが残したステージングディレクトリを削除する
pub fn sweep_staging(layout: &BundleLayout) {
    let staging = match layout.discover_staging() {
        Ok(staging) => staging,
        Err(err) => {
            tracing::warn!(root = %layout.root().display(), %err, "Failed to list staging bundles");
            return;
        }
    };

    for path in staging {
        tracing::info!(path = %path.display(), "Removing abandoned staging bundle");
        remove_bundle(&path);
    }
}

/// デフォルトリソースから新しいバージョンのバンドルを作成する
///
/// # Errors
/// コピーに失敗した場合は [`StoreError::BootstrapFailure`]
pub fn bootstrap(
    materializer: &Materializer<'_>,
    clock: &VersionClock,
    default_source: &Path,
) -> Result<BundleDirectory, StoreError> {
    let version = clock.next_version();
    tracing::info!(%version, source = %default_source.display(), "Bootstrapping bundle from defaults");

    materializer
        .materialize_from_source(&version, default_source)
        .map_err(|err| StoreError::BootstrapFailure { source: Box::new(err) })
}

/// バンドルディレクトリを削除する
///
/// 失敗してもログを出すだけで、次回起動時の [`resolve_current`] で再度回収される。
pub fn remove_bundle(path: &Path) {
    match fs::remove_dir_all(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed bundle"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => tracing::warn!(path = %path.display(), %err, "Failed to remove bundle"),
    }
}
