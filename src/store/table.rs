//! バージョンごとの参照カウント表
//!
//! 現在のバンドルはこの表の 1 つのキー（[`BundleVersion`]）で表される。
//! 差し替えはロック下での 1 回の代入で行われ、古いバンドルは読み取り中の
//! リースがなくなった時点で削除対象として返される。

use std::collections::HashMap;
use std::path::PathBuf;

use crate::layout::BundleDirectory;
use crate::version::BundleVersion;

/// 現在参照しているバンドル
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Current {
    /// 更新可能なバージョン付きバンドル
    Versioned(BundleVersion),
    /// 読み取り専用のデフォルトリソース
    ReadOnly(PathBuf),
}

/// 表の 1 行
#[derive(Debug)]
struct Entry {
    /// バンドルディレクトリ
    directory: BundleDirectory,
    /// 未解放のリース数
    readers: usize,
    /// 差し替え済みで削除待ちかどうか
    retired: bool,
}

/// リース取得時に返す参照先
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Acquired {
    /// バージョン（読み取り専用のデフォルトでは `None`）
    pub(crate) version: Option<BundleVersion>,
    /// バンドルのルートパス
    pub(crate) path: PathBuf,
}

/// バージョンをキーにした参照カウント表
#[derive(Debug)]
pub(crate) struct VersionTable {
    /// 現在のバンドル
    current: Current,
    /// 現在および削除待ちのバンドル
    entries: HashMap<BundleVersion, Entry>,
    /// 読み取り中のリースがなくなるまで削除を遅らせるか
    defer_deletion: bool,
}

impl VersionTable {
    /// バージョン付きバンドルを現在として表を作成する
    pub(crate) fn versioned(directory: BundleDirectory, defer_deletion: bool) -> Self {
        let version = directory.version.clone();
        let mut entries = HashMap::new();
        entries.insert(version.clone(), Entry { directory, readers: 0, retired: false });
        Self { current: Current::Versioned(version), entries, defer_deletion }
    }

    /// 読み取り専用のデフォルトリソースを現在として表を作成する
    pub(crate) fn read_only(path: PathBuf) -> Self {
        Self { current: Current::ReadOnly(path), entries: HashMap::new(), defer_deletion: true }
    }

    pub(crate) const fn current(&self) -> &Current {
        &self.current
    }

    /// 現在のバンドルを参照し、リース数を増やす
    pub(crate) fn acquire(&mut self) -> Acquired {
        match &self.current {
            Current::ReadOnly(path) => Acquired { version: None, path: path.clone() },
            Current::Versioned(version) => {
                let path = match self.entries.get_mut(version) {
                    Some(entry) => {
                        entry.readers += 1;
                        entry.directory.path.clone()
                    }
                    None => PathBuf::new(),
                };
                Acquired { version: Some(version.clone()), path }
            }
        }
    }

    /// リースを解放する
    ///
    /// 削除待ちのバンドルの最後のリースだった場合、削除すべきディレクトリを返す。
    pub(crate) fn release(&mut self, version: &BundleVersion) -> Option<BundleDirectory> {
        let entry = self.entries.get_mut(version)?;
        entry.readers = entry.readers.saturating_sub(1);
        if entry.retired && entry.readers == 0 {
            return self.entries.remove(version).map(|entry| entry.directory);
        }
        None
    }

    /// 新しいバンドルを現在に差し替える
    ///
    /// 以前のバンドルをすぐに削除してよい場合はそのディレクトリを返す。
    pub(crate) fn install(&mut self, directory: BundleDirectory) -> Option<BundleDirectory> {
        let version = directory.version.clone();
        self.entries.insert(version.clone(), Entry { directory, readers: 0, retired: false });

        let previous = std::mem::replace(&mut self.current, Current::Versioned(version));
        let Current::Versioned(previous) = previous else {
            return None;
        };

        let entry = self.entries.get_mut(&previous)?;
        entry.retired = true;
        if entry.readers == 0 || !self.defer_deletion {
            return self.entries.remove(&previous).map(|entry| entry.directory);
        }
        tracing::debug!(
            version = %previous,
            readers = entry.readers,
            "Deferring deletion of superseded bundle"
        );
        None
    }

    /// 削除待ちのバンドル数
    pub(crate) fn pending_deletions(&self) -> usize {
        self.entries.values().filter(|entry| entry.retired).count()
    }

    /// 指定バージョンの未解放リース数
    #[cfg(test)]
    pub(crate) fn readers(&self, version: &BundleVersion) -> usize {
        self.entries.get(version).map_or(0, |entry| entry.readers)
    }
}
