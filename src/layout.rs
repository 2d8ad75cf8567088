//! On-disk layout of the store.
//!
//! ```text
//! <root>/<version>.<bundleExtension>/<lang>.<languageSuffix>/<catalogFilename>
//! ```
//!
//! The directory listing of `<root>` is the source of truth: candidates are
//! found by listing the root, keeping entries with the bundle extension, and
//! sorting them by name, newest first.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{
    Path,
    PathBuf,
};

use crate::config::StoreSettings;
use crate::types::LanguageCode;
use crate::version::BundleVersion;

/// Extension of directories that are still being populated.
const STAGING_EXTENSION: &str = "partial";

/// One versioned bundle directory on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleDirectory {
    pub version: BundleVersion,
    pub path: PathBuf,
}

/// A `<lang>.<languageSuffix>` directory inside a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDirectory {
    pub language: LanguageCode,
    pub path: PathBuf,
}

/// Builds and discovers paths under the destination root.
#[derive(Debug, Clone)]
pub struct BundleLayout {
    /// Destination root holding every bundle generation
    root: PathBuf,
    /// Extension of bundle directories (without dot)
    bundle_extension: String,
    /// Extension of per-language directories (without dot)
    language_suffix: String,
    /// File name of the catalog inside a language directory
    catalog_filename: String,
}

impl BundleLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, settings: &StoreSettings) -> Self {
        Self {
            root: root.into(),
            bundle_extension: settings.bundle_extension.clone(),
            language_suffix: settings.language_suffix.clone(),
            catalog_filename: settings.catalog_filename.clone(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<version>.<bundleExtension>`
    #[must_use]
    pub fn bundle_path(&self, version: &BundleVersion) -> PathBuf {
        self.root.join(format!("{version}.{}", self.bundle_extension))
    }

    /// Where a bundle is built before it is renamed into place.
    ///
    /// The extra extension keeps it out of [`Self::discover`].
    #[must_use]
    pub fn staging_path(&self, version: &BundleVersion) -> PathBuf {
        self.root.join(format!("{version}.{}.{STAGING_EXTENSION}", self.bundle_extension))
    }

    /// `<bundle>/<lang>.<languageSuffix>`
    #[must_use]
    pub fn language_path(&self, bundle: &Path, language: &LanguageCode) -> PathBuf {
        bundle.join(format!("{language}.{}", self.language_suffix))
    }

    /// `<language directory>/<catalogFilename>`
    #[must_use]
    pub fn catalog_path(&self, language_dir: &Path) -> PathBuf {
        language_dir.join(&self.catalog_filename)
    }

    /// Lists bundle directories under the root, newest first.
    ///
    /// A missing root yields no candidates.
    ///
    /// # Errors
    /// Returns an error if the root exists but cannot be listed.
    pub fn discover(&self) -> io::Result<Vec<BundleDirectory>> {
        let mut candidates: Vec<BundleDirectory> =
            missing_as_empty(list_directories(&self.root, &self.bundle_extension))?
                .into_iter()
                .map(|(stem, path)| BundleDirectory { version: BundleVersion::from_name(stem), path })
                .collect();
        candidates.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(candidates)
    }

    /// Lists leftover staging directories under the root.
    ///
    /// A missing root yields nothing.
    ///
    /// # Errors
    /// Returns an error if the root exists but cannot be listed.
    pub fn discover_staging(&self) -> io::Result<Vec<PathBuf>> {
        let bundle_suffix = format!(".{}", self.bundle_extension);
        Ok(missing_as_empty(list_directories(&self.root, STAGING_EXTENSION))?
            .into_iter()
            .filter(|(stem, _)| stem.ends_with(&bundle_suffix))
            .map(|(_, path)| path)
            .collect())
    }

    /// Lists the language directories of a bundle, sorted by language code.
    ///
    /// Directories whose stem is not a usable language code are ignored.
    ///
    /// # Errors
    /// Returns an error if `bundle` cannot be listed, including when it no
    /// longer exists.
    pub fn languages(&self, bundle: &Path) -> io::Result<Vec<LanguageDirectory>> {
        let mut languages: Vec<LanguageDirectory> =
            list_directories(bundle, &self.language_suffix)?
                .into_iter()
                .filter_map(|(stem, path)| match LanguageCode::new(stem) {
                    Ok(language) => Some(LanguageDirectory { language, path }),
                    Err(err) => {
                        tracing::debug!(path = %path.display(), %err, "Ignoring language directory");
                        None
                    }
                })
                .collect();
        languages.sort_by(|a, b| a.language.cmp(&b.language));
        Ok(languages)
    }

    /// A bundle is valid when at least one language directory holds a catalog file.
    #[must_use]
    pub fn is_valid_bundle(&self, bundle: &Path) -> bool {
        match self.languages(bundle) {
            Ok(languages) => {
                languages.iter().any(|language| self.catalog_path(&language.path).is_file())
            }
            Err(err) => {
                tracing::debug!(path = %bundle.display(), %err, "Failed to list bundle");
                false
            }
        }
    }
}

/// 存在しないディレクトリの一覧を空として扱う
fn missing_as_empty<T>(listed: io::Result<Vec<T>>) -> io::Result<Vec<T>> {
    match listed {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        other => other,
    }
}

/// Lists sub-directories of `dir` with the given extension as `(stem, path)`.
fn list_directories(dir: &Path, extension: &str) -> io::Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir)?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();
        if path.extension() != Some(OsStr::new(extension)) || !path.is_dir() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(OsStr::to_str) else {
            continue;
        };
        found.push((stem.to_string(), path));
    }
    Ok(found)
}
