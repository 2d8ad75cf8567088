//! Reading catalogs back out of a bundle directory.

use std::fs;
use std::io;
use std::path::Path;

use crate::codec::CatalogCodec;
use crate::error::StoreError;
use crate::layout::BundleLayout;
use crate::types::{
    LanguageCatalog,
    LanguageCode,
    TranslationSet,
};

/// Reads one language directory's catalog.
///
/// A missing catalog file is an empty catalog. Only a catalog that cannot be
/// decoded yields [`StoreError::DecodeFailure`]; any other read error is
/// reported as [`StoreError::Io`].
pub(crate) fn read_catalog(
    layout: &BundleLayout,
    codec: &dyn CatalogCodec,
    language: &LanguageCode,
    language_dir: &Path,
) -> Result<LanguageCatalog, StoreError> {
    let path = layout.catalog_path(language_dir);

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(LanguageCatalog::new()),
        Err(source) => return Err(StoreError::Io { path, source }),
    };
    codec.decode(&bytes).map_err(|source| StoreError::DecodeFailure {
        language: language.clone(),
        path,
        source,
    })
}

/// Reads every language catalog in `bundle`.
///
/// Languages whose catalog cannot be decoded are skipped with a warning.
/// I/O failures, including a bundle that no longer exists, are returned so
/// that an update never proceeds from a partial view.
pub(crate) fn read_translations(
    layout: &BundleLayout,
    codec: &dyn CatalogCodec,
    bundle: &Path,
) -> Result<TranslationSet, StoreError> {
    let mut translations = TranslationSet::new();

    for language in layout.languages(bundle).map_err(StoreError::io(bundle))? {
        match read_catalog(layout, codec, &language.language, &language.path) {
            Ok(catalog) => {
                translations.insert(language.language, catalog);
            }
            Err(err @ StoreError::DecodeFailure { .. }) => {
                tracing::warn!(%err, "Skipping undecodable catalog");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(translations)
}
