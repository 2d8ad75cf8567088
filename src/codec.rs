//! Catalog serialization.
//!
//! The store treats catalog files as opaque bytes; a [`CatalogCodec`] turns
//! them into a [`LanguageCatalog`] and back.

use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::types::LanguageCatalog;

/// Current format marker written by [`JsonCatalogCodec`].
pub const CATALOG_FORMAT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Unsupported catalog format marker: {found}")]
    UnsupportedFormat { found: u32 },
}

/// Encodes and decodes a single language's catalog.
pub trait CatalogCodec: fmt::Debug + Send + Sync {
    /// # Errors
    /// Returns an error if the catalog cannot be serialized.
    fn encode(&self, catalog: &LanguageCatalog) -> Result<Vec<u8>, CodecError>;

    /// # Errors
    /// Returns an error if `bytes` is not a catalog this codec understands.
    fn decode(&self, bytes: &[u8]) -> Result<LanguageCatalog, CodecError>;
}

/// JSON catalog files.
///
/// Writes `{"format": 1, "entries": {...}}`. Also reads plain
/// `{"key": "text"}` objects written before the format marker existed.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCatalogCodec;

/// Borrowed envelope used when encoding.
#[derive(Serialize)]
struct EnvelopeRef<'a> {
    /// Format marker
    format: u32,
    /// Catalog entries
    entries: &'a LanguageCatalog,
}

/// Accepted on-disk shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCatalog {
    /// Catalog with a format marker
    Versioned {
        /// Format marker
        format: u32,
        /// Catalog entries
        entries: LanguageCatalog,
    },
    /// Bare key/text object
    Legacy(LanguageCatalog),
}

impl CatalogCodec for JsonCatalogCodec {
    fn encode(&self, catalog: &LanguageCatalog) -> Result<Vec<u8>, CodecError> {
        let envelope = EnvelopeRef { format: CATALOG_FORMAT_VERSION, entries: catalog };
        serde_json::to_vec_pretty(&envelope).map_err(CodecError::Serialize)
    }

    fn decode(&self, bytes: &[u8]) -> Result<LanguageCatalog, CodecError> {
        match serde_json::from_slice(bytes).map_err(CodecError::Parse)? {
            StoredCatalog::Versioned { format, entries } if format == CATALOG_FORMAT_VERSION => {
                Ok(entries)
            }
            StoredCatalog::Versioned { format, .. } => {
                Err(CodecError::UnsupportedFormat { found: format })
            }
            StoredCatalog::Legacy(entries) => Ok(entries),
        }
    }
}
