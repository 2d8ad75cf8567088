use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "bundleExtension")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// On-disk layout and retention settings.
///
/// The layout is `<root>/<version>.<bundleExtension>/<lang>.<languageSuffix>/<catalogFilename>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSettings {
    pub bundle_extension: String,
    pub language_suffix: String,
    pub catalog_filename: String,

    /// Wait for the last outstanding reader before deleting a superseded bundle.
    ///
    /// When disabled, superseded bundles are deleted right after the swap and
    /// open readers rely on the platform keeping unlinked files readable.
    pub defer_deletion: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            bundle_extension: "bundle".to_string(),
            language_suffix: "lproj".to_string(),
            catalog_filename: "Localizable.json".to_string(),
            defer_deletion: true,
        }
    }
}

impl StoreSettings {
    /// # Errors
    /// - Required field is empty
    /// - Field contains a path separator
    /// - Bundle extension and language suffix are the same
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (field_path, value) in [
            ("bundleExtension", &self.bundle_extension),
            ("languageSuffix", &self.language_suffix),
            ("catalogFilename", &self.catalog_filename),
        ] {
            if value.is_empty() {
                errors.push(ValidationError::new(field_path, "The value cannot be empty"));
            } else if value.contains(['/', '\\', '\0']) {
                errors.push(ValidationError::new(
                    field_path,
                    format!("'{value}' must be a single path component"),
                ));
            }
        }

        for (field_path, value) in
            [("bundleExtension", &self.bundle_extension), ("languageSuffix", &self.language_suffix)]
        {
            if value.contains('.') {
                errors.push(ValidationError::new(
                    field_path,
                    format!("'{value}' must not contain '.'. Specify the extension without a leading dot, for example: \"bundle\""),
                ));
            }
        }

        if !self.bundle_extension.is_empty() && self.bundle_extension == self.language_suffix {
            errors.push(ValidationError::new(
                "bundleExtension/languageSuffix",
                "Bundle directories and language directories must use different extensions",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
