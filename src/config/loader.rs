//! 設定ファイルの読み込み関数

use std::path::Path;

use super::{
    ConfigError,
    StoreSettings,
};

/// 設定ファイル名
pub const CONFIG_FILE_NAME: &str = ".bundle-store.json";

/// ストアのルートディレクトリから設定を読み込む
///
/// `.bundle-store.json` ファイルを探して読み込み、バリデーションする
///
/// # Arguments
/// * `destination_root` - バンドルを格納するルートディレクトリ
///
/// # Returns
/// - `Ok(settings)`: 設定ファイルの内容、またはファイルがない場合はデフォルト値
/// - `Err(ConfigError)`: ファイル読み込み、パース、またはバリデーションエラー
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
/// - バリデーションエラー
pub fn load_settings(destination_root: &Path) -> Result<StoreSettings, ConfigError> {
    let config_path = destination_root.join(CONFIG_FILE_NAME);

    let settings = if config_path.exists() {
        tracing::debug!("Loading configuration from: {:?}", config_path);
        let content = std::fs::read_to_string(&config_path)?;
        serde_json::from_str::<StoreSettings>(&content)?
    } else {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        StoreSettings::default()
    };

    settings.validate().map_err(ConfigError::ValidationErrors)?;
    tracing::debug!("Settings loaded successfully: {:?}", settings);

    Ok(settings)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    /// `load_settings`: 設定ファイルが存在する場合
    #[rstest]
    fn test_load_settings_with_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"languageSuffix": "locale"}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let settings = load_settings(temp_dir.path()).unwrap();

        assert_eq!(settings.language_suffix, "locale");
        assert_eq!(settings.bundle_extension, "bundle");
    }

    /// `load_settings`: 設定ファイルが存在しない場合はデフォルト値
    #[rstest]
    fn test_load_settings_no_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let settings = load_settings(temp_dir.path()).unwrap();

        assert_eq!(settings, StoreSettings::default());
    }

    /// `load_settings`: JSON パースエラー
    #[rstest]
    fn test_load_settings_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "invalid json").unwrap();

        let result = load_settings(temp_dir.path());

        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    /// `load_settings`: バリデーションエラー
    #[rstest]
    fn test_load_settings_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), r#"{"bundleExtension": ""}"#).unwrap();

        let result = load_settings(temp_dir.path());

        assert!(matches!(result, Err(ConfigError::ValidationErrors(errors)) if errors.len() == 1));
    }
}
