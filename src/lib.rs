//! i18n-bundle-store
//!
//! ローカライズ済みテキストリソースのバージョン付きストア。
//! 翻訳の更新は新しいバンドルディレクトリに書き込まれてから差し替えられるため、
//! 読み取り側が書き込み途中のリソースを参照することはない。

pub mod codec;
pub mod config;
pub mod error;
pub mod layout;
pub mod materializer;
pub mod resolver;
pub mod store;
pub mod types;
pub mod version;

mod test_utils;

pub use codec::{
    CatalogCodec,
    JsonCatalogCodec,
};
pub use error::StoreError;
pub use store::{
    BundleLease,
    BundleStore,
};
pub use types::{
    LanguageCatalog,
    LanguageCode,
    TranslationSet,
};
pub use version::BundleVersion;
