//! Bundle version naming.

use std::fmt;
use std::sync::atomic::{
    AtomicU64,
    Ordering,
};
use std::time::{
    SystemTime,
    UNIX_EPOCH,
};

/// Width of a minted version name; wide enough for any `u64`.
const VERSION_WIDTH: usize = 20;

/// Name of one on-disk generation of the store.
///
/// Versions compare by their string form. Minted versions are zero-padded
/// microsecond timestamps, so string order is creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundleVersion(String);

impl BundleVersion {
    /// Wraps a name discovered on disk.
    #[must_use]
    pub fn from_name(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Microsecond timestamp encoded in the name, if it was minted by [`VersionClock`].
    #[must_use]
    pub fn micros(&self) -> Option<u64> {
        if self.0.len() != VERSION_WIDTH || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }

    /// Creates a version from a microsecond timestamp.
    fn from_micros(micros: u64) -> Self {
        Self(format!("{micros:0width$}", width = VERSION_WIDTH))
    }
}

impl fmt::Display for BundleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mints strictly increasing [`BundleVersion`]s.
///
/// When the system clock does not advance between calls (or goes backwards),
/// the next version is the previous one plus a microsecond.
#[derive(Debug, Default)]
pub struct VersionClock {
    /// Last minted timestamp in microseconds
    last: AtomicU64,
}

impl VersionClock {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: AtomicU64::new(0) }
    }

    /// Makes sure later versions sort after `version`.
    pub fn observe(&self, version: &BundleVersion) {
        if let Some(micros) = version.micros() {
            self.last.fetch_max(micros, Ordering::SeqCst);
        }
    }

    /// Returns a version newer than every version minted or observed so far.
    pub fn next_version(&self) -> BundleVersion {
        let now = now_micros();
        let advance = |last: u64| now.max(last.saturating_add(1));
        let previous = match self.last.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(advance(last))
        }) {
            Ok(previous) | Err(previous) => previous,
        };
        BundleVersion::from_micros(advance(previous))
    }
}

/// Current wall-clock time in microseconds since the Unix epoch.
fn now_micros() -> u64 {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}
