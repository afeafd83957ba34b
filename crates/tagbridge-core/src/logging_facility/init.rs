//! Subscriber installation for embedders
//!
//! Tests do not go through here; they install the capture layer from
//! [`super::test_capture`] instead.

use std::sync::Once;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Output format selected by `logging` in the bridge config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Human-readable lines, `tagbridge=debug`
    #[default]
    Development,
    /// One JSON object per event, `tagbridge=info`
    Production,
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`
///
/// The first call wins; `RUST_LOG` overrides the profile's default filter.
/// A subscriber installed by the embedder beforehand is left in place.
///
/// ```
/// use tagbridge_core::logging_facility::{init, Profile};
///
/// init(Profile::Production);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = |default: &str| {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
        };
        let installed = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(filter("tagbridge=debug"))
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter("tagbridge=info"))
                .try_init(),
        };
        if installed.is_err() {
            tracing::debug!(profile = ?profile, "subscriber already installed, keeping it");
        }
    });
}
