//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! embedding application's call. [`init`] is the one-line way to do it.

use std::sync::Once;

use serde::{Deserialize, Serialize};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Output profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Human-readable output at debug level.
    #[default]
    Development,
    /// JSON lines at info level.
    Production,
    /// Bare registry; tests attach their own layers.
    Test,
}

impl Profile {
    /// Filter used when `RUST_LOG` is not set.
    #[must_use]
    pub const fn default_filter(self) -> &'static str {
        match self {
            Self::Development | Self::Test => "crm_engine=debug",
            Self::Production => "crm_engine=info",
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`.
///
/// Only the first call in a process has any effect. If another subscriber
/// is already installed the call is a no-op.
///
/// # Example
///
/// ```
/// use crm_engine::logging::{init, Profile};
///
/// init(Profile::Test);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = || {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(profile.default_filter()))
        };
        let installed = match profile {
            Profile::Development => tracing_subscriber::fmt().with_env_filter(filter()).try_init().is_ok(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter())
                .try_init()
                .is_ok(),
            Profile::Test => tracing_subscriber::registry().try_init().is_ok(),
        };
        if installed {
            tracing::debug!(component = "logging", ?profile, "subscriber installed");
        }
    });
}
