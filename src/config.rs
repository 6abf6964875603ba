use std::path::PathBuf;

use chrono::NaiveTime;

use crate::labels::Locale;

/// Application-level constants
pub const APP_NAME: &str = "Previsit";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of wizard steps. Step 6 is always the summary.
pub const TOTAL_STEPS: u8 = 6;

/// Env var selecting the label language (`en` or `id`).
pub const LOCALE_ENV: &str = "PREVISIT_LOCALE";

/// Env var overriding the directory exported summaries are written to.
pub const EXPORT_DIR_ENV: &str = "PREVISIT_EXPORT_DIR";

/// Default appointment time for a fresh session: 09:00.
pub fn default_appointment_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "previsit=info,warn"
}

/// Get the application data directory.
/// ~/Previsit/ on all platforms, falling back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the default exports directory.
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Runtime configuration resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub locale: Locale,
    pub export_dir: PathBuf,
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary key lookup.
    ///
    /// Unknown locale codes fall back to English; a blank export dir
    /// falls back to [`exports_dir`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let locale = match lookup(LOCALE_ENV) {
            Some(code) => Locale::from_code(&code).unwrap_or_else(|| {
                tracing::warn!(code = %code, "Unknown locale, using English");
                Locale::English
            }),
            None => Locale::English,
        };

        let export_dir = lookup(EXPORT_DIR_ENV)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(exports_dir);

        Self { locale, export_dir }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            locale: Locale::English,
            export_dir: exports_dir(),
        }
    }
}
