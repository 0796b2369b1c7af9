//! Package-level constants and tunable defaults.
//!
//! The streak and threshold values are deliberate configuration points:
//! orchestrator and engine configs default to them but accept overrides.

/// Current version of the Tutor engine (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name.
pub const NAME: &str = "tutor";

/// Consecutive module-extraction failures that abort an ingestion run.
pub const DEFAULT_MAX_CONSECUTIVE_MODULE_FAILURES: u32 = 3;

/// Consecutive correct answers before the next question requests a harder tier.
pub const DEFAULT_PROMOTE_STREAK: u32 = 3;

/// Consecutive incorrect answers before the next question requests an easier tier.
pub const DEFAULT_DEMOTE_STREAK: u32 = 2;

/// Per-module character limit applied when aggregating extracted text.
pub const DEFAULT_MODULE_TEXT_LIMIT: usize = 20_000;

/// Questions requested from the generator per batch.
pub const DEFAULT_QUESTION_BATCH_SIZE: u32 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_semver() {
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert_eq!(parts.len(), 3, "VERSION must be semver (MAJOR.MINOR.PATCH)");
        for part in parts {
            let _: u32 = part.parse().expect("each semver segment must be a number");
        }
    }

    #[test]
    fn name_is_lowercase() {
        assert_eq!(NAME, NAME.to_lowercase());
    }

    #[test]
    fn streak_defaults() {
        assert_eq!(DEFAULT_MAX_CONSECUTIVE_MODULE_FAILURES, 3);
        assert_eq!(DEFAULT_PROMOTE_STREAK, 3);
        assert_eq!(DEFAULT_DEMOTE_STREAK, 2);
    }
}
