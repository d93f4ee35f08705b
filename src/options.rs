//! Normalizer configuration

use crate::charset::DEFAULT_FALLBACK;
use serde::{Deserialize, Serialize};

/// Knobs for [`crate::normalize`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerOptions {
    /// Charset used when a part or encoded word declares none, or one the
    /// codec registry does not know
    pub fallback_charset: String,

    /// Look for a charset declared inside HTML markup when the part's
    /// Content-Type has none
    pub detect_html_charset: bool,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            fallback_charset: DEFAULT_FALLBACK.to_string(),
            detect_html_charset: true,
        }
    }
}

impl NormalizerOptions {
    #[must_use]
    pub fn with_fallback_charset(mut self, charset: impl Into<String>) -> Self {
        self.fallback_charset = charset.into();
        self
    }

    #[must_use]
    pub const fn with_html_charset_detection(mut self, enabled: bool) -> Self {
        self.detect_html_charset = enabled;
        self
    }
}
