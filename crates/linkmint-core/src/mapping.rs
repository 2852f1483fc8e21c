use crate::shortcode::ShortCode;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A stored `code -> url` mapping.
///
/// The code is unique across the store; the url is not, the same url may be
/// shortened many times and receive a different code each time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMapping {
    pub code: ShortCode,
    /// The original URL that was shortened.
    pub url: String,
    /// When the mapping was inserted. Informational only.
    pub created_at: Timestamp,
}
