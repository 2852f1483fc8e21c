use crate::error::CoreError;
use url::Url;

/// Checks that `raw` is an absolute `http` or `https` URL with a host.
///
/// The shortener itself never validates; callers run this before `create`.
pub fn validate_url(raw: &str) -> Result<(), CoreError> {
    if raw.is_empty() {
        return Err(CoreError::InvalidUrl("URL cannot be empty".to_string()));
    }

    let parsed = Url::parse(raw).map_err(|e| CoreError::InvalidUrl(format!("{raw}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(CoreError::InvalidUrl(format!(
                "URL scheme must be http or https: {other}"
            )))
        }
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() && host != "." => Ok(()),
        _ => Err(CoreError::InvalidUrl(format!("URL must have a host: {raw}"))),
    }
}
