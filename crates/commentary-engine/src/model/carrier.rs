//! Carrier encoding for resolved link targets.
//!
//! Templates cannot hold a `LinkTarget` directly, so targets travel through
//! rendered markdown as `[text](<> "commentary-link:%7B...%7D")`: a
//! pseudo-URI wrapping the percent-encoded JSON form of the target. The
//! internal link pass decodes it back. Never persisted.

use percent_encoding::{NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use super::markup::LinkTarget;

pub const SCHEME: &str = "commentary-link:";

pub fn encode(target: &LinkTarget) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(target)?;
    Ok(format!(
        "{SCHEME}{}",
        utf8_percent_encode(&json, NON_ALPHANUMERIC)
    ))
}

/// Decodes a carrier URI; `None` for anything else.
pub fn decode(uri: &str) -> Option<LinkTarget> {
    let payload = uri.strip_prefix(SCHEME)?;
    let json = percent_decode_str(payload).decode_utf8().ok()?;
    serde_json::from_str(&json).ok()
}
