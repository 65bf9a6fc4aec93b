//! Simulation Tokens
//!
//! A token is JSON text compressed with zstd and written as URL-safe base64
//! without padding, so it can travel in a query string unescaped.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use std::io::Read;
use tracing::{debug, error};

use crate::error::{Result, TraceError};

pub const DEFAULT_COMPRESSION_LEVEL: i32 = 19;

/// Largest decompressed JSON a token may expand to.
pub const MAX_DECODED_LEN: u64 = 16 * 1024 * 1024;

pub fn encode_token(json: &str, level: i32) -> Result<String> {
    let compressed = zstd::stream::encode_all(json.as_bytes(), level)?;
    let token = URL_SAFE_NO_PAD.encode(compressed);
    debug!(json_len = json.len(), token_len = token.len(), "Encoded simulation token");
    Ok(token)
}

/// Reverses [`encode_token`]. Trailing `=` padding is tolerated.
pub fn decode_token(token: &str) -> Result<String> {
    decode_token_with_limit(token, MAX_DECODED_LEN)
}

/// Like [`decode_token`], rejecting tokens that expand beyond `limit` bytes.
pub fn decode_token_with_limit(token: &str, limit: u64) -> Result<String> {
    let trimmed = token.trim().trim_end_matches('=');
    if trimmed.is_empty() {
        return Err(corrupt("token is empty"));
    }
    let compressed = URL_SAFE_NO_PAD
        .decode(trimmed)
        .map_err(|e| corrupt(format!("not url-safe base64: {}", e)))?;
    let decoder = zstd::stream::read::Decoder::new(compressed.as_slice())
        .map_err(|e| corrupt(format!("decompression failed: {}", e)))?;
    let mut bytes = Vec::new();
    decoder
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|e| corrupt(format!("decompression failed: {}", e)))?;
    if bytes.len() as u64 > limit {
        return Err(corrupt(format!("expands beyond {} bytes", limit)));
    }
    String::from_utf8(bytes).map_err(|e| corrupt(format!("not utf-8: {}", e)))
}

fn corrupt(reason: impl Into<String>) -> TraceError {
    let reason = reason.into();
    error!("Cannot decode simulation token: {}", reason);
    TraceError::CorruptToken(reason)
}
