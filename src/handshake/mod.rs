//! Opening handshake: key derivation and the header checks shared by the
//! client and server sides.

pub mod headers;

pub(crate) mod client;
pub(crate) mod server;

use http::HeaderMap;
use sha1::{Digest, Sha1};

/// Salt appended to the `Sec-WebSocket-Key` before hashing (RFC 6455 §1.3).
const WEBSOCKET_KEY_SALT: &[u8] = b"258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// The protocol version this engine speaks.
const SUPPORTED_VERSION: &str = "13";

/// Decoded length a `Sec-WebSocket-Key` must have.
const REQUIRED_KEY_LENGTH: usize = 16;

/// Turn a `Sec-WebSocket-Key` into the matching `Sec-WebSocket-Accept`.
pub(crate) fn convert_key(input: &[u8]) -> String {
    let mut sha1 = Sha1::new();
    sha1.update(input);
    sha1.update(WEBSOCKET_KEY_SALT);
    base64::encode(sha1.finalize().as_slice())
}

/// Comma-separated tokens across every value of a header, trimmed and
/// lowercased. A header that is absent or blank yields no tokens.
pub(crate) fn header_tokens(headers: &HeaderMap, name: &str) -> Vec<String> {
    headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Whether the `Connection` header carries the `upgrade` token.
pub(crate) fn connection_has_upgrade(headers: &HeaderMap) -> bool {
    header_tokens(headers, "Connection").iter().any(|token| token == "upgrade")
}

/// Whether the `Upgrade` header names the WebSocket protocol.
pub(crate) fn upgrade_is_websocket(headers: &HeaderMap) -> bool {
    headers
        .get("Upgrade")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().eq_ignore_ascii_case("websocket"))
        .unwrap_or(false)
}
