//! Client side of the opening handshake.

use http::header::HeaderValue;
use http::{Request, Response};
use log::*;

use super::{
    connection_has_upgrade, convert_key, header_tokens, upgrade_is_websocket, SUPPORTED_VERSION,
};
use crate::error::{Error, ProtocolError, Result};

/// Generate a random nonce for the `Sec-WebSocket-Key` header.
pub(crate) fn generate_key() -> String {
    // a base64-encoded value that, when decoded, is 16 bytes in length
    // (RFC 6455 §4.1)
    let nonce: [u8; 16] = rand::random();
    base64::encode(&nonce)
}

/// Populate the headers of an outgoing upgrade request and return the nonce
/// that was placed in `Sec-WebSocket-Key`.
pub(crate) fn prepare_request(request: &mut Request<()>) -> String {
    let key = generate_key();
    let headers = request.headers_mut();
    headers.insert("Sec-WebSocket-Version", HeaderValue::from_static(SUPPORTED_VERSION));
    headers.insert(
        "Sec-WebSocket-Key",
        HeaderValue::from_str(&key).expect("Bug: nonce is not a valid header value"),
    );
    headers.insert("Upgrade", HeaderValue::from_static("websocket"));
    headers.append("Connection", HeaderValue::from_static("upgrade"));
    debug!("prepared client upgrade request");
    key
}

/// Validation data for the server's handshake reply.
pub(crate) struct VerifyData {
    /// The accept value the server must echo, derived from our nonce.
    accept_key: String,
}

impl VerifyData {
    pub(crate) fn new(key: &str) -> Self {
        VerifyData { accept_key: convert_key(key.as_bytes()) }
    }

    /// Check the server's reply against RFC 6455 §4.1.
    pub(crate) fn verify_response(&self, response: &Response<()>) -> Result<()> {
        // 1. If the status code received from the server is not 101, the
        // client handles the response per HTTP procedures.
        if response.status().as_u16() != 101 {
            return Err(Error::Http(response.status().as_u16()));
        }
        let headers = response.headers();
        // 2. A |Connection| header field without an "Upgrade" token fails
        // the connection.
        if !connection_has_upgrade(headers) {
            return Err(Error::Protocol(ProtocolError::MissingConnectionUpgradeHeader));
        }
        // 3. An |Upgrade| header field that is not "websocket" fails the
        // connection.
        if !upgrade_is_websocket(headers) {
            return Err(Error::Protocol(ProtocolError::MissingUpgradeWebSocketHeader));
        }
        // 4. |Sec-WebSocket-Accept| must be the base64 SHA-1 of our nonce
        // and the key salt.
        match headers.get("Sec-WebSocket-Accept").and_then(|value| value.to_str().ok()) {
            Some(accept) if accept == self.accept_key => {}
            _ => return Err(Error::Protocol(ProtocolError::SecWebSocketAcceptKeyMismatch)),
        }
        // 5. and 6. We never offer extensions or subprotocols, so the server
        // may not select any. A blank header is tolerated.
        if !header_tokens(headers, "Sec-WebSocket-Extensions").is_empty() {
            return Err(Error::Protocol(ProtocolError::UnsolicitedExtensions));
        }
        if !header_tokens(headers, "Sec-WebSocket-Protocol").is_empty() {
            return Err(Error::Protocol(ProtocolError::UnsolicitedSubprotocol));
        }
        debug!("client handshake verified");
        Ok(())
    }
}
