//! Server side of the opening handshake.

use http::header::HeaderValue;
use http::{Method, Request, Response, StatusCode};
use log::*;

use super::{
    connection_has_upgrade, convert_key, upgrade_is_websocket, REQUIRED_KEY_LENGTH,
    SUPPORTED_VERSION,
};
use crate::error::{Error, ProtocolError, Result};

/// Validate a client's upgrade request (RFC 6455 §4.2.1) and return its
/// `Sec-WebSocket-Key`.
pub(crate) fn verify_request(request: &Request<()>) -> Result<String> {
    if request.method() != Method::GET {
        return Err(Error::Protocol(ProtocolError::WrongHttpMethod));
    }
    let headers = request.headers();
    match headers.get("Sec-WebSocket-Version").and_then(|value| value.to_str().ok()) {
        Some(version) if version.trim() == SUPPORTED_VERSION => {}
        _ => return Err(Error::Protocol(ProtocolError::MissingSecWebSocketVersionHeader)),
    }
    if !connection_has_upgrade(headers) {
        return Err(Error::Protocol(ProtocolError::MissingConnectionUpgradeHeader));
    }
    if !upgrade_is_websocket(headers) {
        return Err(Error::Protocol(ProtocolError::MissingUpgradeWebSocketHeader));
    }
    let key = headers
        .get("Sec-WebSocket-Key")
        .and_then(|value| value.to_str().ok())
        .ok_or(Error::Protocol(ProtocolError::InvalidSecWebSocketKey))?;
    match base64::decode(key) {
        Ok(decoded) if decoded.len() == REQUIRED_KEY_LENGTH => Ok(key.to_owned()),
        _ => Err(Error::Protocol(ProtocolError::InvalidSecWebSocketKey)),
    }
}

/// Fill in the 101 reply that completes the handshake.
///
/// The reply's `Connection` header keeps whatever tokens the request
/// carried and gains `upgrade`.
pub(crate) fn build_response(request: &Request<()>, response: &mut Response<()>, key: &str) {
    *response.status_mut() = StatusCode::SWITCHING_PROTOCOLS;
    let connection_values: Vec<HeaderValue> =
        request.headers().get_all("Connection").iter().cloned().collect();
    let headers = response.headers_mut();
    for value in connection_values {
        headers.append("Connection", value);
    }
    headers.append("Connection", HeaderValue::from_static("upgrade"));
    headers.insert("Upgrade", HeaderValue::from_static("websocket"));
    let accept = convert_key(key.as_bytes());
    headers.insert(
        "Sec-WebSocket-Accept",
        HeaderValue::from_str(&accept).expect("Bug: accept key is not a valid header value"),
    );
    debug!("server handshake accepted");
}
