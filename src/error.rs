//! Error handling.

use std::error::Error as ErrorTrait;
use std::fmt;
use std::result;
use std::str;

/// Convenience result type used throughout the crate.
pub type Result<T> = result::Result<T, Error>;

/// Errors surfaced to the caller.
///
/// These come almost exclusively out of the opening handshake; once a
/// session is open, protocol violations are handled internally by the
/// fail-close path and reported through the close handler instead.
#[derive(Debug)]
pub enum Error {
    /// The peer answered the opening handshake with an unexpected HTTP status.
    Http(u16),
    /// A WebSocket protocol rule was violated.
    Protocol(ProtocolError),
    /// UTF-8 coding error.
    Utf8(str::Utf8Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Http(code) => write!(f, "HTTP code: {}", code),
            Error::Protocol(ref err) => write!(f, "WebSocket protocol error: {}", err),
            Error::Utf8(ref err) => write!(f, "UTF-8 encoding error: {}", err),
        }
    }
}

impl ErrorTrait for Error {
    fn source(&self) -> Option<&(dyn ErrorTrait + 'static)> {
        match *self {
            Error::Utf8(ref err) => Some(err),
            Error::Protocol(ref err) => Some(err),
            Error::Http(_) => None,
        }
    }
}

impl From<str::Utf8Error> for Error {
    fn from(err: str::Utf8Error) -> Self {
        Error::Utf8(err)
    }
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        Error::Protocol(err)
    }
}

impl From<httparse::Error> for Error {
    fn from(err: httparse::Error) -> Self {
        Error::Protocol(ProtocolError::HttparseError(err))
    }
}

/// Indicates the specific protocol rule that was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Use of the wrong HTTP method (the WebSocket protocol requires GET).
    WrongHttpMethod,
    /// Wrong HTTP version used (the WebSocket protocol requires 1.1 or higher).
    WrongHttpVersion,
    /// Missing `upgrade` token in the `Connection` HTTP header.
    MissingConnectionUpgradeHeader,
    /// Missing `Upgrade: websocket` HTTP header.
    MissingUpgradeWebSocketHeader,
    /// Missing `Sec-WebSocket-Version: 13` HTTP header.
    MissingSecWebSocketVersionHeader,
    /// The `Sec-WebSocket-Key` header is absent or does not decode to 16 bytes.
    InvalidSecWebSocketKey,
    /// The `Sec-WebSocket-Accept` header is absent or was not derived from our nonce.
    SecWebSocketAcceptKeyMismatch,
    /// The server selected an extension we never offered.
    UnsolicitedExtensions,
    /// The server selected a subprotocol we never requested.
    UnsolicitedSubprotocol,
    /// An HTTP message could not be converted into its container.
    MalformedHttpMessage,
    /// Wrapper around a [`httparse::Error`] value.
    HttparseError(httparse::Error),
    /// A frame advertised a payload longer than this host can buffer.
    OversizedFrame,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ProtocolError::WrongHttpMethod => {
                write!(f, "unsupported HTTP method, only GET is allowed")
            }
            ProtocolError::WrongHttpVersion => write!(f, "HTTP version must be 1.1 or higher"),
            ProtocolError::MissingConnectionUpgradeHeader => {
                write!(f, "no \"Connection: upgrade\" header")
            }
            ProtocolError::MissingUpgradeWebSocketHeader => {
                write!(f, "no \"Upgrade: websocket\" header")
            }
            ProtocolError::MissingSecWebSocketVersionHeader => {
                write!(f, "no \"Sec-WebSocket-Version: 13\" header")
            }
            ProtocolError::InvalidSecWebSocketKey => {
                write!(f, "missing or invalid \"Sec-WebSocket-Key\" header")
            }
            ProtocolError::SecWebSocketAcceptKeyMismatch => {
                write!(f, "key mismatch in \"Sec-WebSocket-Accept\" header")
            }
            ProtocolError::UnsolicitedExtensions => {
                write!(f, "server selected an extension that was never offered")
            }
            ProtocolError::UnsolicitedSubprotocol => {
                write!(f, "server selected a subprotocol that was never requested")
            }
            ProtocolError::MalformedHttpMessage => write!(f, "malformed HTTP message"),
            ProtocolError::HttparseError(ref err) => write!(f, "httparse error: {}", err),
            ProtocolError::OversizedFrame => write!(f, "frame payload exceeds addressable memory"),
        }
    }
}

impl ErrorTrait for ProtocolError {}
