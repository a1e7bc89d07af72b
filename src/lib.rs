//! Lightweight WebSocket protocol engine (RFC 6455) for Rust.
//!
//! This crate speaks the WebSocket wire protocol without doing any I/O of
//! its own. The caller supplies an established byte transport through the
//! [`Connection`] trait, opens a [`WebSocket`] endpoint in either role
//! (performing the HTTP opening handshake if needed), and routes received
//! bytes into [`WebSocket::on_data_received`]. Decoded pings, pongs, text,
//! binary, and close events come back through registered handlers; sends go
//! out as correctly framed (and, in the client role, masked) bytes on the
//! transport.
#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_must_use,
    unused_mut,
    unused_imports,
    unused_import_braces
)]

pub mod connection;
pub mod diagnostics;
pub mod error;
pub mod handshake;
pub mod protocol;

pub use crate::connection::Connection;
pub use crate::diagnostics::{DiagnosticsSender, Unsubscribe};
pub use crate::error::{Error, Result};
pub use crate::protocol::frame::coding::CloseCode;
pub use crate::protocol::frame::CloseFrame;
pub use crate::protocol::{Role, WebSocket};
