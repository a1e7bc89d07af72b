//! The WebSocket session engine: receive pipeline, framing state machine,
//! and the closing handshake.

pub mod frame;

mod message;

pub use self::frame::{CloseFrame, Frame, FrameHeader};

use std::fmt;
use std::str;

use bytes::Bytes;
use http::{Request, Response};
use log::*;

use self::frame::coding::{CloseCode, Control as OpCtl, Data as OpData, OpCode};
use self::frame::FrameAssembler;
use self::message::{IncompleteMessage, IncompleteMessageType};
use crate::connection::Connection;
use crate::diagnostics::{DiagnosticsSender, Unsubscribe};
use crate::error::Result;
use crate::handshake::{client, server};

/// Indicates a Client or Server role of the websocket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// This socket is a client: every outgoing data frame is masked.
    Client,
    /// This socket is a server: outgoing frames are sent in the clear and
    /// every incoming frame must be masked.
    Server,
}

/// All control frames MUST have a payload length of 125 bytes or less
/// (RFC 6455 §5.5).
const MAX_CONTROL_FRAME_PAYLOAD: usize = 125;

type MessageHandler = Box<dyn FnMut(&[u8])>;
type TextHandler = Box<dyn FnMut(&str)>;
type CloseHandler = Box<dyn FnMut(CloseCode, &str)>;

/// A WebSocket endpoint.
///
/// Constructed inert; it becomes operational once opened in a role, either
/// directly over an established transport with [`open`](WebSocket::open) or
/// through one of the opening-handshake entry points. Incoming traffic is
/// fed in with [`on_data_received`](WebSocket::on_data_received); decoded
/// messages come back out through the registered handlers.
pub struct WebSocket {
    /// The transport, present once the endpoint is open.
    transport: Option<Box<dyn Connection>>,
    /// Session role, fixed at open time.
    role: Option<Role>,
    /// Set once a close frame has been sent; no application frame may follow.
    close_sent: bool,
    /// Set once a close frame has been received from the peer.
    close_received: bool,
    /// Type of the outbound fragmented message in flight, if any.
    sending: Option<IncompleteMessageType>,
    /// Inbound fragmented message being reassembled, if any.
    incomplete: Option<IncompleteMessage>,
    /// Reassembles transport deliveries into frames.
    assembler: FrameAssembler,
    /// Nonce sent as `Sec-WebSocket-Key` when opening as a client.
    key: Option<String>,
    on_ping: Option<MessageHandler>,
    on_pong: Option<MessageHandler>,
    on_text: Option<TextHandler>,
    on_binary: Option<MessageHandler>,
    on_close: Option<CloseHandler>,
    diagnostics: DiagnosticsSender,
}

impl WebSocket {
    /// Create an endpoint that is not yet bound to any transport.
    pub fn new() -> Self {
        WebSocket {
            transport: None,
            role: None,
            close_sent: false,
            close_received: false,
            sending: None,
            incomplete: None,
            assembler: FrameAssembler::new(),
            key: None,
            on_ping: None,
            on_pong: None,
            on_text: None,
            on_binary: None,
            on_close: None,
            diagnostics: DiagnosticsSender::new("websock"),
        }
    }

    /// Bind an established transport in the given role, skipping the
    /// opening handshake.
    pub fn open(&mut self, transport: Box<dyn Connection>, role: Role) {
        debug!("opening websocket in role {:?}", role);
        self.transport = Some(transport);
        self.role = Some(role);
    }

    /// Prepare `request` for the client side of the opening handshake.
    ///
    /// Sets the version, nonce, and upgrade headers, and appends `upgrade`
    /// to the `Connection` header. The nonce is remembered so the server's
    /// reply can be verified by
    /// [`complete_open_as_client`](WebSocket::complete_open_as_client).
    pub fn start_open_as_client(&mut self, request: &mut Request<()>) {
        self.key = Some(client::prepare_request(request));
    }

    /// Validate the server's handshake reply and, on success, bind the
    /// transport in the client role.
    ///
    /// No frame is emitted on failure; the caller decides what to do with
    /// the connection.
    pub fn complete_open_as_client(
        &mut self,
        transport: Box<dyn Connection>,
        response: &Response<()>,
    ) -> Result<()> {
        let verify = client::VerifyData::new(self.key.as_deref().unwrap_or_default());
        verify.verify_response(response)?;
        self.open(transport, Role::Client);
        Ok(())
    }

    /// Validate a client's upgrade request, populate the `101 Switching
    /// Protocols` reply, and bind the transport in the server role.
    ///
    /// `trailer` holds any bytes the caller received past the end of the
    /// request on the same transport; they are run through the receive
    /// pipeline so a frame sharing a TCP segment with the handshake is not
    /// lost. On failure the response is left untouched and no frame is
    /// emitted.
    pub fn open_as_server(
        &mut self,
        transport: Box<dyn Connection>,
        request: &Request<()>,
        response: &mut Response<()>,
        trailer: &[u8],
    ) -> Result<()> {
        let key = server::verify_request(request)?;
        server::build_response(request, response, &key);
        self.open(transport, Role::Server);
        if !trailer.is_empty() {
            self.on_data_received(trailer);
        }
        Ok(())
    }

    // -- handler registration -------------------------------------------

    /// Call `handler` with the payload of every ping received.
    pub fn set_ping_handler(&mut self, handler: impl FnMut(&[u8]) + 'static) {
        self.on_ping = Some(Box::new(handler));
    }

    /// Call `handler` with the payload of every pong received.
    pub fn set_pong_handler(&mut self, handler: impl FnMut(&[u8]) + 'static) {
        self.on_pong = Some(Box::new(handler));
    }

    /// Call `handler` with every complete text message received.
    pub fn set_text_handler(&mut self, handler: impl FnMut(&str) + 'static) {
        self.on_text = Some(Box::new(handler));
    }

    /// Call `handler` with every complete binary message received.
    pub fn set_binary_handler(&mut self, handler: impl FnMut(&[u8]) + 'static) {
        self.on_binary = Some(Box::new(handler));
    }

    /// Call `handler` with the status code and reason once the session
    /// closes, whether by handshake, protocol failure, or transport loss.
    pub fn set_close_handler(&mut self, handler: impl FnMut(CloseCode, &str) + 'static) {
        self.on_close = Some(Box::new(handler));
    }

    /// Subscribe to diagnostic messages at `min_level` or above. The
    /// returned closure cancels the subscription.
    pub fn subscribe_to_diagnostics(
        &self,
        handler: impl FnMut(&str, usize, &str) + 'static,
        min_level: usize,
    ) -> Unsubscribe {
        self.diagnostics.subscribe(handler, min_level)
    }

    // -- sending --------------------------------------------------------

    /// Send a ping. Silently dropped once a close frame has been sent or
    /// when the payload exceeds the control-frame limit.
    pub fn ping(&mut self, data: &[u8]) {
        if self.close_sent || data.len() > MAX_CONTROL_FRAME_PAYLOAD {
            return;
        }
        self.send_frame(Frame::ping(Bytes::copy_from_slice(data)));
    }

    /// Send a pong, for a unidirectional heartbeat. Subject to the same
    /// suppression rules as [`ping`](WebSocket::ping).
    pub fn pong(&mut self, data: &[u8]) {
        if self.close_sent || data.len() > MAX_CONTROL_FRAME_PAYLOAD {
            return;
        }
        self.send_frame(Frame::pong(Bytes::copy_from_slice(data)));
    }

    /// Send a text message, or one fragment of one when `last_fragment` is
    /// false. A no-op after a close was sent or while a binary message is
    /// in flight.
    pub fn send_text(&mut self, text: &str, last_fragment: bool) {
        if self.close_sent || self.sending == Some(IncompleteMessageType::Binary) {
            return;
        }
        let opcode = if self.sending == Some(IncompleteMessageType::Text) {
            OpCode::Data(OpData::Continue)
        } else {
            OpCode::Data(OpData::Text)
        };
        self.send_frame(Frame::message(
            Bytes::copy_from_slice(text.as_bytes()),
            opcode,
            last_fragment,
        ));
        self.sending = if last_fragment { None } else { Some(IncompleteMessageType::Text) };
    }

    /// Send a binary message, or one fragment of one when `last_fragment`
    /// is false. A no-op after a close was sent or while a text message is
    /// in flight.
    pub fn send_binary(&mut self, data: &[u8], last_fragment: bool) {
        if self.close_sent || self.sending == Some(IncompleteMessageType::Text) {
            return;
        }
        let opcode = if self.sending == Some(IncompleteMessageType::Binary) {
            OpCode::Data(OpData::Continue)
        } else {
            OpCode::Data(OpData::Binary)
        };
        self.send_frame(Frame::message(Bytes::copy_from_slice(data), opcode, last_fragment));
        self.sending = if last_fragment { None } else { Some(IncompleteMessageType::Binary) };
    }

    /// Initiate (or complete) the closing handshake.
    ///
    /// [`CloseCode::Status`] sends a close frame with an empty payload;
    /// [`CloseCode::Abnormal`] sends nothing and reports the closure
    /// locally. Idempotent: once a close frame has been sent, further calls
    /// do nothing.
    pub fn close(&mut self, code: CloseCode, reason: &str) {
        self.close_internal(code, reason, false);
    }

    /// The close path shared by the public API and the fail-close cases.
    ///
    /// With `fail` set the closure is reported to the local close handler
    /// immediately instead of waiting for the peer's reply.
    fn close_internal(&mut self, code: CloseCode, reason: &str, fail: bool) {
        if self.close_sent {
            return;
        }
        self.close_sent = true;
        if code == CloseCode::Abnormal {
            // 1006 never appears on the wire (RFC 6455 §7.4.1)
            self.on_close_receipt(code, reason);
            return;
        }
        let frame = if code == CloseCode::Status {
            Frame::close(None)
        } else {
            Frame::close(Some(CloseFrame { code, reason: reason.to_owned() }))
        };
        self.send_frame(frame);
        if fail {
            self.on_close_receipt(code, reason);
        } else if self.close_received {
            // the peer closed first; our reply finishes the handshake
            if let Some(transport) = self.transport.as_mut() {
                let peer = transport.peer_id();
                transport.shutdown(true);
                self.diagnostics
                    .send(1, &format!("Connection to {} closed ({})", peer, reason));
            }
        }
    }

    /// Responds to the close handshake completing from the peer's side,
    /// whether by an actual close frame or a local failure.
    fn on_close_receipt(&mut self, code: CloseCode, reason: &str) {
        if self.close_received {
            return;
        }
        let close_was_sent = self.close_sent;
        self.close_received = true;
        debug!("close receipt: code {} reason {:?}", code, reason);
        if let Some(handler) = self.on_close.as_mut() {
            handler(code, reason);
        }
        if close_was_sent {
            if let Some(transport) = self.transport.as_mut() {
                transport.shutdown(false);
            }
        } else if let Some(transport) = self.transport.as_ref() {
            self.diagnostics
                .send(1, &format!("Connection to {} closed by peer", transport.peer_id()));
        }
    }

    // -- transport events -----------------------------------------------

    /// Feed bytes received from the transport into the engine.
    ///
    /// Complete frames are decoded and dispatched in arrival order; a
    /// partial frame stays buffered until more bytes arrive. Ignored once
    /// the session is fully closed.
    pub fn on_data_received(&mut self, data: &[u8]) {
        if self.close_sent && self.close_received {
            return;
        }
        self.assembler.extend(data);
        loop {
            match self.assembler.next_frame() {
                Ok(Some(frame)) => self.handle_frame(frame),
                Ok(None) => break,
                Err(err) => {
                    debug!("failing connection: {}", err);
                    self.close_internal(CloseCode::Size, "frame too big", true);
                    break;
                }
            }
            if self.close_sent && self.close_received {
                break;
            }
        }
    }

    /// Notification that the transport was lost without a closing
    /// handshake.
    pub fn on_broken(&mut self, _graceful: bool) {
        self.close_internal(CloseCode::Abnormal, "connection broken by peer", true);
        if let Some(transport) = self.transport.as_ref() {
            self.diagnostics
                .send(1, &format!("Connection to {} broken by peer", transport.peer_id()));
        }
    }

    // -- frame handling -------------------------------------------------

    /// Dispatch one decoded frame through protocol validation.
    fn handle_frame(&mut self, frame: Frame) {
        let (is_final, reserved, opcode, masked) = {
            let header = frame.header();
            (
                header.is_final,
                header.rsv1 || header.rsv2 || header.rsv3,
                header.opcode,
                header.mask.is_some(),
            )
        };

        // MUST be 0 unless an extension is negotiated that defines meanings
        // for non-zero values; we negotiate none. (RFC 6455 §5.2)
        if reserved {
            self.close_internal(CloseCode::Protocol, "reserved bits set", true);
            return;
        }

        // Masking direction is fixed by role. (RFC 6455 §5.1)
        match self.role {
            Some(Role::Server) if !masked => {
                self.close_internal(CloseCode::Protocol, "unmasked frame", true);
                return;
            }
            Some(Role::Client) if masked => {
                self.close_internal(CloseCode::Protocol, "masked frame", true);
                return;
            }
            _ => {}
        }

        match opcode {
            OpCode::Control(ctl) => {
                // Control frames MUST NOT be fragmented and carry at most
                // 125 payload bytes. (RFC 6455 §5.5)
                if !is_final {
                    self.close_internal(CloseCode::Protocol, "fragmented control frame", true);
                    return;
                }
                if frame.payload().len() > MAX_CONTROL_FRAME_PAYLOAD {
                    self.close_internal(CloseCode::Protocol, "control frame too big", true);
                    return;
                }
                match ctl {
                    OpCtl::Ping => {
                        let payload = frame.into_payload();
                        if let Some(handler) = self.on_ping.as_mut() {
                            handler(&payload);
                        }
                        // no pong once our close frame is on the wire
                        if !self.close_sent {
                            self.send_frame(Frame::pong(payload));
                        }
                    }
                    OpCtl::Pong => {
                        if let Some(handler) = self.on_pong.as_mut() {
                            handler(frame.payload());
                        }
                    }
                    OpCtl::Close => match frame.into_close() {
                        Ok(Some(CloseFrame { code, reason })) => {
                            self.on_close_receipt(code, &reason)
                        }
                        Ok(None) => self.on_close_receipt(CloseCode::Status, ""),
                        Err(_) => self.close_internal(
                            CloseCode::Invalid,
                            "invalid UTF-8 encoding in close reason",
                            true,
                        ),
                    },
                    OpCtl::Reserved(_) => {
                        self.close_internal(CloseCode::Protocol, "unknown opcode", true)
                    }
                }
            }
            OpCode::Data(data) => match data {
                OpData::Continue => {
                    if let Some(incomplete) = self.incomplete.as_mut() {
                        incomplete.extend(frame.payload());
                        if is_final {
                            let incomplete =
                                self.incomplete.take().expect("Bug: fragmented message vanished");
                            self.deliver_message(incomplete);
                        }
                    } else {
                        self.close_internal(
                            CloseCode::Protocol,
                            "unexpected continuation frame",
                            true,
                        );
                    }
                }
                OpData::Text | OpData::Binary if self.incomplete.is_some() => {
                    self.close_internal(CloseCode::Protocol, "last message incomplete", true);
                }
                OpData::Text => {
                    if is_final {
                        self.deliver_text(frame.payload());
                    } else {
                        let mut incomplete = IncompleteMessage::new(IncompleteMessageType::Text);
                        incomplete.extend(frame.payload());
                        self.incomplete = Some(incomplete);
                    }
                }
                OpData::Binary => {
                    if is_final {
                        if let Some(handler) = self.on_binary.as_mut() {
                            handler(frame.payload());
                        }
                    } else {
                        let mut incomplete = IncompleteMessage::new(IncompleteMessageType::Binary);
                        incomplete.extend(frame.payload());
                        self.incomplete = Some(incomplete);
                    }
                }
                OpData::Reserved(_) => {
                    self.close_internal(CloseCode::Protocol, "unknown opcode", true)
                }
            },
        }
    }

    /// Deliver a reassembled fragmented message.
    fn deliver_message(&mut self, message: IncompleteMessage) {
        let kind = message.kind();
        let payload = message.complete();
        match kind {
            IncompleteMessageType::Text => self.deliver_text(&payload),
            IncompleteMessageType::Binary => {
                if let Some(handler) = self.on_binary.as_mut() {
                    handler(&payload);
                }
            }
        }
    }

    /// Deliver a complete text message after UTF-8 validation.
    fn deliver_text(&mut self, payload: &[u8]) {
        match str::from_utf8(payload) {
            Ok(text) => {
                if let Some(handler) = self.on_text.as_mut() {
                    handler(text);
                }
            }
            Err(_) => self.close_internal(
                CloseCode::Invalid,
                "text message with invalid UTF-8 encoding",
                true,
            ),
        }
    }

    /// Mask (in the client role) and write a frame to the transport.
    fn send_frame(&mut self, mut frame: Frame) {
        if self.role == Some(Role::Client) {
            // frames flowing client to server are always masked
            // (RFC 6455 §5.3)
            frame.set_random_mask();
        }
        let transport = match self.transport.as_mut() {
            Some(transport) => transport,
            None => return,
        };
        trace!("sending frame {:?}", frame.header());
        let mut output = Vec::with_capacity(frame.len());
        frame.format(&mut output);
        transport.send_data(&output);
    }
}

impl Default for WebSocket {
    fn default() -> Self {
        WebSocket::new()
    }
}

impl fmt::Debug for WebSocket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("WebSocket")
            .field("role", &self.role)
            .field("close_sent", &self.close_sent)
            .field("close_received", &self.close_received)
            .field("sending", &self.sending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{CloseCode, Role, WebSocket};
    use crate::connection::Connection;

    use std::cell::RefCell;
    use std::rc::Rc;

    /// Transport mock that records everything the endpoint does to it.
    #[derive(Default)]
    struct MockState {
        sent: Vec<u8>,
        broken: Option<bool>,
    }

    struct MockConnection(Rc<RefCell<MockState>>);

    impl MockConnection {
        fn create() -> (Box<MockConnection>, Rc<RefCell<MockState>>) {
            let state = Rc::new(RefCell::new(MockState::default()));
            (Box::new(MockConnection(state.clone())), state)
        }
    }

    impl Connection for MockConnection {
        fn send_data(&mut self, data: &[u8]) {
            self.0.borrow_mut().sent.extend_from_slice(data);
        }

        fn shutdown(&mut self, clean: bool) {
            self.0.borrow_mut().broken = Some(clean);
        }

        fn peer_id(&self) -> String {
            "mock-peer".to_owned()
        }
    }

    fn open_server() -> (WebSocket, Rc<RefCell<MockState>>) {
        let (connection, state) = MockConnection::create();
        let mut ws = WebSocket::new();
        ws.open(connection, Role::Server);
        (ws, state)
    }

    /// Build a masked frame the way a conforming client would.
    fn masked(first: u8, payload: &[u8]) -> Vec<u8> {
        let key = [0x12, 0x32, 0x31, 0x60];
        assert!(payload.len() < 126);
        let mut frame = vec![first, 0x80 | payload.len() as u8];
        frame.extend_from_slice(&key);
        frame.extend(payload.iter().enumerate().map(|(i, byte)| byte ^ key[i % 4]));
        frame
    }

    #[test]
    fn ping_suppressed_while_close_pending() {
        let (mut ws, state) = open_server();
        ws.close(CloseCode::Normal, "bye");
        let sent_after_close = state.borrow().sent.len();
        ws.ping(b"hello");
        assert_eq!(state.borrow().sent.len(), sent_after_close);
    }

    #[test]
    fn oversized_ping_suppressed() {
        let (mut ws, state) = open_server();
        ws.ping(&[0u8; 126]);
        assert!(state.borrow().sent.is_empty());
        ws.ping(&[0u8; 125]);
        assert_eq!(state.borrow().sent.len(), 2 + 125);
    }

    #[test]
    fn auto_pong_echoes_payload() {
        let (mut ws, state) = open_server();
        let pings = Rc::new(RefCell::new(Vec::new()));
        let sink = pings.clone();
        ws.set_ping_handler(move |data| sink.borrow_mut().push(data.to_vec()));

        ws.on_data_received(&masked(0x89, b"World!"));

        assert_eq!(*pings.borrow(), vec![b"World!".to_vec()]);
        let mut expected = vec![0x8A, 0x06];
        expected.extend_from_slice(b"World!");
        assert_eq!(state.borrow().sent, expected);
    }

    #[test]
    fn fragmented_receive_reassembles() {
        let (mut ws, _state) = open_server();
        let texts = Rc::new(RefCell::new(Vec::new()));
        let sink = texts.clone();
        ws.set_text_handler(move |text| sink.borrow_mut().push(text.to_owned()));

        ws.on_data_received(&masked(0x01, b"Hello,"));
        ws.on_data_received(&masked(0x00, b" "));
        assert!(texts.borrow().is_empty());
        ws.on_data_received(&masked(0x80, b"World!"));

        assert_eq!(*texts.borrow(), vec!["Hello, World!".to_owned()]);
    }

    #[test]
    fn unexpected_continuation_fails_connection() {
        let (mut ws, state) = open_server();
        let closes = Rc::new(RefCell::new(Vec::new()));
        let sink = closes.clone();
        ws.set_close_handler(move |code, reason| {
            sink.borrow_mut().push((u16::from(code), reason.to_owned()));
        });

        ws.on_data_received(&masked(0x80, b"tail"));

        assert_eq!(
            *closes.borrow(),
            vec![(1002, "unexpected continuation frame".to_owned())]
        );
        let sent = state.borrow();
        assert_eq!(&sent.sent[..4], &[0x88, 31, 0x03, 0xEA]);
        assert_eq!(sent.broken, Some(false));
    }

    #[test]
    fn new_data_frame_during_fragmented_message_fails_connection() {
        let (mut ws, _state) = open_server();
        let closes = Rc::new(RefCell::new(Vec::new()));
        let sink = closes.clone();
        ws.set_close_handler(move |code, reason| {
            sink.borrow_mut().push((u16::from(code), reason.to_owned()));
        });

        ws.on_data_received(&masked(0x01, b"start"));
        ws.on_data_received(&masked(0x02, b"oops"));

        assert_eq!(*closes.borrow(), vec![(1002, "last message incomplete".to_owned())]);
    }

    #[test]
    fn reserved_bits_fail_connection() {
        let (mut ws, state) = open_server();
        ws.on_data_received(&masked(0xC2, b"x"));
        assert_eq!(state.borrow().broken, Some(false));
    }

    #[test]
    fn unknown_opcode_fails_connection() {
        let (mut ws, _state) = open_server();
        let closes = Rc::new(RefCell::new(Vec::new()));
        let sink = closes.clone();
        ws.set_close_handler(move |code, reason| {
            sink.borrow_mut().push((u16::from(code), reason.to_owned()));
        });

        ws.on_data_received(&masked(0x83, b""));

        assert_eq!(*closes.borrow(), vec![(1002, "unknown opcode".to_owned())]);
    }

    #[test]
    fn unmasked_frame_to_server_fails_connection() {
        let (mut ws, state) = open_server();
        ws.on_data_received(&[0x89, 0x00]);
        assert_eq!(state.borrow().broken, Some(false));
    }

    #[test]
    fn send_fragmentation_blocks_opposite_type() {
        let (mut ws, state) = open_server();
        ws.send_text("Hello,", false);
        let after_first = state.borrow().sent.len();
        ws.send_binary(b"X", true);
        assert_eq!(state.borrow().sent.len(), after_first);
        ws.send_text("World!", true);
        ws.send_binary(b"X", true);
        assert!(state.borrow().sent.len() > after_first);
    }

    #[test]
    fn close_is_idempotent() {
        let (mut ws, state) = open_server();
        ws.close(CloseCode::Normal, "Goodbye!");
        let first = state.borrow().sent.clone();
        ws.close(CloseCode::Normal, "One more time!");
        assert_eq!(state.borrow().sent, first);
    }

    #[test]
    fn abnormal_close_emits_no_frame_but_reports() {
        let (mut ws, state) = open_server();
        let closes = Rc::new(RefCell::new(Vec::new()));
        let sink = closes.clone();
        ws.set_close_handler(move |code, reason| {
            sink.borrow_mut().push((u16::from(code), reason.to_owned()));
        });

        ws.close(CloseCode::Abnormal, "gone");

        assert!(state.borrow().sent.is_empty());
        assert_eq!(*closes.borrow(), vec![(1006, "gone".to_owned())]);
    }

    #[test]
    fn broken_transport_reports_abnormal_close() {
        let (mut ws, state) = open_server();
        let closes = Rc::new(RefCell::new(Vec::new()));
        let sink = closes.clone();
        ws.set_close_handler(move |code, reason| {
            sink.borrow_mut().push((u16::from(code), reason.to_owned()));
        });
        let diagnostics = Rc::new(RefCell::new(Vec::new()));
        let sink = diagnostics.clone();
        let _subscription = ws.subscribe_to_diagnostics(
            move |name, level, message| {
                sink.borrow_mut().push(format!("{}[{}]: {}", name, level, message));
            },
            0,
        );

        ws.on_broken(false);

        assert!(state.borrow().sent.is_empty());
        assert_eq!(*closes.borrow(), vec![(1006, "connection broken by peer".to_owned())]);
        assert_eq!(
            *diagnostics.borrow(),
            vec!["websock[1]: Connection to mock-peer broken by peer".to_owned()]
        );
    }

    #[test]
    fn handlers_silent_after_session_closed() {
        let (mut ws, _state) = open_server();
        let texts = Rc::new(RefCell::new(0));
        let sink = texts.clone();
        ws.set_text_handler(move |_| *sink.borrow_mut() += 1);

        ws.close(CloseCode::Normal, "bye");
        ws.on_data_received(&masked(0x88, &[0x03, 0xE8]));
        ws.on_data_received(&masked(0x81, b"late"));

        assert_eq!(*texts.borrow(), 0);
    }
}
