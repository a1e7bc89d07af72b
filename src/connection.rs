//! The byte-transport collaborator.

/// An established bidirectional byte transport, for example a TCP
/// connection that has just carried the HTTP upgrade exchange.
///
/// The engine owns its transport and pushes outbound frame bytes through
/// [`send_data`](Connection::send_data). Inbound traffic travels the other
/// way: whoever drives the transport feeds received bytes into
/// [`WebSocket::on_data_received`](crate::WebSocket::on_data_received) and
/// reports loss of the connection via
/// [`WebSocket::on_broken`](crate::WebSocket::on_broken).
pub trait Connection {
    /// Hand bytes to the transport for delivery to the peer.
    fn send_data(&mut self, data: &[u8]);

    /// Tear the transport down. `clean` distinguishes the orderly shutdown
    /// that follows a completed close handshake from an abort.
    fn shutdown(&mut self, clean: bool);

    /// Identifier of the remote peer, used in diagnostic messages.
    fn peer_id(&self) -> String;
}
