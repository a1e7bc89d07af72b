use bytes::{Bytes, BytesMut};

/// The type of message being reassembled from fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IncompleteMessageType {
    Text,
    Binary,
}

/// Accumulator for a fragmented message.
///
/// Fragment payloads are appended in arrival order; the concatenation is
/// handed out once the final fragment arrives. Text is UTF-8 validated by
/// the caller only at that point, never per fragment.
#[derive(Debug)]
pub(crate) struct IncompleteMessage {
    kind: IncompleteMessageType,
    buf: BytesMut,
}

impl IncompleteMessage {
    pub(crate) fn new(kind: IncompleteMessageType) -> Self {
        IncompleteMessage { kind, buf: BytesMut::new() }
    }

    pub(crate) fn kind(&self) -> IncompleteMessageType {
        self.kind
    }

    /// Add the payload of one more fragment.
    pub(crate) fn extend(&mut self, tail: &[u8]) {
        self.buf.extend_from_slice(tail);
    }

    /// Hand out the reassembled message.
    pub(crate) fn complete(self) -> Bytes {
        self.buf.freeze()
    }
}
