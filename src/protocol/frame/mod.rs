//! Utilities to work with raw WebSocket frames.

pub mod coding;

#[allow(clippy::module_inception)]
mod frame;
mod mask;

pub use self::frame::{CloseFrame, Frame, FrameHeader};

use std::convert::TryFrom;
use std::io::Cursor;

use bytes::{Buf, BytesMut};
use log::*;

use self::mask::apply_mask;
use crate::error::{Error, ProtocolError, Result};

/// Initial capacity of the reassembly buffer.
const INITIAL_REASSEMBLY_CAPACITY: usize = 4 * 1024;

/// Reassembles transport deliveries into complete frames.
///
/// Bytes go in whenever the transport produces them; complete frames come
/// out in arrival order, their payloads unmasked. A parsed header is cached
/// between calls so a payload split across many deliveries is only ever
/// scanned once.
#[derive(Debug)]
pub(crate) struct FrameAssembler {
    /// Bytes received but not yet consumed as frames.
    in_buffer: BytesMut,
    /// Header and payload length of the frame currently being reassembled.
    header: Option<(FrameHeader, u64)>,
}

impl FrameAssembler {
    pub(crate) fn new() -> Self {
        FrameAssembler {
            in_buffer: BytesMut::with_capacity(INITIAL_REASSEMBLY_CAPACITY),
            header: None,
        }
    }

    /// Append bytes received from the transport.
    pub(crate) fn extend(&mut self, data: &[u8]) {
        self.in_buffer.extend_from_slice(data);
    }

    /// Extract the next complete frame, or `None` when more bytes are needed.
    pub(crate) fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.header.is_none() {
            let advanced = {
                let mut cursor = Cursor::new(&self.in_buffer[..]);
                self.header = FrameHeader::parse(&mut cursor);
                cursor.position() as usize
            };
            self.in_buffer.advance(advanced);
        }

        let length = match self.header {
            Some((_, length)) => {
                usize::try_from(length).map_err(|_| Error::Protocol(ProtocolError::OversizedFrame))?
            }
            None => return Ok(None),
        };
        if self.in_buffer.len() < length {
            return Ok(None);
        }

        let mut payload = self.in_buffer.split_to(length);
        let (header, _) = self.header.take().expect("Bug: no frame header");
        if let Some(mask) = header.mask {
            apply_mask(&mut payload, mask);
        }
        let frame = Frame::from_payload(header, payload.freeze());
        trace!("assembled frame {:?}", frame.header());
        Ok(Some(frame))
    }
}
