use std::io::{Cursor, Read};
use std::str;

use byteorder::{ByteOrder, NetworkEndian, ReadBytesExt};
use bytes::Bytes;

use super::coding::{CloseCode, Control, OpCode};
use super::mask::{apply_mask, generate_mask};
use crate::error::Result;

/// The close command carried by a close frame, when its payload names one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    /// The status code of the closure.
    pub code: CloseCode,
    /// The reason phrase accompanying the status code.
    pub reason: String,
}

/// How the payload length is written on the wire.
enum LengthFormat {
    U8(u8),
    U16,
    U64,
}

impl LengthFormat {
    /// Pick the shortest encoding for `length`.
    fn for_length(length: u64) -> Self {
        if length < 126 {
            LengthFormat::U8(length as u8)
        } else if length < 65536 {
            LengthFormat::U16
        } else {
            LengthFormat::U64
        }
    }

    /// Bytes of extended length following the two fixed header octets.
    fn extra_bytes(&self) -> usize {
        match *self {
            LengthFormat::U8(_) => 0,
            LengthFormat::U16 => 2,
            LengthFormat::U64 => 8,
        }
    }

    /// Length marker for the second header octet.
    fn length_byte(&self) -> u8 {
        match *self {
            LengthFormat::U8(length) => length,
            LengthFormat::U16 => 126,
            LengthFormat::U64 => 127,
        }
    }
}

/// A parsed frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// Whether this frame is the last one of a message.
    pub is_final: bool,
    /// First reserved bit. Always zero without a negotiated extension.
    pub rsv1: bool,
    /// Second reserved bit.
    pub rsv2: bool,
    /// Third reserved bit.
    pub rsv3: bool,
    /// The frame's type.
    pub opcode: OpCode,
    /// The masking key, present iff the MASK bit was set.
    pub mask: Option<[u8; 4]>,
}

impl Default for FrameHeader {
    fn default() -> Self {
        FrameHeader {
            is_final: true,
            rsv1: false,
            rsv2: false,
            rsv3: false,
            opcode: OpCode::Control(Control::Close),
            mask: None,
        }
    }
}

impl FrameHeader {
    /// Wire size of this header for a payload of `length` bytes.
    pub fn len(&self, length: u64) -> usize {
        2 + LengthFormat::for_length(length).extra_bytes() + if self.mask.is_some() { 4 } else { 0 }
    }

    /// Parse a header from the cursor.
    ///
    /// Returns the header and the advertised payload length, or `None` with
    /// the cursor position unchanged when the buffer does not yet hold a
    /// complete header.
    pub fn parse(cursor: &mut Cursor<&[u8]>) -> Option<(FrameHeader, u64)> {
        let initial = cursor.position();
        match Self::parse_internal(cursor) {
            Some(parsed) => Some(parsed),
            None => {
                cursor.set_position(initial);
                None
            }
        }
    }

    fn parse_internal(cursor: &mut Cursor<&[u8]>) -> Option<(FrameHeader, u64)> {
        let mut head = [0u8; 2];
        if cursor.read(&mut head).ok()? != 2 {
            return None;
        }
        let (first, second) = (head[0], head[1]);

        let is_final = first & 0x80 != 0;
        let rsv1 = first & 0x40 != 0;
        let rsv2 = first & 0x20 != 0;
        let rsv3 = first & 0x10 != 0;
        let opcode = OpCode::from(first & 0x0F);

        let masked = second & 0x80 != 0;
        let length = match second & 0x7F {
            126 => u64::from(cursor.read_u16::<NetworkEndian>().ok()?),
            127 => cursor.read_u64::<NetworkEndian>().ok()?,
            length_byte => u64::from(length_byte),
        };

        let mask = if masked {
            let mut mask_bytes = [0u8; 4];
            if cursor.read(&mut mask_bytes).ok()? != 4 {
                return None;
            }
            Some(mask_bytes)
        } else {
            None
        };

        let header = FrameHeader { is_final, rsv1, rsv2, rsv3, opcode, mask };
        Some((header, length))
    }

    /// Write the header for a payload of `length` bytes.
    pub fn format(&self, length: u64, output: &mut Vec<u8>) {
        let code: u8 = self.opcode.into();
        let one = code
            | if self.is_final { 0x80 } else { 0 }
            | if self.rsv1 { 0x40 } else { 0 }
            | if self.rsv2 { 0x20 } else { 0 }
            | if self.rsv3 { 0x10 } else { 0 };
        output.push(one);

        let length_format = LengthFormat::for_length(length);
        let two = length_format.length_byte() | if self.mask.is_some() { 0x80 } else { 0 };
        output.push(two);
        match length_format {
            LengthFormat::U8(_) => {}
            LengthFormat::U16 => output.extend_from_slice(&(length as u16).to_be_bytes()),
            LengthFormat::U64 => output.extend_from_slice(&length.to_be_bytes()),
        }

        if let Some(mask) = self.mask {
            output.extend_from_slice(&mask);
        }
    }
}

/// A complete WebSocket frame.
///
/// The payload is held unmasked; for inbound frames the masking key (if
/// any) has already been reversed, for outbound frames the key is applied
/// while the frame is written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    header: FrameHeader,
    payload: Bytes,
}

impl Frame {
    /// Assemble a frame from a parsed header and an unmasked payload.
    pub fn from_payload(header: FrameHeader, payload: Bytes) -> Self {
        Frame { header, payload }
    }

    /// Create a data frame.
    pub fn message(payload: Bytes, opcode: OpCode, is_final: bool) -> Frame {
        debug_assert!(
            matches!(opcode, OpCode::Data(_)),
            "Bug: invalid opcode for data frame"
        );
        Frame {
            header: FrameHeader { is_final, opcode, ..FrameHeader::default() },
            payload,
        }
    }

    /// Create a ping frame.
    pub fn ping(payload: Bytes) -> Frame {
        Frame {
            header: FrameHeader {
                opcode: OpCode::Control(Control::Ping),
                ..FrameHeader::default()
            },
            payload,
        }
    }

    /// Create a pong frame.
    pub fn pong(payload: Bytes) -> Frame {
        Frame {
            header: FrameHeader {
                opcode: OpCode::Control(Control::Pong),
                ..FrameHeader::default()
            },
            payload,
        }
    }

    /// Create a close frame. `None` produces an empty payload, which on the
    /// wire means "no status code present".
    pub fn close(close: Option<CloseFrame>) -> Frame {
        let payload = if let Some(CloseFrame { code, reason }) = close {
            let mut data = Vec::with_capacity(2 + reason.len());
            data.extend_from_slice(&u16::from(code).to_be_bytes());
            data.extend_from_slice(reason.as_bytes());
            Bytes::from(data)
        } else {
            Bytes::new()
        };
        Frame { header: FrameHeader::default(), payload }
    }

    /// Total wire size of the frame.
    pub fn len(&self) -> usize {
        let length = self.payload.len();
        self.header.len(length as u64) + length
    }

    /// Whether the frame carries no payload.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// The frame's header.
    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    /// The frame's unmasked payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consume the frame into its payload.
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Store a fresh random masking key, to be applied when the frame is
    /// written out.
    pub fn set_random_mask(&mut self) {
        self.header.mask = Some(generate_mask());
    }

    /// Interpret the frame as a close frame.
    ///
    /// A payload shorter than two bytes carries no status code. Fails when
    /// the reason phrase is not valid UTF-8.
    pub fn into_close(self) -> Result<Option<CloseFrame>> {
        if self.payload.len() < 2 {
            return Ok(None);
        }
        let code = CloseCode::from(NetworkEndian::read_u16(&self.payload[0..2]));
        let reason = str::from_utf8(&self.payload[2..])?.to_owned();
        Ok(Some(CloseFrame { code, reason }))
    }

    /// Write the frame out, applying the masking key if one is set.
    pub fn format(self, output: &mut Vec<u8>) {
        self.header.format(self.payload.len() as u64, output);
        let payload_start = output.len();
        output.extend_from_slice(&self.payload);
        if let Some(mask) = self.header.mask {
            apply_mask(&mut output[payload_start..], mask);
        }
    }
}
