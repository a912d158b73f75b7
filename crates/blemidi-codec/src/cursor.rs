//! Bounds-checked reader over one BLE-MIDI packet.

use crate::error::{Error, Result};

/// Total length of a channel message, status byte included.
#[inline]
pub fn channel_message_len(status: u8) -> usize {
    match status >> 4 {
        // Note Off, Note On, Poly Pressure, Control Change, Pitch Bend
        0x8 | 0x9 | 0xA | 0xB | 0xE => 3,
        // Program Change, Channel Pressure
        _ => 2,
    }
}

/// Total length of a system common or real-time message.
#[inline]
pub fn system_message_len(status: u8) -> usize {
    match status {
        // MTC Quarter Frame, Song Select
        0xF1 | 0xF3 => 2,
        // Song Position Pointer
        0xF2 => 3,
        // Tune Request, real-time, undefined
        _ => 1,
    }
}

#[derive(Debug)]
pub struct ByteCursor<'p> {
    bytes: &'p [u8],
    pos: usize,
}

impl<'p> ByteCursor<'p> {
    pub fn new(bytes: &'p [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    #[inline]
    pub fn eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    /// Next byte without consuming it.
    #[inline]
    pub fn peek(&self) -> Result<u8> {
        self.bytes
            .get(self.pos)
            .copied()
            .ok_or(Error::UnexpectedEndOfPacket)
    }

    /// Byte `offset` positions ahead, if any.
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    #[inline]
    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Ok(byte)
    }

    /// Returns the 6-bit high timestamp field of a `10xxxxxx` header.
    pub fn parse_header(&mut self) -> Result<u8> {
        let byte = self.read_byte()?;
        if byte & 0xC0 != 0x80 {
            return Err(Error::InvalidHeader(byte));
        }
        Ok(byte & 0x3F)
    }

    /// Returns the 7-bit low timestamp field of a `1xxxxxxx` byte.
    pub fn parse_timestamp(&mut self) -> Result<u8> {
        let byte = self.read_byte()?;
        if byte & 0x80 == 0 {
            return Err(Error::InvalidTimestampByte(byte));
        }
        Ok(byte & 0x7F)
    }

    /// Reads a complete channel message starting at its status byte.
    pub fn parse_channel_message(&mut self) -> Result<&'p [u8]> {
        let status = self.peek()?;
        let body = self.read_message(status, channel_message_len(status))?;
        data_bytes_only(body)
    }

    /// Reads the data bytes of a running-status message whose full length,
    /// status byte included, is `len`.
    pub fn parse_running_status(&mut self, status: u8, len: usize) -> Result<&'p [u8]> {
        let wanted = len.saturating_sub(1);
        let data_run = self.bytes[self.pos.min(self.bytes.len())..]
            .iter()
            .take(wanted)
            .take_while(|b| *b & 0x80 == 0)
            .count();
        if data_run < wanted {
            return Err(Error::TruncatedMessage {
                status,
                expected: len,
                available: 1 + data_run,
            });
        }
        self.read(wanted)
    }

    /// Reads a complete system common or real-time message.
    pub fn parse_system_message(&mut self) -> Result<&'p [u8]> {
        let status = self.peek()?;
        let body = self.read_message(status, system_message_len(status))?;
        data_bytes_only(body)
    }

    /// The next `len` bytes as a view into the packet.
    pub fn read(&mut self, len: usize) -> Result<&'p [u8]> {
        if len > self.remaining() {
            return Err(Error::UnexpectedEndOfPacket);
        }
        let bytes = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_message(&mut self, status: u8, len: usize) -> Result<&'p [u8]> {
        let available = self.remaining();
        if len > available {
            return Err(Error::TruncatedMessage {
                status,
                expected: len,
                available,
            });
        }
        self.read(len)
    }
}

/// A status byte inside the body means the message was cut short.
fn data_bytes_only(body: &[u8]) -> Result<&[u8]> {
    let data = body.get(1..).unwrap_or_default();
    if data.iter().all(|b| b & 0x80 == 0) {
        return Ok(body);
    }
    Err(Error::TruncatedMessage {
        status: body.first().copied().unwrap_or_default(),
        expected: body.len(),
        available: 1 + data.iter().take_while(|b| *b & 0x80 == 0).count(),
    })
}
