//! BLE-MIDI parser state machine.
//!
//! Each [`ParserState`] consumes bytes from the packet cursor and yields at
//! most one [`Decoded`] item plus the state to run next, or `None` once the
//! packet is exhausted. States only carry timestamps and running status; the
//! SysEx payload being assembled lives in a buffer owned by the caller so it
//! can outlive the packet.

use tracing::trace;

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::message::{BleMidiMessage, SYSEX_END, SYSEX_START};
use crate::timestamp::Timestamp;

/// Status byte and total length of the last channel message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RunningStatus {
    pub status: u8,
    pub len: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ParserState {
    /// Entry state when no SysEx is pending.
    Header,
    FirstTimestamp {
        high: u8,
    },
    FullMessage {
        timestamp: Timestamp,
    },
    Timestamp {
        last: Timestamp,
        running: Option<RunningStatus>,
    },
    RunningStatusMessage {
        timestamp: Timestamp,
        running: RunningStatus,
    },
    SystemMessage {
        timestamp: Timestamp,
        running: Option<RunningStatus>,
    },
    SysExStart {
        timestamp: Timestamp,
    },
    SysExData {
        timestamp: Timestamp,
    },
    SysExTimestamp {
        last: Timestamp,
    },
    SysExSystemMessage {
        timestamp: Timestamp,
    },
    SysExEnd {
        timestamp: Timestamp,
    },
    /// Entry state when resuming a SysEx left open by the previous packet.
    SysExHeader {
        timestamp: Timestamp,
    },
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Decoded<'a> {
    Message(BleMidiMessage<'a>),
    /// The packet ended inside a SysEx. The partial payload stays in the
    /// SysEx buffer.
    IncompleteSysEx { timestamp: Timestamp },
}

pub(crate) type Step<'a> = (Option<Decoded<'a>>, Option<ParserState>);

pub(crate) struct Parser<'p, 's> {
    cursor: ByteCursor<'p>,
    /// SysEx being assembled, starting with `0xF0`.
    sysex: &'s mut Vec<u8>,
    max_sysex_len: Option<usize>,
}

impl<'p, 's> Parser<'p, 's> {
    pub fn new(packet: &'p [u8], sysex: &'s mut Vec<u8>, max_sysex_len: Option<usize>) -> Self {
        Self {
            cursor: ByteCursor::new(packet),
            sysex,
            max_sysex_len,
        }
    }

    pub fn step(&mut self, state: ParserState) -> Result<Step<'_>> {
        trace!(?state, remaining = self.cursor.remaining(), "parser step");
        match state {
            ParserState::Header => {
                let high = self.cursor.parse_header()?;
                Ok((None, Some(ParserState::FirstTimestamp { high })))
            }
            ParserState::FirstTimestamp { high } => {
                let low = self.cursor.parse_timestamp()?;
                let timestamp = Timestamp::from_parts(high, low);
                Ok((None, Some(self.dispatch(timestamp, None)?)))
            }
            ParserState::Timestamp { last, running } => {
                let low = self.cursor.parse_timestamp()?;
                let timestamp = last.advance(low);
                Ok((None, Some(self.dispatch(timestamp, running)?)))
            }
            ParserState::FullMessage { timestamp } => {
                let body = self.cursor.parse_channel_message()?;
                let running = RunningStatus {
                    status: body[0],
                    len: body.len(),
                };
                let next = self.after_message(timestamp, Some(running))?;
                Ok((
                    Some(Decoded::Message(BleMidiMessage::borrowed(timestamp, body))),
                    next,
                ))
            }
            ParserState::RunningStatusMessage { timestamp, running } => {
                let data = self
                    .cursor
                    .parse_running_status(running.status, running.len)?;
                let msg = BleMidiMessage::with_status(timestamp, running.status, data);
                let next = self.after_message(timestamp, Some(running))?;
                Ok((Some(Decoded::Message(msg)), next))
            }
            ParserState::SystemMessage { timestamp, running } => {
                let body = self.cursor.parse_system_message()?;
                let next = self.after_message(timestamp, running)?;
                Ok((
                    Some(Decoded::Message(BleMidiMessage::borrowed(timestamp, body))),
                    next,
                ))
            }
            ParserState::SysExStart { timestamp } => {
                if let Some(limit) = self.max_sysex_len {
                    // Even an empty SysEx needs 0xF0 and 0xF7
                    if limit < 2 {
                        return Err(Error::SysExOverflow { limit });
                    }
                }
                self.cursor.read_byte()?;
                self.sysex.clear();
                self.sysex.push(SYSEX_START);
                Ok((None, Some(ParserState::SysExData { timestamp })))
            }
            ParserState::SysExData { timestamp } => self.sysex_data(timestamp),
            ParserState::SysExTimestamp { last } => {
                let low = self.cursor.parse_timestamp()?;
                let timestamp = last.advance(low);
                Ok((None, Some(self.sysex_dispatch(timestamp)?)))
            }
            ParserState::SysExSystemMessage { timestamp } => {
                let body = self.cursor.parse_system_message()?;
                // End of packet keeps the SysEx open
                Ok((
                    Some(Decoded::Message(BleMidiMessage::borrowed(timestamp, body))),
                    Some(ParserState::SysExData { timestamp }),
                ))
            }
            ParserState::SysExEnd { timestamp } => {
                self.cursor.read_byte()?;
                self.sysex.push(SYSEX_END);
                let next = (!self.cursor.eof()).then_some(ParserState::Timestamp {
                    last: timestamp,
                    running: None,
                });
                Ok((
                    Some(Decoded::Message(BleMidiMessage::borrowed(
                        timestamp,
                        self.sysex.as_slice(),
                    ))),
                    next,
                ))
            }
            ParserState::SysExHeader { timestamp } => {
                // Continuation packets carry SysEx data right after the header
                self.cursor.parse_header()?;
                let next = match self.cursor.peek() {
                    _ if self.sysex_timestamp_ahead() => {
                        ParserState::SysExTimestamp { last: timestamp }
                    }
                    Ok(SYSEX_END) => ParserState::SysExEnd { timestamp },
                    Ok(0xF8..=0xFF) => ParserState::SysExSystemMessage { timestamp },
                    Ok(byte) if byte & 0x80 != 0 => ParserState::SysExTimestamp { last: timestamp },
                    _ => ParserState::SysExData { timestamp },
                };
                Ok((None, Some(next)))
            }
        }
    }

    /// Picks the state for the byte following a timestamp byte.
    fn dispatch(&self, timestamp: Timestamp, running: Option<RunningStatus>) -> Result<ParserState> {
        let byte = self.cursor.peek()?;
        match byte {
            SYSEX_START => Ok(ParserState::SysExStart { timestamp }),
            SYSEX_END => Err(Error::UnmatchedSysExEnd),
            0xF1..=0xFF => Ok(ParserState::SystemMessage { timestamp, running }),
            0x80..=0xEF => Ok(ParserState::FullMessage { timestamp }),
            _ => match running {
                Some(running) => Ok(ParserState::RunningStatusMessage { timestamp, running }),
                None => Err(Error::UnexpectedByte(byte)),
            },
        }
    }

    /// Picks the state after a complete message, or `None` at end of packet.
    fn after_message(
        &self,
        timestamp: Timestamp,
        running: Option<RunningStatus>,
    ) -> Result<Option<ParserState>> {
        let Ok(byte) = self.cursor.peek() else {
            return Ok(None);
        };
        if byte & 0x80 != 0 {
            return Ok(Some(ParserState::Timestamp {
                last: timestamp,
                running,
            }));
        }
        match running {
            Some(running) => Ok(Some(ParserState::RunningStatusMessage { timestamp, running })),
            None => Err(Error::UnexpectedByte(byte)),
        }
    }

    fn sysex_dispatch(&self, timestamp: Timestamp) -> Result<ParserState> {
        match self.cursor.peek() {
            Ok(SYSEX_END) => Ok(ParserState::SysExEnd { timestamp }),
            Ok(0xF8..=0xFF) => Ok(ParserState::SysExSystemMessage { timestamp }),
            Ok(byte) if byte & 0x80 != 0 => Err(Error::UnexpectedByte(byte)),
            _ => Ok(ParserState::SysExData { timestamp }),
        }
    }

    /// True when the next byte inside a SysEx must be a timestamp.
    ///
    /// Timestamp bytes `0xF7..=0xFF` are otherwise indistinguishable from a
    /// SysEx end or a real-time message. A top-bit byte is a timestamp when
    /// `0xF7` follows it, or when a real-time byte follows it and the SysEx
    /// then continues with data or the packet ends.
    fn sysex_timestamp_ahead(&self) -> bool {
        if !matches!(self.cursor.peek(), Ok(byte) if byte & 0x80 != 0) {
            return false;
        }
        match self.cursor.peek_at(1) {
            Some(SYSEX_END) => true,
            Some(0xF8..=0xFF) => matches!(self.cursor.peek_at(2), None | Some(0x00..=0x7F)),
            _ => false,
        }
    }

    fn sysex_data(&mut self, timestamp: Timestamp) -> Result<Step<'_>> {
        loop {
            let Ok(byte) = self.cursor.peek() else {
                return Ok((Some(Decoded::IncompleteSysEx { timestamp }), None));
            };
            if byte == SYSEX_END && !self.sysex_timestamp_ahead() {
                return Ok((None, Some(ParserState::SysExEnd { timestamp })));
            }
            if byte & 0x80 != 0 {
                return Ok((None, Some(ParserState::SysExTimestamp { last: timestamp })));
            }
            if let Some(limit) = self.max_sysex_len {
                // Room for this byte and the closing 0xF7
                if self.sysex.len() + 2 > limit {
                    return Err(Error::SysExOverflow { limit });
                }
            }
            self.sysex.push(self.cursor.read_byte()?);
        }
    }
}
