//! Streaming BLE-MIDI decoder.
//!
//! [`StreamDecoder`] accepts packets in transport order and invokes its
//! callback once per complete MIDI message. The only state carried between
//! packets is a SysEx left open at the end of a packet.

use tracing::{debug, trace, warn};

use crate::config::{DecoderConfig, ErrorPolicy};
use crate::error::{Error, Result};
use crate::message::BleMidiMessage;
use crate::state::{Decoded, Parser, ParserState};
use crate::timestamp::Timestamp;

/// Partial SysEx carried across a packet boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SysExContext {
    timestamp: Timestamp,
    /// Payload so far, starting with `0xF0`.
    data: Vec<u8>,
}

impl SysExContext {
    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Bytes received after `0xF0`.
    #[inline]
    pub fn partial_data(&self) -> &[u8] {
        self.data.get(1..).unwrap_or_default()
    }
}

#[derive(Debug, Default)]
enum DecoderState {
    #[default]
    Idle,
    AwaitingSysExContinuation(SysExContext),
}

pub struct StreamDecoder<F> {
    callback: F,
    config: DecoderConfig,
    state: DecoderState,
    /// Reused SysEx allocation while idle.
    spare: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct StreamDecoderBuilder {
    config: DecoderConfig,
}

impl StreamDecoderBuilder {
    pub fn config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.config.error_policy = policy;
        self
    }

    pub fn max_sysex_len(mut self, limit: usize) -> Self {
        self.config.max_sysex_len = Some(limit);
        self
    }

    pub fn build<F>(self, callback: F) -> StreamDecoder<F>
    where
        F: FnMut(&BleMidiMessage<'_>),
    {
        StreamDecoder {
            callback,
            config: self.config,
            state: DecoderState::Idle,
            spare: Vec::new(),
        }
    }
}

impl StreamDecoder<()> {
    pub fn builder() -> StreamDecoderBuilder {
        StreamDecoderBuilder::default()
    }
}

impl<F> StreamDecoder<F>
where
    F: FnMut(&BleMidiMessage<'_>),
{
    pub fn new(callback: F) -> Self {
        StreamDecoderBuilder::default().build(callback)
    }

    pub fn with_config(config: DecoderConfig, callback: F) -> Self {
        StreamDecoderBuilder::default().config(config).build(callback)
    }

    #[inline]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    #[inline]
    pub fn is_awaiting_sysex(&self) -> bool {
        matches!(self.state, DecoderState::AwaitingSysExContinuation(_))
    }

    pub fn sysex_context(&self) -> Option<&SysExContext> {
        match &self.state {
            DecoderState::AwaitingSysExContinuation(ctx) => Some(ctx),
            DecoderState::Idle => None,
        }
    }

    /// Decode one packet, invoking the callback for every complete message.
    ///
    /// Packets shorter than two bytes are ignored. On a malformed packet the
    /// messages already delivered stay delivered, the rest of the packet is
    /// dropped, and the error is returned or logged per [`ErrorPolicy`].
    pub fn push(&mut self, packet: &[u8]) -> Result<()> {
        if packet.len() < 2 {
            trace!(len = packet.len(), "ignoring short BLE-MIDI packet");
            return Ok(());
        }

        match self.decode(packet) {
            Ok(()) => Ok(()),
            Err(e) => match self.config.error_policy {
                ErrorPolicy::Propagate => Err(e),
                ErrorPolicy::Discard => {
                    warn!(error = %e, packet = ?packet, "discarding malformed BLE-MIDI packet");
                    Ok(())
                }
            },
        }
    }

    fn decode(&mut self, packet: &[u8]) -> Result<()> {
        let (mut buffer, mut resumed, entry) = match std::mem::take(&mut self.state) {
            DecoderState::Idle => (std::mem::take(&mut self.spare), None, ParserState::Header),
            DecoderState::AwaitingSysExContinuation(ctx) => {
                debug!(
                    timestamp = ctx.timestamp.as_millis(),
                    len = ctx.data.len(),
                    "resuming SysEx"
                );
                let resumed = Some((ctx.timestamp, ctx.data.len()));
                let entry = ParserState::SysExHeader {
                    timestamp: ctx.timestamp,
                };
                (ctx.data, resumed, entry)
            }
        };

        let mut incomplete = None;
        let outcome = {
            let mut parser = Parser::new(packet, &mut buffer, self.config.max_sysex_len);
            drive(
                &mut parser,
                entry,
                &mut self.callback,
                &mut resumed,
                &mut incomplete,
            )
        };

        match outcome {
            Ok(()) => {
                if let Some(timestamp) = incomplete {
                    debug!(
                        timestamp = timestamp.as_millis(),
                        len = buffer.len(),
                        "SysEx continues in next packet"
                    );
                    self.state = DecoderState::AwaitingSysExContinuation(SysExContext {
                        timestamp,
                        data: buffer,
                    });
                } else {
                    self.recycle(buffer);
                }
                Ok(())
            }
            Err(e) => {
                match (resumed, &e) {
                    (_, Error::SysExOverflow { .. }) | (None, _) => self.recycle(buffer),
                    (Some((timestamp, len)), _) => {
                        // Roll back whatever the failed packet appended
                        buffer.truncate(len);
                        self.state = DecoderState::AwaitingSysExContinuation(SysExContext {
                            timestamp,
                            data: buffer,
                        });
                    }
                }
                Err(e)
            }
        }
    }

    fn recycle(&mut self, mut buffer: Vec<u8>) {
        buffer.clear();
        self.spare = buffer;
    }
}

/// Runs the state machine from `entry` until the packet is exhausted.
fn drive<F>(
    parser: &mut Parser<'_, '_>,
    entry: ParserState,
    callback: &mut F,
    resumed: &mut Option<(Timestamp, usize)>,
    incomplete: &mut Option<Timestamp>,
) -> Result<()>
where
    F: FnMut(&BleMidiMessage<'_>),
{
    let mut state = entry;
    loop {
        let (item, next) = parser.step(state)?;
        match item {
            Some(Decoded::Message(msg)) => {
                if msg.is_sysex() {
                    debug!(len = msg.bytes().len(), "SysEx complete");
                    *resumed = None;
                }
                callback(&msg);
            }
            Some(Decoded::IncompleteSysEx { timestamp }) => *incomplete = Some(timestamp),
            None => {}
        }
        match next {
            Some(next) => state = next,
            None => return Ok(()),
        }
    }
}
