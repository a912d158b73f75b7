//! Test helpers and fixtures for blemidi integration tests
//!
//! ## Fixtures
//!
//! - [`encoder`]: BLE-MIDI packet encoder used to produce valid packet
//!   streams from plain MIDI messages
//! - [`collect`]: decodes a packet stream into owned messages

#![allow(dead_code)]

pub mod encoder;

use blemidi::prelude::*;

/// Smallest notification payload that fits any non-SysEx message.
pub const MIN_MTU: usize = 5;

/// Default BLE ATT payload (23-byte MTU minus 3 bytes of ATT header).
pub const DEFAULT_MTU: usize = 20;

/// Decode `packets` in order, failing on the first malformed packet.
pub fn collect(packets: &[Vec<u8>]) -> Vec<OwnedBleMidiMessage> {
    let mut out = Vec::new();
    let mut decoder = StreamDecoder::new(|msg: &BleMidiMessage<'_>| {
        out.push(msg.to_owned_message());
    });
    for packet in packets {
        decoder
            .push(packet)
            .unwrap_or_else(|e| panic!("packet {packet:02x?} failed: {e}"));
    }
    drop(decoder);
    out
}

/// Install a test-friendly tracing subscriber (idempotent).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
