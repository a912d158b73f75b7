//! BLE-MIDI packet encoder for tests.
//!
//! Packs timestamped MIDI messages into notification payloads of at most
//! `mtu` bytes. Consecutive channel messages with the same status share it
//! via running status, and SysEx messages are split across packets.

const SYSEX_START: u8 = 0xF0;
const SYSEX_END: u8 = 0xF7;

fn header(ts: u16) -> u8 {
    0x80 | ((ts >> 7) as u8 & 0x3F)
}

fn timestamp_byte(ts: u16) -> u8 {
    0x80 | (ts as u8 & 0x7F)
}

pub struct PacketEncoder {
    mtu: usize,
    packets: Vec<Vec<u8>>,
    current: Vec<u8>,
    running: Option<u8>,
    last_ts: Option<u16>,
}

impl PacketEncoder {
    pub fn new(mtu: usize) -> Self {
        assert!(mtu >= super::MIN_MTU, "mtu too small: {mtu}");
        Self {
            mtu,
            packets: Vec::new(),
            current: Vec::new(),
            running: None,
            last_ts: None,
        }
    }

    pub fn push(&mut self, ts: u16, msg: &[u8]) {
        if msg[0] == SYSEX_START {
            self.push_sysex(ts, msg);
        } else {
            self.push_short(ts, msg);
        }
    }

    pub fn finish(mut self) -> Vec<Vec<u8>> {
        self.flush();
        self.packets
    }

    fn push_short(&mut self, ts: u16, msg: &[u8]) {
        let status = msg[0];
        let is_channel = status < 0xF0;

        let mut use_running = is_channel && self.running == Some(status);
        let mut needed = self.short_len(ts, msg, use_running);
        if self.current.len() + needed > self.mtu {
            self.flush();
            use_running = false;
            needed = self.short_len(ts, msg, false);
        }
        debug_assert!(needed <= self.mtu);

        self.open(ts);
        if use_running {
            if self.last_ts != Some(ts) {
                self.current.push(timestamp_byte(ts));
            }
            self.current.extend_from_slice(&msg[1..]);
        } else {
            self.current.push(timestamp_byte(ts));
            self.current.extend_from_slice(msg);
        }
        self.last_ts = Some(ts);
        self.running = is_channel.then_some(status);
    }

    fn short_len(&self, ts: u16, msg: &[u8], running: bool) -> usize {
        let header = usize::from(self.current.is_empty());
        if running {
            header + usize::from(self.last_ts != Some(ts)) + msg.len() - 1
        } else {
            header + 1 + msg.len()
        }
    }

    fn push_sysex(&mut self, ts: u16, msg: &[u8]) {
        let data = &msg[1..msg.len() - 1];

        if self.current.len() + 2 > self.mtu {
            self.flush();
        }
        self.open(ts);
        self.current.push(timestamp_byte(ts));
        self.current.push(SYSEX_START);

        for &byte in data {
            if self.current.len() == self.mtu {
                self.flush();
                self.open(ts);
            }
            self.current.push(byte);
        }

        if self.current.len() + 2 > self.mtu {
            self.flush();
            self.open(ts);
        }
        self.current.push(timestamp_byte(ts));
        self.current.push(SYSEX_END);
        self.running = None;
        self.last_ts = Some(ts);
    }

    fn open(&mut self, ts: u16) {
        if self.current.is_empty() {
            self.current.push(header(ts));
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.packets.push(std::mem::take(&mut self.current));
        }
        self.running = None;
        self.last_ts = None;
    }
}

/// Encode `messages` into packets of at most `mtu` bytes.
pub fn encode(messages: &[(u16, Vec<u8>)], mtu: usize) -> Vec<Vec<u8>> {
    let mut encoder = PacketEncoder::new(mtu);
    for (ts, msg) in messages {
        encoder.push(*ts, msg);
    }
    encoder.finish()
}
