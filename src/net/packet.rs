//! Wire frame definition and codec, built on top of [`ByteBuf`].
//!
//! Packet kinds are collapsed into a single frame shape with two
//! sentinel-bearing fields instead of a class hierarchy: a close is
//! `seq_num == -1`, a pure ACK is a frame with an empty payload.

use crate::util::ByteBuf;

/// Reserved `seq_num` value marking a close sentinel.
pub const CLOSE_SEQ: i32 = -1;

/// Reserved `ack_num` value meaning "nothing accepted yet".
pub const NO_ACK: i32 = -1;

/// Fixed header length on the wire: `seq_num` + `ack_num` + `chk_sum` + `payload_len`.
const HEADER_LEN: usize = 4 + 4 + 4 + 4;

/// A single wire frame: `{ seq_num, ack_num, chk_sum, payload }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub seq_num: i32,
    pub ack_num: i32,
    pub payload: Vec<u8>,
}

impl Packet {
    /// Build a data packet. `seq_num` is filled in later by [`crate::net::window::SenderWindow::put_packet`];
    /// `0` here is just a placeholder until assignment.
    pub fn data(payload: Vec<u8>) -> Self {
        Self { seq_num: 0, ack_num: NO_ACK, payload }
    }

    /// Build a pure ACK packet: empty payload, `seq_num = 0` (ignored by the
    /// receiver precisely because the payload is empty).
    pub fn ack(ack_num: i32) -> Self {
        Self { seq_num: 0, ack_num, payload: Vec::new() }
    }

    /// Build the close sentinel.
    pub fn close(ack_num: i32) -> Self {
        Self { seq_num: CLOSE_SEQ, ack_num, payload: Vec::new() }
    }

    #[inline]
    pub fn is_close(&self) -> bool {
        self.seq_num == CLOSE_SEQ
    }

    /// Compute the checksum over `{seq_num, ack_num, 0, payload}` as it would
    /// appear on the wire, with the checksum field itself zeroed.
    fn compute_checksum(&self) -> i32 {
        let mut buf = ByteBuf::new();
        buf.write_int(self.seq_num);
        buf.write_int(self.ack_num);
        buf.write_int(0);
        buf.write_data(&self.payload);
        buf.checksum() as i32
    }

    /// Encode this packet into a fresh byte vector, computing and embedding its checksum.
    pub fn encode(&self) -> Vec<u8> {
        let chk_sum = self.compute_checksum();
        let mut buf = ByteBuf::new();
        buf.write_int(self.seq_num);
        buf.write_int(self.ack_num);
        buf.write_int(chk_sum);
        buf.write_data(&self.payload);
        buf.as_bytes().to_vec()
    }

    /// Decode a packet from raw bytes, validating its checksum.
    ///
    /// Returns `None` for anything malformed: too short to hold a header, a
    /// payload length that runs past the buffer, or a checksum mismatch. None
    /// of these cases is an error the caller sees, they are silently dropped
    /// at this boundary.
    pub fn decode(data: &[u8]) -> Option<Packet> {
        if data.len() < HEADER_LEN {
            return None;
        }

        let mut buf = ByteBuf::from_bytes(data.to_vec());
        let seq_num = buf.read_int();
        let ack_num = buf.read_int();
        let chk_sum = buf.read_int();

        if buf.remaining() < 4 {
            return None;
        }
        let payload_len = buf.peek_int();
        if payload_len < 0 || (payload_len as usize) > buf.remaining() - 4 {
            return None;
        }
        let payload = buf.read_data();

        let packet = Packet { seq_num, ack_num, payload };
        if packet.compute_checksum() != chk_sum {
            return None;
        }

        Some(packet)
    }
}
