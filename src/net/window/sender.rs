//! [`SenderWindow`]: the ring of outstanding outbound packets.

use crate::net::packet::Packet;

/// A fixed-capacity ring of outstanding outbound packets keyed by sequence number.
///
/// Slots are never discarded on confirmation, the ring simply reuses them as
/// `write` advances past `confirmed + capacity`. Overflow (more than `capacity`
/// packets unacknowledged at once) is not guarded here; see
/// [`crate::net::engine::Connection::send`] for the overflow check at the call site.
#[derive(Debug)]
pub struct SenderWindow {
    capacity: usize,
    buf: Vec<Option<Packet>>,
    /// Next sequence number to assign. Starts at `-1` so the first assigned is `0`.
    write: i32,
    /// Highest sequence number known-delivered. Starts at `-1`.
    confirmed: i32,
}

impl SenderWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buf: (0..capacity).map(|_| None).collect(),
            write: -1,
            confirmed: -1,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn write(&self) -> i32 {
        self.write
    }

    #[inline]
    pub fn confirmed(&self) -> i32 {
        self.confirmed
    }

    /// True once every packet handed to [`Self::put_packet`] has been confirmed.
    #[inline]
    pub fn is_fully_confirmed(&self) -> bool {
        self.confirmed >= self.write
    }

    #[inline]
    fn slot(&self, seq_num: i32) -> usize {
        (seq_num as usize) % self.capacity
    }

    /// Assign the next sequence number to `packet`, store it, and return the
    /// stored copy (now carrying its assigned `seq_num`).
    pub fn put_packet(&mut self, mut packet: Packet) -> Packet {
        self.write += 1;
        packet.seq_num = self.write;
        let slot = self.slot(self.write);
        self.buf[slot] = Some(packet.clone());
        packet
    }

    /// Fetch the packet assigned to sequence number `i`, if it is still within
    /// the outstanding range `(confirmed, write]`.
    pub fn get_packet(&self, i: i32) -> Option<&Packet> {
        if self.confirmed < i && i <= self.write {
            self.buf[self.slot(i)].as_ref()
        } else {
            None
        }
    }

    /// Advance the confirmed cursor, clamped into `[confirmed, write]`: never
    /// regresses, never runs ahead of what has actually been assigned.
    pub fn update_confirmed(&mut self, i: i32) {
        self.confirmed = self.confirmed.max(i).min(self.write);
    }
}
