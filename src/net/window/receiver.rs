//! [`ReceiverWindow`]: reassembly of a contiguous in-order prefix.

use crate::net::packet::Packet;

/// A fixed-capacity ring of inbound packets, reassembled into a contiguous
/// in-order prefix for application consumption.
#[derive(Debug)]
pub struct ReceiverWindow {
    capacity: usize,
    buf: Vec<Option<Packet>>,
    /// Next sequence number the application will consume. Starts at `0`.
    read: i32,
    /// Highest sequence number for which every slot in `[read, confirmed]` is filled.
    confirmed: i32,
}

impl ReceiverWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buf: (0..capacity).map(|_| None).collect(),
            read: 0,
            confirmed: -1,
        }
    }

    #[inline]
    pub fn read(&self) -> i32 {
        self.read
    }

    #[inline]
    pub fn confirmed(&self) -> i32 {
        self.confirmed
    }

    /// Whether a contiguous packet is ready for [`Self::get_packet`].
    #[inline]
    pub fn has_ready(&self) -> bool {
        self.read <= self.confirmed
    }

    #[inline]
    fn slot(&self, seq_num: i32) -> usize {
        (seq_num as usize) % self.capacity
    }

    /// Accept an inbound packet if its sequence number falls within the
    /// window, then advance `confirmed` as far as the now-contiguous run
    /// of filled slots allows. Out-of-window packets are dropped; a
    /// duplicate simply overwrites its own slot with identical content.
    pub fn put_packet(&mut self, packet: Packet) {
        let seq_num = packet.seq_num;
        let window_end = self.read + self.capacity as i32;
        if seq_num < self.read || seq_num > window_end {
            return;
        }

        let slot = self.slot(seq_num);
        self.buf[slot] = Some(packet);

        let mut i = self.confirmed + 1;
        while i < window_end && self.buf[self.slot(i)].is_some() {
            self.confirmed = i;
            i += 1;
        }
    }

    /// Take the next packet in order, if one is ready.
    pub fn get_packet(&mut self) -> Option<Packet> {
        if self.read > self.confirmed {
            return None;
        }
        let slot = self.slot(self.read);
        let packet = self.buf[slot].take();
        self.read += 1;
        packet
    }
}
